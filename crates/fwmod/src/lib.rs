//! # fwmod
//!
//! Printer firmware transformation library.
//!
//! Takes a binary firmware image plus a device serial number, applies a
//! fixed sequence of byte-level signature rewrites selected by the detected
//! vendor profile, validates and repairs the image structure, and produces
//! a framed artifact. Jobs are tracked in a ledger with fixed progress
//! checkpoints so callers can poll transformation state by id.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fwmod::{Config, MemoryLedger, Orchestrator, PatchRequest};
//!
//! #[tokio::main]
//! async fn main() -> fwmod::Result<()> {
//!     let config = Config::default().with_auto_tuning();
//!     let orchestrator = Orchestrator::new(config, Arc::new(MemoryLedger::new()));
//!     let outcome = orchestrator
//!         .run_to_completion(PatchRequest {
//!             original_file_name: "printer.bin".into(),
//!             serial_number: "HP123456789".into(),
//!             data: std::fs::read("printer.bin")?,
//!         })
//!         .await?;
//!     println!("wrote {}", outcome.output_path.display());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod pipeline;
pub mod rewrite;
pub mod signatures;
pub mod validate;
pub mod vendor;

// Re-exports for convenient access
pub use classify::Vendor;
pub use config::{Config, EngineConfig};
pub use error::{FwmodError, Result};
pub use ledger::{JobLedger, JobStatus, JobUpdate, MemoryLedger, NewJob, PatchJob};
pub use orchestrator::{Orchestrator, PatchOutcome, PatchRequest};
pub use pipeline::Transformed;
pub use signatures::{PatchAction, PatternRule};
