//! Error types for the firmware transformation library.

use thiserror::Error;

/// Main error type for firmware transformation operations.
#[derive(Error, Debug)]
pub enum FwmodError {
    /// Configuration or intake validation error (invalid YAML, missing
    /// fields, rejected input file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image length outside the accepted bounds. The only fault the
    /// transformation passes themselves can raise.
    #[error("Invalid firmware size: {actual} bytes (accepted range: 1024 to 104857600 bytes)")]
    ImageSize { actual: u64 },

    /// Job id not present in the ledger.
    #[error("Job {0} not found")]
    JobNotFound(u64),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FwmodError {
    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            FwmodError::Config(_) => 2,
            FwmodError::ImageSize { .. } => 3,
            FwmodError::JobNotFound(_) => 4,
            FwmodError::Io(_) => 5,
            FwmodError::Yaml(_) | FwmodError::Json(_) => 6,
        }
    }
}

/// Result type alias for firmware transformation operations.
pub type Result<T> = std::result::Result<T, FwmodError>;
