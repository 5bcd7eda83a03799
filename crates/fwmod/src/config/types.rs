//! Configuration type definitions with auto-tuning based on system resources.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use sysinfo::System;
use tracing::info;

/// System resource information for auto-tuning.
#[derive(Debug, Clone)]
pub struct SystemResources {
    /// Total RAM in bytes.
    pub total_memory_bytes: u64,
    /// Number of CPU cores.
    pub cpu_cores: usize,
}

impl SystemResources {
    /// Detect system resources.
    pub fn detect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            total_memory_bytes: sys.total_memory(),
            cpu_cores: sys.cpus().len(),
        }
    }

    /// Log detected system resources.
    pub fn log(&self) {
        info!(
            "System resources: {:.1} GB RAM, {} CPU cores",
            self.total_memory_bytes as f64 / (1024.0 * 1024.0 * 1024.0),
            self.cpu_cores
        );
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Engine and job-service behavior.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    /// Apply auto-tuned defaults based on system resources.
    /// Only fills in values that weren't explicitly set in the config file.
    pub fn with_auto_tuning(mut self) -> Self {
        let resources = SystemResources::detect();
        resources.log();
        self.engine = self.engine.with_auto_tuning(&resources);
        self
    }
}

/// Engine behavior configuration.
///
/// `workers` uses `Option` to distinguish "not set" (use the auto-tuned
/// default) from "explicitly set".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cooperative pause before each progress checkpoint, in milliseconds.
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    /// Directory receiving patched images.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Largest accepted upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Accepted input file extensions, lowercase, without dots.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Cap for recency listings.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Maximum concurrently running jobs. Auto-tuned from CPU cores if not
    /// set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
            output_dir: default_output_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_extensions: default_allowed_extensions(),
            recent_limit: default_recent_limit(),
            workers: None,
        }
    }
}

impl EngineConfig {
    /// Fill unset values from detected resources.
    pub fn with_auto_tuning(mut self, resources: &SystemResources) -> Self {
        if self.workers.is_none() {
            let tuned = resources.cpu_cores.clamp(1, 8);
            info!("Auto-tuned workers: {}", tuned);
            self.workers = Some(tuned);
        }
        self
    }

    /// Effective worker cap: the explicit or auto-tuned value, defaulting
    /// to 1 when neither was applied.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or(1).max(1)
    }
}

fn default_step_delay_ms() -> u64 {
    800
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_max_upload_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["bin".to_string(), "hex".to_string(), "fw".to_string()]
}

fn default_recent_limit() -> usize {
    10
}
