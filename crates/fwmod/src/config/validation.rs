//! Configuration validation.

use super::Config;
use crate::error::{FwmodError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let engine = &config.engine;

    if let Some(0) = engine.workers {
        return Err(FwmodError::Config(
            "engine.workers must be at least 1".into(),
        ));
    }

    if engine.max_upload_bytes < 1024 {
        return Err(FwmodError::Config(
            "engine.max_upload_bytes must be at least 1024".into(),
        ));
    }

    if engine.allowed_extensions.is_empty() {
        return Err(FwmodError::Config(
            "engine.allowed_extensions must not be empty".into(),
        ));
    }
    for ext in &engine.allowed_extensions {
        if ext.starts_with('.') || ext.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(FwmodError::Config(format!(
                "engine.allowed_extensions entries must be lowercase without dots, got '{}'",
                ext
            )));
        }
    }

    if engine.recent_limit == 0 {
        return Err(FwmodError::Config(
            "engine.recent_limit must be at least 1".into(),
        ));
    }

    Ok(())
}
