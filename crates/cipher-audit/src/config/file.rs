//! File-based configuration loading.

use std::path::Path;

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};

/// Load configuration from a TOML file.
pub fn load(path: &Path) -> Result<AuditConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| AuditError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| AuditError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist.
///
/// Useful when the whole configuration comes from environment variables.
pub fn load_or_default(path: &Path) -> Result<AuditConfig> {
    if path.exists() {
        load(path)
    } else {
        Ok(AuditConfig::default())
    }
}
