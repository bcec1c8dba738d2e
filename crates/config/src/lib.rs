//! Lint configuration for seqlint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating a lint configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON deserialization failed.
    #[error("invalid config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// Default cap on reported syntax errors.
pub const DEFAULT_MAX_SYNTAX_ERRORS: usize = 100;
/// Default number of enum symbols listed in a diagnostic message.
pub const DEFAULT_MAX_ENUM_DISPLAY: usize = 20;
/// Default number of stem suggestions offered for an unknown command.
pub const DEFAULT_STEM_SUGGESTIONS: usize = 3;
/// Default number of document revisions kept in the block cache.
pub const DEFAULT_BLOCK_CACHE_CAPACITY: usize = 16;

/// Tunables for a lint run.
///
/// Every field has a default, so `{}` is a valid configuration.
///
/// # Example
/// ```
/// let config = seqlint_config::load_config_from_str(
///     r#"{ "max_syntax_errors": 10, "global_variables": ["GLOBAL_MODE"] }"#,
/// )
/// .unwrap();
/// assert_eq!(config.max_syntax_errors, 10);
/// assert_eq!(config.stem_suggestions, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LintConfig {
    /// Maximum number of parser-level errors reported per run.
    pub max_syntax_errors: usize,
    /// Maximum number of enum symbols listed before an ellipsis.
    pub max_enum_display: usize,
    /// Number of closest stems offered for an unknown command.
    pub stem_suggestions: usize,
    /// Number of revisions whose block structure stays memoized.
    pub block_cache_capacity: usize,
    /// Whether unbalanced-but-valid time tags produce warnings.
    pub check_time_balance: bool,
    /// Externally declared variables, valid wherever a variable reference is.
    pub global_variables: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            max_syntax_errors: DEFAULT_MAX_SYNTAX_ERRORS,
            max_enum_display: DEFAULT_MAX_ENUM_DISPLAY,
            stem_suggestions: DEFAULT_STEM_SUGGESTIONS,
            block_cache_capacity: DEFAULT_BLOCK_CACHE_CAPACITY,
            check_time_balance: true,
            global_variables: Vec::new(),
        }
    }
}

impl LintConfig {
    /// Check field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_syntax_errors", self.max_syntax_errors),
            ("max_enum_display", self.max_enum_display),
            ("stem_suggestions", self.stem_suggestions),
            ("block_cache_capacity", self.block_cache_capacity),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidField {
                    field: field.into(),
                    reason: "must be > 0".into(),
                });
            }
        }
        if let Some(idx) = self
            .global_variables
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(ConfigError::InvalidField {
                field: format!("global_variables[{idx}]"),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Load and validate a lint configuration from JSON.
pub fn load_config_from_str(s: &str) -> Result<LintConfig, ConfigError> {
    let config: LintConfig = serde_json::from_str(s)?;
    config.validate()?;
    Ok(config)
}
