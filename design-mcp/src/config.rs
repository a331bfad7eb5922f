//! Startup configuration: defaults, environment, then an optional file.

use std::path::{Path, PathBuf};

use design_core::{ConfigError, RuleConfiguration};
use thiserror::Error;

/// Errors loading the startup configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The overrides file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The overrides file is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The merged configuration is invalid.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Build the startup snapshot.
///
/// `env` supplies the process environment (pass `std::env::vars()`); the
/// file at `path`, when given, is a JSON overrides document merged last.
///
/// # Errors
///
/// Returns [`ConfigLoadError`] when the file cannot be read or parsed, or
/// when the merged configuration does not validate.
pub fn load_configuration<I>(path: Option<&Path>, env: I) -> Result<RuleConfiguration, ConfigLoadError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let config = RuleConfiguration::default().merged(&RuleConfiguration::env_overrides(env))?;

    let Some(path) = path else {
        return Ok(config);
    };

    let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let overrides: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!("Loaded configuration overrides from {}", path.display());
    Ok(config.merged(&overrides)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_env_or_file() {
        let config = load_configuration(None, Vec::new()).expect("load");
        assert_eq!(config.max_depth, design_core::config::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_file_overrides_env() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "maxDepth": 7, "reduction": {{ "stripEmpty": false }} }}"#)
            .expect("write");

        let config = load_configuration(
            Some(file.path()),
            vars(&[("DESIGN_MAX_DEPTH", "3"), ("DESIGN_INCLUDE_HIDDEN", "true")]),
        )
        .expect("load");

        assert_eq!(config.max_depth, 7);
        assert!(config.node_filter.include_hidden);
        assert!(!config.reduction.strip_empty);
    }

    #[test]
    fn test_zero_env_limits_do_not_abort_startup() {
        let config = load_configuration(
            None,
            vars(&[
                ("DESIGN_MAX_DEPTH", "0"),
                ("DESIGN_MAX_TEXT_LENGTH", "0"),
                ("DESIGN_INCLUDE_HIDDEN", "true"),
            ]),
        )
        .expect("load");

        assert_eq!(config.max_depth, design_core::config::DEFAULT_MAX_DEPTH);
        assert!(config.node_filter.include_hidden);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = load_configuration(Some(dir.path().join("absent.json").as_path()), Vec::new());
        assert!(matches!(result, Err(ConfigLoadError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("write");
        let result = load_configuration(Some(file.path()), Vec::new());
        assert!(matches!(result, Err(ConfigLoadError::Parse { .. })));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "maxDepth": 0 }}"#).expect("write");
        let result = load_configuration(Some(file.path()), Vec::new());
        assert!(matches!(result, Err(ConfigLoadError::Invalid(_))));
    }
}
