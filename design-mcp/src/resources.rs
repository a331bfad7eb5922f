//! MCP resources exposing rule configurations.

use design_core::RuleConfiguration;

use crate::ResourceContent;

/// Resource URI schemes supported by the server.
pub mod uri {
    const SCHEME: &str = "design://";

    /// Parse a design URI.
    ///
    /// Supported formats:
    /// - `design://rules/current` - The active configuration
    /// - `design://rules/default` - The built-in defaults
    #[must_use]
    pub fn parse(uri: &str) -> Option<DesignUri> {
        let path = uri.strip_prefix(SCHEME)?;
        let parts: Vec<&str> = path.split('/').collect();

        match parts.as_slice() {
            ["rules", "current"] => Some(DesignUri::CurrentRules),
            ["rules", "default"] => Some(DesignUri::DefaultRules),
            _ => None,
        }
    }

    /// Parsed design URI.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DesignUri {
        /// The active configuration snapshot.
        CurrentRules,
        /// The built-in default configuration.
        DefaultRules,
    }
}

/// Get a resource by URI.
///
/// # Errors
///
/// Returns an error if the URI is unknown or the configuration cannot be
/// serialized.
pub fn get_resource(uri: &str, current: &RuleConfiguration) -> Result<ResourceContent, String> {
    let parsed = uri::parse(uri).ok_or_else(|| format!("Invalid design URI: {uri}"))?;

    let value = match parsed {
        uri::DesignUri::CurrentRules => serde_json::to_value(current),
        uri::DesignUri::DefaultRules => serde_json::to_value(RuleConfiguration::default()),
    };
    value
        .map(ResourceContent::Json)
        .map_err(|e| format!("Failed to serialize {uri}: {e}"))
}

/// List available resources.
#[must_use]
pub fn list_resources() -> Vec<String> {
    vec![
        "design://rules/current".to_string(),
        "design://rules/default".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uris() {
        assert_eq!(uri::parse("design://rules/current"), Some(uri::DesignUri::CurrentRules));
        assert_eq!(uri::parse("design://rules/default"), Some(uri::DesignUri::DefaultRules));
        assert_eq!(uri::parse("design://rules"), None);
        assert_eq!(uri::parse("file://rules/current"), None);
    }

    #[test]
    fn test_every_listed_resource_resolves() {
        let config = RuleConfiguration::default();
        for uri in list_resources() {
            assert!(get_resource(&uri, &config).is_ok(), "{uri}");
        }
    }

    #[test]
    fn test_current_rules_reflect_snapshot() {
        let config = RuleConfiguration {
            max_depth: 3,
            ..RuleConfiguration::default()
        };
        let Ok(ResourceContent::Json(value)) = get_resource("design://rules/current", &config)
        else {
            panic!("expected JSON content");
        };
        assert_eq!(value["maxDepth"], 3);
    }
}
