//! Rule configuration: filters, generator toggles, custom rules, reduction policy.
//!
//! A [`RuleConfiguration`] is built once per session by layering
//! defaults, environment variables and caller overrides, then treated as an
//! immutable snapshot for the duration of a traversal.
//!
//! Overrides are JSON documents merged onto the current configuration:
//! objects merge key by key, while arrays and scalars replace the previous
//! value outright.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::NodeType;
use crate::rules::CustomRule;
use crate::ConfigError;

/// Default maximum traversal depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;
/// Default maximum text length kept by the context reducer.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 500;

/// Environment variables read by [`RuleConfiguration::from_env`].
pub mod env {
    /// Maximum traversal depth.
    pub const MAX_DEPTH: &str = "DESIGN_MAX_DEPTH";
    /// Whether hidden nodes are annotated.
    pub const INCLUDE_HIDDEN: &str = "DESIGN_INCLUDE_HIDDEN";
    /// Whether locked nodes are annotated.
    pub const INCLUDE_LOCKED: &str = "DESIGN_INCLUDE_LOCKED";
    /// Maximum text length.
    pub const MAX_TEXT_LENGTH: &str = "DESIGN_MAX_TEXT_LENGTH";
    /// Whether empty annotation fields are stripped.
    pub const STRIP_EMPTY: &str = "DESIGN_STRIP_EMPTY";
    /// Target framework name.
    pub const TARGET_FRAMEWORK: &str = "DESIGN_TARGET_FRAMEWORK";
}

/// Node inclusion policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeFilterConfig {
    /// Annotate invisible nodes.
    pub include_hidden: bool,
    /// Annotate locked nodes.
    pub include_locked: bool,
    /// When non-empty, only these types are annotated.
    pub include_types: Vec<NodeType>,
    /// Types never annotated.
    pub exclude_types: Vec<NodeType>,
}

impl Default for NodeFilterConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            include_locked: true,
            include_types: Vec::new(),
            exclude_types: Vec::new(),
        }
    }
}

/// Per-generator feature toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct OptimizationToggles {
    /// Derive style declarations.
    pub generate_styles: bool,
    /// Infer semantic roles.
    pub infer_semantics: bool,
    /// Generate accessibility metadata.
    pub generate_accessibility: bool,
    /// Extract design tokens.
    pub extract_tokens: bool,
    /// Detect component variants.
    pub detect_variants: bool,
    /// Synthesize interaction states.
    pub synthesize_interactions: bool,
    /// Record layout context.
    pub compute_layout_context: bool,
}

impl Default for OptimizationToggles {
    fn default() -> Self {
        Self {
            generate_styles: true,
            infer_semantics: true,
            generate_accessibility: true,
            extract_tokens: true,
            detect_variants: true,
            synthesize_interactions: true,
            compute_layout_context: true,
        }
    }
}

/// Word-joining convention for generated names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    /// `primary-button-fill`
    #[default]
    Kebab,
    /// `primaryButtonFill`
    Camel,
    /// `primary_button_fill`
    Snake,
}

impl NamingConvention {
    /// Split `parts` into lowercase words and join them in this convention.
    #[must_use]
    pub fn join(self, parts: &[&str]) -> String {
        let words: Vec<String> = parts
            .iter()
            .flat_map(|part| part.split(|c: char| !c.is_alphanumeric()))
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect();

        match self {
            Self::Kebab => words.join("-"),
            Self::Snake => words.join("_"),
            Self::Camel => words
                .iter()
                .enumerate()
                .map(|(i, word)| {
                    if i == 0 {
                        word.clone()
                    } else {
                        let mut chars = word.chars();
                        chars
                            .next()
                            .map(|c| c.to_uppercase().chain(chars).collect())
                            .unwrap_or_default()
                    }
                })
                .collect(),
        }
    }
}

/// Naming preferences for one target framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameworkProfile {
    /// Convention for token names.
    pub naming: NamingConvention,
    /// Prefix prepended to token names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_prefix: Option<String>,
}

/// Target framework and per-framework profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameworkPreferences {
    /// Active framework, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Profiles keyed by framework name.
    pub profiles: BTreeMap<String, FrameworkProfile>,
}

impl Default for FrameworkPreferences {
    fn default() -> Self {
        let profile = |naming| FrameworkProfile {
            naming,
            token_prefix: None,
        };
        let profiles = [
            ("react", profile(NamingConvention::Camel)),
            ("vue", profile(NamingConvention::Kebab)),
            ("angular", profile(NamingConvention::Kebab)),
            ("svelte", profile(NamingConvention::Kebab)),
            ("html", profile(NamingConvention::Kebab)),
        ]
        .into_iter()
        .map(|(name, p)| (name.to_string(), p))
        .collect();

        Self {
            target: None,
            profiles,
        }
    }
}

impl FrameworkPreferences {
    /// Profile of the active framework, or the default profile.
    #[must_use]
    pub fn active_profile(&self) -> FrameworkProfile {
        self.target
            .as_deref()
            .and_then(|t| self.profiles.get(&t.to_lowercase()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Post-processing policy applied to every annotated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReductionPolicy {
    /// Remove empty lists and maps.
    pub strip_empty: bool,
    /// Truncate text content beyond this many characters.
    pub max_text_length: Option<usize>,
}

impl Default for ReductionPolicy {
    fn default() -> Self {
        Self {
            strip_empty: true,
            max_text_length: Some(DEFAULT_MAX_TEXT_LENGTH),
        }
    }
}

/// Complete configuration for one traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleConfiguration {
    /// Deepest level (root = 0) that receives a full annotation.
    pub max_depth: usize,
    /// Node inclusion policy.
    pub node_filter: NodeFilterConfig,
    /// Generator toggles.
    pub optimizations: OptimizationToggles,
    /// Framework preferences.
    pub frameworks: FrameworkPreferences,
    /// Custom rules in declaration order.
    pub custom_rules: Vec<CustomRule>,
    /// Context reduction policy.
    pub reduction: ReductionPolicy,
}

impl Default for RuleConfiguration {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            node_filter: NodeFilterConfig::default(),
            optimizations: OptimizationToggles::default(),
            frameworks: FrameworkPreferences::default(),
            custom_rules: Vec::new(),
            reduction: ReductionPolicy::default(),
        }
    }
}

impl RuleConfiguration {
    /// Defaults layered with the process environment.
    ///
    /// Unparseable or out-of-range variables are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        match defaults.merged(&Self::env_overrides(std::env::vars())) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring environment configuration: {e}");
                defaults
            }
        }
    }

    /// Translate `DESIGN_*` variables into an override document.
    pub fn env_overrides<I, K, V>(vars: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = serde_json::Map::new();

        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let parsed = match key {
                env::MAX_DEPTH => value
                    .parse::<usize>()
                    .ok()
                    .filter(|v| *v > 0)
                    .map(|v| at(&["maxDepth"], Value::from(v))),
                env::MAX_TEXT_LENGTH => value
                    .parse::<usize>()
                    .ok()
                    .filter(|v| *v > 0)
                    .map(|v| at(&["reduction", "maxTextLength"], Value::from(v))),
                env::INCLUDE_HIDDEN => {
                    parse_flag(value).map(|v| at(&["nodeFilter", "includeHidden"], Value::Bool(v)))
                }
                env::INCLUDE_LOCKED => {
                    parse_flag(value).map(|v| at(&["nodeFilter", "includeLocked"], Value::Bool(v)))
                }
                env::STRIP_EMPTY => {
                    parse_flag(value).map(|v| at(&["reduction", "stripEmpty"], Value::Bool(v)))
                }
                env::TARGET_FRAMEWORK if !value.is_empty() => Some(at(
                    &["frameworks", "target"],
                    Value::String(value.to_lowercase()),
                )),
                _ => continue,
            };

            match parsed {
                Some((path, v)) => insert_path(&mut overrides, path, v),
                None => tracing::warn!("Ignoring invalid value {value:?} for {key}"),
            }
        }

        Value::Object(overrides)
    }

    /// Produce a new snapshot with `overrides` deep-merged on top of `self`.
    ///
    /// Caller-supplied rules are carried over unless the overrides replace
    /// `customRules`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] when `overrides` is not an object,
    /// [`ConfigError::Malformed`] when the merged document does not fit the
    /// schema, and [`ConfigError::InvalidValue`] when validation fails.
    pub fn merged(&self, overrides: &Value) -> Result<Self, ConfigError> {
        let Some(overlay) = overrides.as_object() else {
            return Err(ConfigError::NotAnObject(json_kind(overrides)));
        };

        let mut base = serde_json::to_value(Self {
            custom_rules: Vec::new(),
            ..self.clone()
        })?;
        deep_merge(&mut base, overrides);

        let mut merged: Self = serde_json::from_value(base)?;
        if !overlay.contains_key("customRules") {
            merged.custom_rules.clone_from(&self.custom_rules);
        }
        merged.validate()?;
        Ok(merged)
    }

    /// Return a snapshot with one more custom rule.
    #[must_use]
    pub fn with_rule(mut self, rule: CustomRule) -> Self {
        self.custom_rules.push(rule);
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero depth or text limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "maxDepth",
                reason: "must be a positive integer".to_string(),
            });
        }
        if self.reduction.max_text_length == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "reduction.maxTextLength",
                reason: "must be positive when set".to_string(),
            });
        }
        Ok(())
    }
}

/// Merge `overlay` into `base`: objects recurse, everything else replaces.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

type OverridePath = &'static [&'static str];

fn at(path: OverridePath, value: Value) -> (OverridePath, Value) {
    (path, value)
}

fn insert_path(root: &mut serde_json::Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            root.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = root
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleAction, RuleCondition};
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = RuleConfiguration::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!config.node_filter.include_hidden);
        assert!(config.node_filter.include_locked);
        assert!(config.optimizations.generate_styles);
        assert!(config.reduction.strip_empty);
        assert_eq!(config.reduction.max_text_length, Some(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_deep_merges_nested_objects() {
        let config = RuleConfiguration::default()
            .merged(&json!({ "optimizations": { "detectVariants": false } }))
            .expect("merge");

        assert!(!config.optimizations.detect_variants);
        assert!(config.optimizations.generate_styles, "siblings survive");
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let base = RuleConfiguration::default()
            .merged(&json!({ "nodeFilter": { "excludeTypes": ["VECTOR", "TEXT"] } }))
            .expect("merge");
        let config = base
            .merged(&json!({ "nodeFilter": { "excludeTypes": ["INSTANCE"] } }))
            .expect("merge");

        assert_eq!(config.node_filter.exclude_types, vec![NodeType::Instance]);
    }

    #[test]
    fn test_merge_override_wins() {
        let config = RuleConfiguration::default()
            .merged(&json!({ "maxDepth": 3, "reduction": { "maxTextLength": null } }))
            .expect("merge");

        assert_eq!(config.max_depth, 3);
        assert_eq!(config.reduction.max_text_length, None);
        assert!(config.reduction.strip_empty);
    }

    #[test]
    fn test_merge_rejects_invalid_values() {
        let result = RuleConfiguration::default().merged(&json!({ "maxDepth": 0 }));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = RuleConfiguration::default().merged(&json!({ "maxDepth": "deep" }));
        assert!(matches!(result, Err(ConfigError::Malformed(_))));

        let result = RuleConfiguration::default().merged(&json!([1, 2]));
        assert!(matches!(result, Err(ConfigError::NotAnObject("array"))));
    }

    #[test]
    fn test_merge_keeps_callback_rules() {
        let rule = CustomRule::new(
            "tag-cards",
            RuleCondition::default(),
            RuleAction::custom(|_, _| Ok(())),
        );
        let base = RuleConfiguration::default().with_rule(rule);

        let merged = base.merged(&json!({ "maxDepth": 4 })).expect("merge");
        assert_eq!(merged.custom_rules.len(), 1);
        assert!(matches!(merged.custom_rules[0].action, RuleAction::Custom(_)));

        let replaced = base
            .merged(&json!({ "customRules": [{
                "name": "hint",
                "condition": { "nameContains": "card" },
                "action": { "type": "enhance", "params": { "hint": "card" } },
                "priority": 2
            }] }))
            .expect("merge");
        assert_eq!(replaced.custom_rules.len(), 1);
        assert_eq!(replaced.custom_rules[0].name, "hint");
        assert!(replaced.custom_rules[0].enabled);
    }

    #[test]
    fn test_env_overrides() {
        let vars = [
            (env::MAX_DEPTH, "4"),
            (env::INCLUDE_HIDDEN, "yes"),
            (env::MAX_TEXT_LENGTH, "abc"),
            (env::TARGET_FRAMEWORK, "React"),
            ("UNRELATED", "1"),
        ];
        let overrides = RuleConfiguration::env_overrides(vars);

        assert_eq!(
            overrides,
            json!({
                "maxDepth": 4,
                "nodeFilter": { "includeHidden": true },
                "frameworks": { "target": "react" }
            })
        );

        let config = RuleConfiguration::default()
            .merged(&overrides)
            .expect("merge");
        assert_eq!(config.max_depth, 4);
        assert!(config.node_filter.include_hidden);
        assert_eq!(
            config.frameworks.active_profile().naming,
            NamingConvention::Camel
        );
    }

    #[test]
    fn test_env_zero_limits_are_ignored() {
        let vars = [
            (env::MAX_DEPTH, "0"),
            (env::MAX_TEXT_LENGTH, "0"),
            (env::INCLUDE_HIDDEN, "true"),
        ];
        let overrides = RuleConfiguration::env_overrides(vars);
        assert_eq!(overrides, json!({ "nodeFilter": { "includeHidden": true } }));

        let defaults = RuleConfiguration::default();
        let config = defaults.merged(&overrides).expect("merge");
        assert_eq!(config.max_depth, defaults.max_depth);
        assert_eq!(config.reduction.max_text_length, defaults.reduction.max_text_length);
        assert!(config.node_filter.include_hidden);
    }

    #[test]
    fn test_naming_convention_join() {
        let parts = ["Primary Button", "0", "fill"];
        assert_eq!(NamingConvention::Kebab.join(&parts), "primary-button-0-fill");
        assert_eq!(NamingConvention::Snake.join(&parts), "primary_button_0_fill");
        assert_eq!(NamingConvention::Camel.join(&parts), "primaryButton0Fill");
    }

    #[test]
    fn test_unknown_framework_uses_default_profile() {
        let prefs = FrameworkPreferences {
            target: Some("qwik".to_string()),
            ..FrameworkPreferences::default()
        };
        assert_eq!(prefs.active_profile(), FrameworkProfile::default());
    }

    #[test]
    fn test_configuration_roundtrips_through_json() {
        let config = RuleConfiguration::default()
            .merged(&json!({ "nodeFilter": { "includeTypes": ["FRAME"] } }))
            .expect("merge");
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["nodeFilter"]["includeTypes"], json!(["FRAME"]));
        assert_eq!(json["maxDepth"], 10);
    }
}
