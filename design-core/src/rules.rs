//! Custom rule engine.
//!
//! Rules pair an optional set of predicates with an action. Matching rules
//! run in descending priority; rules with equal priority keep their
//! declaration order. A failing action is logged against the rule name and
//! never stops the remaining rules or the traversal.

use std::error::Error as StdError;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::annotated::AnnotatedNode;
use crate::error::DesignError;
use crate::node::{Node, NodeType};
use crate::stats::ProcessingStats;
use crate::walker::TraversalContext;

/// Error returned by a custom action callback.
pub type ActionError = Box<dyn StdError + Send + Sync>;

type ActionFn = dyn Fn(&mut AnnotatedNode, &RuleContext<'_>) -> Result<(), ActionError> + Send + Sync;
type PredicateFn = dyn Fn(&Node, &RuleContext<'_>) -> bool + Send + Sync;

/// Errors raised while applying a single rule.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A custom action returned an error.
    #[error("rule '{rule}' failed on node {node}: {message}")]
    Action {
        /// Rule name.
        rule: String,
        /// Node id.
        node: String,
        /// Error text from the callback.
        message: String,
    },

    /// A callback panicked.
    #[error("rule '{rule}' panicked on node {node}")]
    Panicked {
        /// Rule name.
        rule: String,
        /// Node id.
        node: String,
    },

    /// Enhance parameters did not fit the annotation.
    #[error("rule '{rule}' could not enhance node {node}: {source}")]
    Enhance {
        /// Rule name.
        rule: String,
        /// Node id.
        node: String,
        /// Underlying merge error.
        #[source]
        source: DesignError,
    },
}

/// What a rule callback can see about the node being annotated.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Name of the rule being evaluated.
    pub rule: &'a str,
    /// Source node.
    pub node: &'a Node,
    /// Position in the tree.
    pub traversal: &'a TraversalContext,
}

/// Node-type predicate: one type or any of a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeMatch {
    /// Exactly this type.
    One(NodeType),
    /// Any of these types.
    Many(Vec<NodeType>),
}

impl TypeMatch {
    /// Whether `node_type` is accepted.
    #[must_use]
    pub fn matches(&self, node_type: NodeType) -> bool {
        match self {
            Self::One(t) => *t == node_type,
            Self::Many(types) => types.contains(&node_type),
        }
    }
}

/// Caller-supplied predicate, evaluated after every declarative check.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Node, &RuleContext<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Conditions a node must satisfy; all present fields are ANDed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleCondition {
    /// Node type membership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<TypeMatch>,
    /// Case-insensitive substring of the node name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    /// Case-insensitive regular expression that must match the whole name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_pattern: Option<String>,
    /// Presence or absence of children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,
    /// Presence or absence of direct or descendant text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_text: Option<bool>,
    /// Whether the node is a component or instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_component: Option<bool>,
    /// Whether auto layout is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_auto_layout: Option<bool>,
    /// Arbitrary predicate; not serializable.
    #[serde(skip)]
    pub predicate: Option<Predicate>,
}

impl RuleCondition {
    /// Add a caller-supplied predicate.
    #[must_use]
    pub fn with_predicate(
        mut self,
        f: impl Fn(&Node, &RuleContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Predicate::new(f));
        self
    }
}

/// Callback behind a custom action.
#[derive(Clone)]
pub struct ActionHandler(Arc<ActionFn>);

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionHandler(..)")
    }
}

impl Serialize for ActionHandler {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<callback>")
    }
}

/// What a matching rule does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum RuleAction {
    /// Shallow-merge these fields into the annotation.
    Enhance(serde_json::Map<String, serde_json::Value>),
    /// Reserved extension point; currently does nothing.
    Transform,
    /// Invoke a caller-supplied callback. Only constructible in code.
    #[serde(skip_deserializing)]
    Custom(ActionHandler),
}

impl RuleAction {
    /// Build an enhance action from a JSON object; non-objects merge nothing.
    #[must_use]
    pub fn enhance(params: serde_json::Value) -> Self {
        match params {
            serde_json::Value::Object(map) => Self::Enhance(map),
            _ => Self::Enhance(serde_json::Map::new()),
        }
    }

    /// Build a custom action from a closure.
    pub fn custom(
        f: impl Fn(&mut AnnotatedNode, &RuleContext<'_>) -> Result<(), ActionError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::Custom(ActionHandler(Arc::new(f)))
    }
}

const fn enabled_by_default() -> bool {
    true
}

/// A named conditional rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRule {
    /// Name used in logs and error messages.
    pub name: String,
    /// Disabled rules never match.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// When the rule applies.
    #[serde(default)]
    pub condition: RuleCondition,
    /// What the rule does.
    pub action: RuleAction,
    /// Higher runs first.
    #[serde(default)]
    pub priority: i32,
}

impl CustomRule {
    /// Create an enabled rule with priority 0.
    pub fn new(name: impl Into<String>, condition: RuleCondition, action: RuleAction) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            condition,
            action,
            priority: 0,
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

struct CompiledRule<'a> {
    rule: &'a CustomRule,
    name_contains: Option<String>,
    /// `Some(None)` marks a pattern that failed to compile and never matches.
    name_pattern: Option<Option<Regex>>,
}

impl CompiledRule<'_> {
    fn matches(&self, node: &Node, ctx: &RuleContext<'_>) -> Result<bool, RuleError> {
        let cond = &self.rule.condition;

        if let Some(types) = &cond.node_type {
            if !types.matches(node.node_type) {
                return Ok(false);
            }
        }
        if let Some(needle) = &self.name_contains {
            if !node.name.to_lowercase().contains(needle.as_str()) {
                return Ok(false);
            }
        }
        match &self.name_pattern {
            Some(Some(re)) if !re.is_match(&node.name) => return Ok(false),
            Some(None) => return Ok(false),
            _ => {}
        }
        if let Some(expected) = cond.has_children {
            if node.children().is_empty() == expected {
                return Ok(false);
            }
        }
        if let Some(expected) = cond.has_text {
            if node.has_text_content() != expected {
                return Ok(false);
            }
        }
        if let Some(expected) = cond.is_component {
            if node.node_type.is_component_like() != expected {
                return Ok(false);
            }
        }
        if let Some(expected) = cond.has_auto_layout {
            if node.has_auto_layout() != expected {
                return Ok(false);
            }
        }
        match &cond.predicate {
            Some(Predicate(f)) => catch_unwind(AssertUnwindSafe(|| f(node, ctx))).map_err(|_| {
                RuleError::Panicked {
                    rule: self.rule.name.clone(),
                    node: node.id.clone(),
                }
            }),
            None => Ok(true),
        }
    }

    fn apply(&self, annotated: &mut AnnotatedNode, ctx: &RuleContext<'_>) -> Result<(), RuleError> {
        match &self.rule.action {
            RuleAction::Enhance(fields) => {
                annotated
                    .merge_fields(fields)
                    .map_err(|source| RuleError::Enhance {
                        rule: self.rule.name.clone(),
                        node: annotated.id.clone(),
                        source,
                    })
            }
            RuleAction::Transform => Ok(()),
            RuleAction::Custom(ActionHandler(f)) => {
                let node = annotated.id.clone();
                match catch_unwind(AssertUnwindSafe(|| f(annotated, ctx))) {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(RuleError::Action {
                        rule: self.rule.name.clone(),
                        node,
                        message: e.to_string(),
                    }),
                    Err(_) => Err(RuleError::Panicked {
                        rule: self.rule.name.clone(),
                        node,
                    }),
                }
            }
        }
    }
}

/// Rules of one configuration snapshot, sorted and compiled for a traversal.
pub struct RuleEngine<'a> {
    rules: Vec<CompiledRule<'a>>,
    warnings: Vec<String>,
}

impl<'a> RuleEngine<'a> {
    /// Compile the enabled rules and order them by descending priority.
    ///
    /// Invalid name patterns are reported through [`Self::warnings`] and
    /// make their rule never match.
    #[must_use]
    pub fn new(rules: &'a [CustomRule]) -> Self {
        let mut warnings = Vec::new();
        let mut compiled: Vec<CompiledRule<'a>> = rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| {
                let name_pattern = rule.condition.name_pattern.as_ref().map(|pattern| {
                    Regex::new(&format!("(?i)^(?:{pattern})$"))
                        .map_err(|e| {
                            warnings.push(format!(
                                "Rule '{}' has an invalid name pattern: {e}",
                                rule.name
                            ));
                        })
                        .ok()
                });
                CompiledRule {
                    rule,
                    name_contains: rule.condition.name_contains.as_ref().map(|s| s.to_lowercase()),
                    name_pattern,
                }
            })
            .collect();

        // stable: equal priorities keep declaration order
        compiled.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));

        Self {
            rules: compiled,
            warnings,
        }
    }

    /// Compilation warnings.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of enabled rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every matching rule to `annotated`.
    ///
    /// Returns whether at least one rule was applied successfully. Failures
    /// are recorded in `stats` and do not stop later rules.
    pub fn apply(
        &self,
        annotated: &mut AnnotatedNode,
        node: &Node,
        traversal: &TraversalContext,
        stats: &mut ProcessingStats,
    ) -> bool {
        let mut applied = false;

        for compiled in &self.rules {
            let ctx = RuleContext {
                rule: &compiled.rule.name,
                node,
                traversal,
            };
            let outcome = compiled
                .matches(node, &ctx)
                .and_then(|matched| {
                    if matched {
                        compiled.apply(annotated, &ctx).map(|()| true)
                    } else {
                        Ok(false)
                    }
                });

            match outcome {
                Ok(true) => {
                    tracing::trace!("Rule '{}' applied to {}", compiled.rule.name, node.id);
                    stats.rules_applied += 1;
                    applied = true;
                }
                Ok(false) => {}
                Err(e) => stats.error(e.to_string()),
            }
        }

        applied
    }
}

impl fmt::Debug for RuleEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.rule.name.as_str()).collect::<Vec<_>>(),
            )
            .field("warnings", &self.warnings)
            .finish()
    }
}
