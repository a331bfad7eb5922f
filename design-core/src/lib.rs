//! # Design Core
//!
//! Annotation engine for design-tool node trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   design-core                    │
//! ├──────────────────────────────────────────────────┤
//! │  Tree Walker        │  Property Generators       │
//! │  - Depth limit      │  - Style / layout          │
//! │  - Node filter      │  - Semantic role / a11y    │
//! │  - Error isolation  │  - Tokens / variants       │
//! ├──────────────────────────────────────────────────┤
//! │  Rule Engine        │  Comment Matcher           │
//! │  - Priority order   │  - Bounds index            │
//! │  - Enhance/custom   │  - Nearest enclosing node  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Raw trees flow through [`walker::TreeWalker`] into [`AnnotatedNode`] trees;
//! designer comments are matched against the annotated tree by
//! [`comments::match_comments`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod annotated;
pub mod comments;
pub mod config;
pub mod error;
pub mod filter;
pub mod generators;
pub mod node;
pub mod processor;
pub mod reducer;
pub mod rules;
pub mod stats;
pub mod walker;

pub use annotated::{
    AccessibilityInfo, AnimationTiming, AnnotatedNode, ComponentVariant, DesignToken,
    InteractionState, InteractionTrigger, LayoutContext, SemanticInfo, SemanticRole,
    SiblingPosition, StyleMap, TokenKind, VariantState,
};
pub use comments::{
    match_comments, BoundsEntry, BoundsIndex, CommentInstruction, CommentRecord, MatchKind,
    Point,
};
pub use config::{
    FrameworkPreferences, FrameworkProfile, NamingConvention, NodeFilterConfig,
    OptimizationToggles, ReductionPolicy, RuleConfiguration,
};
pub use error::{ConfigError, DesignError, DesignResult};
pub use node::{
    AxisAlign, Bounds, Color, Effect, EffectKind, LayoutMode, Node, NodeType, Paint, PaintKind,
    TypeStyle, Vector2,
};
pub use processor::DesignProcessor;
pub use rules::{CustomRule, RuleAction, RuleCondition, RuleEngine, RuleError, TypeMatch};
pub use stats::ProcessingStats;
pub use walker::{AnnotationResult, TraversalContext, TreeWalker};

/// Design core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
