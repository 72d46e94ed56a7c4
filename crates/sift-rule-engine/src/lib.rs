//! Sift Rule Engine - rule-driven transformation of telemetry readings.
//!
//! The engine matches each incoming reading's asset name against an
//! ordered list of configured rules and applies the matching rules'
//! transformations, emitting zero, one or many derived readings per
//! input reading.
//!
//! # Architecture
//!
//! - **Pattern matcher**: literal or regex asset-name matching with
//!   capture-group substitution, compiled once per rule
//! - **Rules**: a closed set of transformation variants (include,
//!   exclude, rename, remove, select, flatten, split, datapointmap,
//!   nest), each honouring the same execute contract
//! - **Rule table**: the ordered `(pattern, rule)` entries plus an
//!   optional default rule, built whole-or-not from a JSON document
//! - **Engine**: drives each reading through the matching rules in
//!   order, fanning out derived readings and swapping tables atomically
//!   on reconfiguration
//!
//! # Example
//!
//! ```
//! use sift_core::{DataPoint, Reading, Value};
//! use sift_rule_engine::FilterEngine;
//!
//! let config = r#"{
//!     "rules": [
//!         { "asset_name": "test", "action": "rename", "new_asset_name": "renamed" }
//!     ]
//! }"#;
//! let engine = FilterEngine::new("demo", config).unwrap();
//!
//! let reading = Reading::new("test", vec![DataPoint::new("value", Value::Integer(1))]);
//! let out = engine.ingest(vec![reading]);
//! assert_eq!(out[0].asset, "renamed");
//! ```

pub mod config;
pub mod engine;
pub mod lineage;
pub mod pattern;
pub mod rules;
pub mod table;

pub use config::{
    ActionConfig, DefaultAction, FilterConfig, RemoveConfig, RuleConfig, SelectConfig,
};
pub use engine::FilterEngine;
pub use lineage::{LineageSink, NullLineage, FILTER_EVENT};
pub use pattern::NamePattern;
pub use rules::Rule;
pub use table::{RuleEntry, RuleTable};

/// Result type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Error types for the rule engine.
///
/// Per-rule problems (bad fields, invalid regex) are logged and the
/// offending rule skipped during table construction; only whole-document
/// failures surface through this type to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration must be a JSON object")]
    NotAnObject,

    #[error("Configuration has no 'rules' array")]
    MissingRules,

    #[error("Rule for asset '{asset}' is missing required field '{field}'")]
    MissingRuleField { asset: String, field: &'static str },

    #[error("Rule for asset '{asset}' has an unrecognised action '{action}'")]
    UnknownAction { asset: String, action: String },
}
