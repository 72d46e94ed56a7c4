//! Rule configuration documents.
//!
//! Rules arrive as a JSON document:
//!
//! ```json
//! {
//!     "defaultAction": "include",
//!     "rules": [
//!         { "asset_name": "pump[0-9]*", "action": "rename", "new_asset_name": "pump" }
//!     ]
//! }
//! ```
//!
//! Parsing is deliberately lenient at the rule level: a malformed rule
//! (non-object entry, missing or mistyped fields, unknown action) is
//! logged and skipped, and the remaining rules continue to load. Only a
//! missing or non-array top-level `rules` key fails the whole document,
//! which on reconfiguration leaves the previously active table in force.

use crate::{Result, RuleError};
use serde_json::Value as Json;
use tracing::{error, info, warn};

/// The action applied to readings no configured rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultAction {
    /// Pass the reading through unchanged.
    #[default]
    Include,
    /// Drop the reading.
    Exclude,
    /// Flatten nested datapoints.
    Flatten,
    /// No default rule; unmatched readings pass through untouched.
    None,
}

/// One parsed, validated rule entry.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// The configured asset name or pattern.
    pub asset_name: String,
    /// The validated action and its fields.
    pub action: ActionConfig,
}

/// Action-specific configuration, validated field-by-field.
#[derive(Debug, Clone)]
pub enum ActionConfig {
    Include,
    Exclude,
    Rename {
        new_asset_name: String,
    },
    DatapointMap {
        /// Old name (literal or pattern) to new name, in document order.
        map: Vec<(String, String)>,
    },
    Remove(RemoveConfig),
    Select(SelectConfig),
    Flatten,
    Split {
        /// New asset name to source datapoint names, in document order.
        /// Empty means auto-split, one output reading per datapoint.
        groups: Vec<(String, Vec<String>)>,
    },
    Nest {
        /// New datapoint name to source datapoint names, in document order.
        groups: Vec<(String, Vec<String>)>,
    },
}

/// What a remove rule matches: exactly one of these.
#[derive(Debug, Clone)]
pub enum RemoveConfig {
    /// A single datapoint name or pattern.
    Datapoint(String),
    /// A datapoint type name (aliases accepted, case-insensitive).
    Type(String),
    /// A list of datapoint names or patterns.
    Datapoints(Vec<String>),
}

/// What a select rule retains: names or one type.
#[derive(Debug, Clone)]
pub enum SelectConfig {
    /// Datapoint names or patterns to keep.
    Datapoints(Vec<String>),
    /// A datapoint type name (aliases accepted, case-insensitive).
    Type(String),
}

/// A fully parsed configuration document.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Action for readings whose initial asset name matched no rule.
    pub default_action: DefaultAction,
    /// The valid rules, in document order.
    pub rules: Vec<RuleConfig>,
}

impl FilterConfig {
    /// Parse a JSON configuration document.
    ///
    /// Fails on JSON syntax errors and on a missing or non-array
    /// `rules` key; individual malformed rules are logged and skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let document: Json = serde_json::from_str(text)?;
        let object = document.as_object().ok_or(RuleError::NotAnObject)?;

        let default_action = match object.get("defaultAction") {
            None => {
                info!("No default action found in the filter rules, assuming include");
                DefaultAction::Include
            }
            Some(Json::String(raw)) => match raw.to_lowercase().as_str() {
                "include" => DefaultAction::Include,
                "exclude" => DefaultAction::Exclude,
                "flatten" => DefaultAction::Flatten,
                other => {
                    error!("The action '{other}' is not a valid default action");
                    DefaultAction::None
                }
            },
            Some(other) => {
                error!("The defaultAction must be a string, got {other}");
                DefaultAction::None
            }
        };

        let entries = object
            .get("rules")
            .ok_or(RuleError::MissingRules)?
            .as_array()
            .ok_or(RuleError::MissingRules)?;

        let mut rules = Vec::with_capacity(entries.len());
        for entry in entries {
            match parse_rule(entry) {
                Ok(rule) => rules.push(rule),
                Err(e) => error!("Skipping rule: {e}"),
            }
        }

        Ok(Self {
            default_action,
            rules,
        })
    }
}

/// Parse one entry of the `rules` array.
fn parse_rule(entry: &Json) -> Result<RuleConfig> {
    let object = entry.as_object().ok_or_else(|| RuleError::MissingRuleField {
        asset: entry.to_string(),
        field: "asset_name",
    })?;

    let asset_name = require_string(object, "asset_name", "<unnamed>")?;
    let action_name = require_string(object, "action", &asset_name)?.to_lowercase();

    let action = match action_name.as_str() {
        "include" => ActionConfig::Include,
        "exclude" => ActionConfig::Exclude,
        "flatten" => ActionConfig::Flatten,
        "rename" => ActionConfig::Rename {
            new_asset_name: require_string(object, "new_asset_name", &asset_name)?,
        },
        "datapointmap" => ActionConfig::DatapointMap {
            map: parse_string_map(object, "map", &asset_name)?,
        },
        "remove" => ActionConfig::Remove(parse_remove(object, &asset_name)?),
        "select" | "retain" => ActionConfig::Select(parse_select(object, &asset_name)?),
        "split" => ActionConfig::Split {
            groups: parse_groups(object, "split", &asset_name).unwrap_or_default(),
        },
        "nest" => ActionConfig::Nest {
            groups: parse_groups(object, "nest", &asset_name)
                .ok_or(RuleError::MissingRuleField {
                    asset: asset_name.clone(),
                    field: "nest",
                })?,
        },
        other => {
            return Err(RuleError::UnknownAction {
                asset: asset_name,
                action: other.to_string(),
            })
        }
    };

    Ok(RuleConfig { asset_name, action })
}

/// Fetch a required string field.
fn require_string(
    object: &serde_json::Map<String, Json>,
    field: &'static str,
    asset: &str,
) -> Result<String> {
    object
        .get(field)
        .and_then(Json::as_str)
        .map(str::to_string)
        .ok_or_else(|| RuleError::MissingRuleField {
            asset: asset.to_string(),
            field,
        })
}

/// Parse an object of string-to-string members, preserving order.
///
/// Non-string member values are logged and skipped.
fn parse_string_map(
    object: &serde_json::Map<String, Json>,
    field: &'static str,
    asset: &str,
) -> Result<Vec<(String, String)>> {
    let members = object
        .get(field)
        .and_then(Json::as_object)
        .ok_or_else(|| RuleError::MissingRuleField {
            asset: asset.to_string(),
            field,
        })?;

    let mut map = Vec::with_capacity(members.len());
    for (name, value) in members {
        match value.as_str() {
            Some(new_name) => map.push((name.clone(), new_name.to_string())),
            None => error!(
                "The new name for datapoint '{name}' in the rule for asset '{asset}' \
                 must be a string"
            ),
        }
    }
    Ok(map)
}

/// Parse a split/nest grouping object: new name to array of datapoint names.
///
/// Returns `None` when the field is absent (legal for split, which then
/// auto-splits by datapoint). Groups whose value is not an array, and
/// names that are not strings, are logged and skipped.
fn parse_groups(
    object: &serde_json::Map<String, Json>,
    field: &'static str,
    asset: &str,
) -> Option<Vec<(String, Vec<String>)>> {
    let members = object.get(field)?.as_object().or_else(|| {
        error!("The '{field}' property for asset '{asset}' is not a JSON object");
        None
    })?;

    let mut groups = Vec::with_capacity(members.len());
    for (new_name, names) in members {
        let Some(names) = names.as_array() else {
            error!(
                "The '{field}' group '{new_name}' for asset '{asset}' does not have \
                 a list of datapoint names"
            );
            continue;
        };
        let mut datapoints = Vec::with_capacity(names.len());
        for name in names {
            match name.as_str() {
                Some(name) => datapoints.push(name.to_string()),
                None => error!(
                    "A datapoint name in the '{field}' group '{new_name}' for asset \
                     '{asset}' is not a string"
                ),
            }
        }
        groups.push((new_name.clone(), datapoints));
    }
    Some(groups)
}

/// Parse the remove rule's matcher: exactly one of datapoint/type/datapoints.
fn parse_remove(object: &serde_json::Map<String, Json>, asset: &str) -> Result<RemoveConfig> {
    if let Some(name) = object.get("datapoint").and_then(Json::as_str) {
        return Ok(RemoveConfig::Datapoint(name.to_string()));
    }
    if let Some(type_name) = object.get("type").and_then(Json::as_str) {
        return Ok(RemoveConfig::Type(type_name.to_string()));
    }
    if let Some(names) = object.get("datapoints").and_then(Json::as_array) {
        return Ok(RemoveConfig::Datapoints(string_items(names, asset)));
    }
    Err(RuleError::MissingRuleField {
        asset: asset.to_string(),
        field: "datapoint",
    })
}

/// Parse the select rule's matcher: datapoints, a single datapoint, or a type.
fn parse_select(object: &serde_json::Map<String, Json>, asset: &str) -> Result<SelectConfig> {
    if let Some(type_name) = object.get("type").and_then(Json::as_str) {
        return Ok(SelectConfig::Type(type_name.to_string()));
    }
    if let Some(names) = object.get("datapoints").and_then(Json::as_array) {
        return Ok(SelectConfig::Datapoints(string_items(names, asset)));
    }
    if let Some(name) = object.get("datapoint").and_then(Json::as_str) {
        return Ok(SelectConfig::Datapoints(vec![name.to_string()]));
    }
    Err(RuleError::MissingRuleField {
        asset: asset.to_string(),
        field: "datapoints",
    })
}

/// Collect the string items of an array, logging anything else.
fn string_items(names: &[Json], asset: &str) -> Vec<String> {
    let mut items = Vec::with_capacity(names.len());
    for name in names {
        match name.as_str() {
            Some(name) => items.push(name.to_string()),
            None => warn!("The datapoint names in the rule for asset '{asset}' must all be strings"),
        }
    }
    items
}
