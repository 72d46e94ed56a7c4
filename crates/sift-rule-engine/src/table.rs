//! The compiled rule table.

use crate::config::{DefaultAction, FilterConfig};
use crate::pattern::NamePattern;
use crate::rules::{FlattenRule, Rule};
use crate::Result;
use tracing::{debug, error};

/// A compiled rule: the asset pattern plus its executable action.
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub pattern: NamePattern,
    pub rule: Rule,
}

/// An immutable, fully compiled set of rules.
///
/// Built once per configuration document and shared read-only between
/// ingest calls; reconfiguration builds a fresh table and swaps it in.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
    default_rule: Option<Rule>,
}

impl RuleTable {
    /// Parse and compile a JSON configuration document.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::from_config(&FilterConfig::parse(text)?))
    }

    /// Compile a parsed configuration.
    ///
    /// Rules whose asset pattern or action fields fail to compile are
    /// logged and dropped; the rest of the table still loads.
    pub fn from_config(config: &FilterConfig) -> Self {
        let mut entries = Vec::with_capacity(config.rules.len());
        for rule_config in &config.rules {
            let pattern = match NamePattern::new(&rule_config.asset_name) {
                Ok(pattern) => pattern,
                Err(e) => {
                    error!("Skipping rule: {e}");
                    continue;
                }
            };
            match Rule::compile(&pattern, &rule_config.action) {
                Ok(rule) => {
                    debug!(
                        "Loaded {} rule for asset '{}'",
                        rule.kind(),
                        pattern.as_str()
                    );
                    entries.push(RuleEntry { pattern, rule });
                }
                Err(e) => error!("Skipping rule: {e}"),
            }
        }

        let default_rule = match config.default_action {
            DefaultAction::Include => Some(Rule::Include),
            DefaultAction::Exclude => Some(Rule::Exclude),
            DefaultAction::Flatten => Some(Rule::Flatten(FlattenRule)),
            DefaultAction::None => None,
        };

        Self {
            entries,
            default_rule,
        }
    }

    /// The compiled rules, in configuration order.
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// The rule applied when a reading's initial asset name matches
    /// nothing, if one is configured.
    pub fn default_rule(&self) -> Option<&Rule> {
        self.default_rule.as_ref()
    }

    /// Index of the first entry at or after `from` matching `asset`.
    pub fn first_match(&self, asset: &str, from: usize) -> Option<usize> {
        self.entries[from..]
            .iter()
            .position(|entry| entry.pattern.matches(asset))
            .map(|offset| from + offset)
    }
}
