//! The transformation rule variants.
//!
//! Every variant honours the same contract: consume ownership of one
//! reading, return zero or more output readings. A rule never leaves
//! its input half-transformed; either the reading is mutated and
//! returned, or it is consumed and replaced by derived readings.
//!
//! The set is closed and dispatched through the [`Rule`] enum rather
//! than an open trait hierarchy, so the compiler checks that every
//! variant is handled wherever rules are executed.

mod flatten;
mod map;
mod nest;
mod remove;
mod select;
mod split;
mod type_filter;

pub use flatten::FlattenRule;
pub use map::DatapointMapRule;
pub use nest::NestRule;
pub use remove::RemoveRule;
pub use select::SelectRule;
pub use split::SplitRule;
pub use type_filter::TypeFilter;

use crate::config::ActionConfig;
use crate::lineage::{LineageSink, FILTER_EVENT};
use crate::pattern::{is_pattern, NamePattern};
use crate::Result;
use sift_core::Reading;
use tracing::warn;

/// Per-ingest context handed to every rule execution.
pub struct ExecContext<'a> {
    /// Name of the hosting service, reported to the lineage sink.
    pub service: &'a str,
    /// The asset lineage collaborator.
    pub lineage: &'a dyn LineageSink,
}

impl ExecContext<'_> {
    fn notify(&self, asset: &str) {
        self.lineage.notify(self.service, asset, FILTER_EVENT);
    }
}

/// One configured transformation.
#[derive(Debug, Clone)]
pub enum Rule {
    Include,
    Exclude,
    Rename(RenameRule),
    DatapointMap(DatapointMapRule),
    Remove(RemoveRule),
    Select(SelectRule),
    Flatten(FlattenRule),
    Split(SplitRule),
    Nest(NestRule),
}

impl Rule {
    /// Build an executable rule from its validated configuration.
    ///
    /// `pattern` is the rule's compiled asset pattern; rename and split
    /// keep a copy for capture-group substitution. Fails when a
    /// datapoint name inside the action classifies as a regex but does
    /// not compile.
    pub fn compile(pattern: &NamePattern, action: &ActionConfig) -> Result<Rule> {
        Ok(match action {
            ActionConfig::Include => Rule::Include,
            ActionConfig::Exclude => Rule::Exclude,
            ActionConfig::Flatten => Rule::Flatten(FlattenRule),
            ActionConfig::Rename { new_asset_name } => {
                Rule::Rename(RenameRule::new(pattern, new_asset_name))
            }
            ActionConfig::DatapointMap { map } => {
                Rule::DatapointMap(DatapointMapRule::new(map)?)
            }
            ActionConfig::Remove(config) => Rule::Remove(RemoveRule::new(pattern, config)?),
            ActionConfig::Select(config) => Rule::Select(SelectRule::new(pattern, config)?),
            ActionConfig::Split { groups } => {
                Rule::Split(SplitRule::new(pattern, groups.clone()))
            }
            ActionConfig::Nest { groups } => Rule::Nest(NestRule::new(groups.clone())),
        })
    }

    /// The action name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Include => "include",
            Rule::Exclude => "exclude",
            Rule::Rename(_) => "rename",
            Rule::DatapointMap(_) => "datapointmap",
            Rule::Remove(_) => "remove",
            Rule::Select(_) => "select",
            Rule::Flatten(_) => "flatten",
            Rule::Split(_) => "split",
            Rule::Nest(_) => "nest",
        }
    }

    /// Execute this rule on one reading.
    pub fn execute(&self, reading: Reading, ctx: &ExecContext<'_>) -> Vec<Reading> {
        match self {
            Rule::Include => {
                ctx.notify(&reading.asset);
                vec![reading]
            }
            Rule::Exclude => {
                ctx.notify(&reading.asset);
                Vec::new()
            }
            Rule::Rename(rule) => rule.execute(reading, ctx),
            Rule::DatapointMap(rule) => rule.execute(reading, ctx),
            Rule::Remove(rule) => rule.execute(reading),
            Rule::Select(rule) => rule.execute(reading),
            Rule::Flatten(rule) => rule.execute(reading),
            Rule::Split(rule) => rule.execute(reading, ctx),
            Rule::Nest(rule) => rule.execute(reading),
        }
    }
}

/// Rename a matching reading's asset name.
///
/// The new name is either a literal or, when both the rule's asset
/// pattern and the new name contain regex material, a capture-group
/// substitution against the current asset name.
#[derive(Debug, Clone)]
pub struct RenameRule {
    pattern: NamePattern,
    new_name: String,
    substitute: bool,
}

impl RenameRule {
    fn new(pattern: &NamePattern, new_name: &str) -> Self {
        let substitute = pattern.is_regex() && is_pattern(new_name);
        if !pattern.is_regex() && is_pattern(new_name) {
            warn!(
                "The new asset name '{new_name}' looks like a substitution but the \
                 rule for asset '{}' is a literal match; using it verbatim",
                pattern.as_str()
            );
        }
        Self {
            pattern: pattern.clone(),
            new_name: new_name.to_string(),
            substitute,
        }
    }

    fn execute(&self, mut reading: Reading, ctx: &ExecContext<'_>) -> Vec<Reading> {
        let original = reading.asset.clone();
        if self.substitute {
            if let Some(renamed) = self.pattern.substitute(&reading.asset, &self.new_name) {
                reading.asset = renamed;
            }
        } else {
            reading.asset = self.new_name.clone();
        }
        ctx.notify(&original);
        ctx.notify(&reading.asset);
        vec![reading]
    }
}
