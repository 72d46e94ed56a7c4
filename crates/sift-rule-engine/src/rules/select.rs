//! The select rule: keep only the named or typed datapoints.

use super::TypeFilter;
use crate::config::SelectConfig;
use crate::pattern::{is_pattern, NamePattern};
use crate::Result;
use sift_core::{DataPoint, Reading};
use tracing::debug;

/// Keep only the datapoints matching the configured names or type.
///
/// Names are split into literals and patterns at build time; a
/// datapoint survives if it matches either. When nothing survives the
/// whole reading is dropped.
#[derive(Debug, Clone)]
pub struct SelectRule {
    matcher: SelectMatcher,
}

#[derive(Debug, Clone)]
enum SelectMatcher {
    Names {
        literals: Vec<String>,
        patterns: Vec<NamePattern>,
    },
    Type(TypeFilter),
}

impl SelectRule {
    /// Build the rule from its validated configuration.
    pub fn new(pattern: &NamePattern, config: &SelectConfig) -> Result<Self> {
        let matcher = match config {
            SelectConfig::Datapoints(names) => {
                let mut literals = Vec::new();
                let mut patterns = Vec::new();
                for name in names {
                    if is_pattern(name) {
                        patterns.push(NamePattern::new(name)?);
                    } else {
                        literals.push(name.clone());
                    }
                }
                SelectMatcher::Names { literals, patterns }
            }
            SelectConfig::Type(type_name) => {
                SelectMatcher::Type(TypeFilter::new(type_name, pattern.as_str()))
            }
        };
        Ok(Self { matcher })
    }

    fn keeps(&self, dp: &DataPoint) -> bool {
        match &self.matcher {
            SelectMatcher::Names { literals, patterns } => {
                literals.iter().any(|name| name == &dp.name)
                    || patterns.iter().any(|pattern| pattern.matches(&dp.name))
            }
            SelectMatcher::Type(filter) => filter.matches(&dp.value),
        }
    }

    pub(super) fn execute(&self, mut reading: Reading) -> Vec<Reading> {
        reading.datapoints.retain(|dp| self.keeps(dp));
        if reading.datapoints.is_empty() {
            debug!(
                "No datapoint selected for asset '{}', dropping the reading",
                reading.asset
            );
            return Vec::new();
        }
        vec![reading]
    }
}
