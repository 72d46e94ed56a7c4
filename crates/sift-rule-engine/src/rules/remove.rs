//! The remove rule: delete datapoints from a matching reading.

use super::TypeFilter;
use crate::config::RemoveConfig;
use crate::pattern::{is_pattern, NamePattern};
use crate::Result;
use sift_core::Reading;
use tracing::debug;

/// How a single configured name matches a datapoint.
#[derive(Debug, Clone)]
enum NameMatcher {
    Literal(String),
    Pattern(NamePattern),
}

impl NameMatcher {
    fn new(name: &str) -> Result<Self> {
        Ok(if is_pattern(name) {
            NameMatcher::Pattern(NamePattern::new(name)?)
        } else {
            NameMatcher::Literal(name.to_string())
        })
    }

    fn matches(&self, candidate: &str) -> bool {
        match self {
            NameMatcher::Literal(name) => name == candidate,
            NameMatcher::Pattern(pattern) => pattern.matches(candidate),
        }
    }
}

/// Delete datapoints by name, pattern, type, or a mixed list of names.
///
/// The reading itself is always returned, even when every datapoint was
/// removed; only select drops empty readings.
#[derive(Debug, Clone)]
pub struct RemoveRule {
    matcher: RemoveMatcher,
}

#[derive(Debug, Clone)]
enum RemoveMatcher {
    Name(NameMatcher),
    Type(TypeFilter),
    Names(Vec<NameMatcher>),
}

impl RemoveRule {
    /// Build the rule from its validated configuration.
    pub fn new(pattern: &NamePattern, config: &RemoveConfig) -> Result<Self> {
        let matcher = match config {
            RemoveConfig::Datapoint(name) => RemoveMatcher::Name(NameMatcher::new(name)?),
            RemoveConfig::Type(type_name) => {
                RemoveMatcher::Type(TypeFilter::new(type_name, pattern.as_str()))
            }
            RemoveConfig::Datapoints(names) => RemoveMatcher::Names(
                names
                    .iter()
                    .map(|name| NameMatcher::new(name))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(Self { matcher })
    }

    pub(super) fn execute(&self, mut reading: Reading) -> Vec<Reading> {
        reading.datapoints.retain(|dp| {
            let remove = match &self.matcher {
                RemoveMatcher::Name(matcher) => matcher.matches(&dp.name),
                RemoveMatcher::Type(filter) => filter.matches(&dp.value),
                RemoveMatcher::Names(matchers) => {
                    matchers.iter().any(|matcher| matcher.matches(&dp.name))
                }
            };
            if remove {
                debug!("Removing datapoint '{}'", dp.name);
            }
            !remove
        });
        vec![reading]
    }
}
