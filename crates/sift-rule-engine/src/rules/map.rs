//! The datapointmap rule: rename datapoints within a matching reading.

use super::ExecContext;
use crate::pattern::{is_pattern, NamePattern};
use crate::Result;
use sift_core::Reading;
use std::collections::HashMap;

/// Rename datapoints by literal name or by pattern substitution.
///
/// Literal names are checked first; failing that, the configured
/// patterns are tried in configuration order and the first full match
/// wins. Datapoints matching nothing are left unchanged.
#[derive(Debug, Clone)]
pub struct DatapointMapRule {
    literal: HashMap<String, String>,
    patterns: Vec<(NamePattern, String)>,
}

impl DatapointMapRule {
    /// Build the rule from the configured old-name to new-name map.
    pub fn new(map: &[(String, String)]) -> Result<Self> {
        let mut literal = HashMap::new();
        let mut patterns = Vec::new();
        for (old_name, new_name) in map {
            if is_pattern(old_name) {
                patterns.push((NamePattern::new(old_name)?, new_name.clone()));
            } else {
                literal.insert(old_name.clone(), new_name.clone());
            }
        }
        Ok(Self { literal, patterns })
    }

    pub(super) fn execute(&self, mut reading: Reading, ctx: &ExecContext<'_>) -> Vec<Reading> {
        for dp in &mut reading.datapoints {
            if let Some(new_name) = self.literal.get(&dp.name) {
                dp.name = new_name.clone();
                continue;
            }
            for (pattern, template) in &self.patterns {
                if let Some(new_name) = pattern.substitute(&dp.name, template) {
                    dp.name = new_name;
                    break;
                }
            }
        }
        ctx.notify(&reading.asset);
        vec![reading]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::NullLineage;
    use sift_core::{DataPoint, Value};

    fn ctx() -> ExecContext<'static> {
        ExecContext {
            service: "svc",
            lineage: &NullLineage,
        }
    }

    fn reading(names: &[&str]) -> Reading {
        Reading::new(
            "asset",
            names
                .iter()
                .map(|n| DataPoint::new(*n, Value::Integer(1)))
                .collect(),
        )
    }

    #[test]
    fn literal_names_are_mapped() {
        let rule =
            DatapointMapRule::new(&[("value".to_string(), "new_value".to_string())]).unwrap();
        let out = rule.execute(reading(&["value", "other"]), &ctx());
        let names: Vec<&str> = out[0].datapoints.iter().map(|dp| dp.name.as_str()).collect();
        assert_eq!(names, vec!["new_value", "other"]);
    }

    #[test]
    fn pattern_substitution_renames() {
        let rule =
            DatapointMapRule::new(&[("ch([0-9]+)".to_string(), "channel_$1".to_string())])
                .unwrap();
        let out = rule.execute(reading(&["ch1", "ch22", "temp"]), &ctx());
        let names: Vec<&str> = out[0].datapoints.iter().map(|dp| dp.name.as_str()).collect();
        assert_eq!(names, vec!["channel_1", "channel_22", "temp"]);
    }

    #[test]
    fn literal_wins_over_pattern() {
        let rule = DatapointMapRule::new(&[
            ("ch.*".to_string(), "matched".to_string()),
            ("ch1".to_string(), "literal".to_string()),
        ])
        .unwrap();
        let out = rule.execute(reading(&["ch1", "ch2"]), &ctx());
        let names: Vec<&str> = out[0].datapoints.iter().map(|dp| dp.name.as_str()).collect();
        assert_eq!(names, vec!["literal", "matched"]);
    }

    #[test]
    fn first_matching_pattern_wins() {
        let rule = DatapointMapRule::new(&[
            ("c.*".to_string(), "first".to_string()),
            ("ch.*".to_string(), "second".to_string()),
        ])
        .unwrap();
        let out = rule.execute(reading(&["ch1"]), &ctx());
        assert_eq!(out[0].datapoints[0].name, "first");
    }

    #[test]
    fn invalid_pattern_fails_construction() {
        assert!(DatapointMapRule::new(&[("ch[".to_string(), "x".to_string())]).is_err());
    }
}
