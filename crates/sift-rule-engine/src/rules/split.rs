//! The split rule: fan one reading out into several.

use super::ExecContext;
use crate::pattern::{is_pattern, NamePattern};
use sift_core::Reading;
use tracing::debug;

/// Split a reading into the configured groups, or one reading per
/// datapoint when no groups are configured.
///
/// Each group names the new asset and lists the datapoints it takes; a
/// group that finds none of its datapoints emits nothing. When the
/// rule's asset pattern is a regex and the group name contains regex
/// material, the group name is a capture-group substitution against the
/// original asset name. The input reading is always consumed.
#[derive(Debug, Clone)]
pub struct SplitRule {
    pattern: NamePattern,
    groups: Vec<(String, Vec<String>)>,
}

impl SplitRule {
    pub fn new(pattern: &NamePattern, groups: Vec<(String, Vec<String>)>) -> Self {
        Self {
            pattern: pattern.clone(),
            groups,
        }
    }

    fn group_asset(&self, template: &str, original: &str) -> String {
        if self.pattern.is_regex() && is_pattern(template) {
            if let Some(name) = self.pattern.substitute(original, template) {
                return name;
            }
        }
        template.to_string()
    }

    pub(super) fn execute(&self, reading: Reading, ctx: &ExecContext<'_>) -> Vec<Reading> {
        if self.groups.is_empty() {
            return self.auto_split(reading, ctx);
        }

        let mut out = Vec::with_capacity(self.groups.len());
        for (template, wanted) in &self.groups {
            let datapoints: Vec<_> = wanted
                .iter()
                .filter_map(|name| reading.datapoint(name).cloned())
                .collect();
            if datapoints.is_empty() {
                debug!(
                    "Split group '{template}' found no datapoints in asset '{}'",
                    reading.asset
                );
                continue;
            }
            let asset = self.group_asset(template, &reading.asset);
            ctx.notify(&asset);
            out.push(Reading::with_timestamp(asset, datapoints, reading.timestamp));
        }
        out
    }

    fn auto_split(&self, reading: Reading, ctx: &ExecContext<'_>) -> Vec<Reading> {
        let mut out = Vec::with_capacity(reading.datapoints.len());
        for dp in reading.datapoints {
            let asset = format!("{}_{}", reading.asset, dp.name);
            ctx.notify(&asset);
            out.push(Reading::with_timestamp(asset, vec![dp], reading.timestamp));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::NullLineage;
    use crate::rules::test_support::RecordingLineage;
    use sift_core::{DataPoint, Value};

    fn reading() -> Reading {
        Reading::new(
            "test",
            vec![
                DataPoint::new("Floor1", Value::Integer(30)),
                DataPoint::new("Floor2", Value::Integer(34)),
                DataPoint::new("Floor3", Value::Integer(36)),
            ],
        )
    }

    fn null_ctx() -> ExecContext<'static> {
        ExecContext {
            service: "svc",
            lineage: &NullLineage,
        }
    }

    #[test]
    fn configured_groups_emit_in_order() {
        let pattern = NamePattern::new("test").unwrap();
        let rule = SplitRule::new(
            &pattern,
            vec![
                (
                    "test_1".to_string(),
                    vec!["Floor1".to_string(), "Floor2".to_string()],
                ),
                ("test_2".to_string(), vec!["Floor1".to_string()]),
            ],
        );
        let out = rule.execute(reading(), &null_ctx());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].asset, "test_1");
        assert_eq!(out[0].datapoint_count(), 2);
        assert_eq!(out[1].asset, "test_2");
        assert_eq!(out[1].datapoint_count(), 1);
    }

    #[test]
    fn group_with_no_datapoints_emits_nothing() {
        let pattern = NamePattern::new("test").unwrap();
        let rule = SplitRule::new(
            &pattern,
            vec![("empty".to_string(), vec!["missing".to_string()])],
        );
        assert!(rule.execute(reading(), &null_ctx()).is_empty());
    }

    #[test]
    fn group_name_substitutes_capture_groups() {
        let pattern = NamePattern::new("line([0-9]+)").unwrap();
        let rule = SplitRule::new(
            &pattern,
            vec![("unit$1_a".to_string(), vec!["Floor1".to_string()])],
        );
        let mut input = reading();
        input.asset = "line7".to_string();
        let out = rule.execute(input, &null_ctx());
        assert_eq!(out[0].asset, "unit7_a");
    }

    #[test]
    fn no_groups_splits_per_datapoint() {
        let pattern = NamePattern::new("test").unwrap();
        let rule = SplitRule::new(&pattern, Vec::new());
        let out = rule.execute(reading(), &null_ctx());
        let assets: Vec<&str> = out.iter().map(|r| r.asset.as_str()).collect();
        assert_eq!(assets, vec!["test_Floor1", "test_Floor2", "test_Floor3"]);
        assert!(out.iter().all(|r| r.datapoint_count() == 1));
    }

    #[test]
    fn each_emitted_reading_is_notified() {
        let lineage = RecordingLineage::default();
        let ctx = ExecContext {
            service: "svc",
            lineage: &lineage,
        };
        let pattern = NamePattern::new("test").unwrap();
        let rule = SplitRule::new(
            &pattern,
            vec![
                ("test_1".to_string(), vec!["Floor1".to_string()]),
                ("test_2".to_string(), vec!["Floor2".to_string()]),
            ],
        );
        rule.execute(reading(), &ctx);
        assert_eq!(lineage.assets(), vec!["test_1", "test_2"]);
    }
}
