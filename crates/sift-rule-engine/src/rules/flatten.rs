//! The flatten rule: hoist nested container datapoints to the top level.

use sift_core::{DataPoint, Reading, Value};

/// Replace every dict or list datapoint with its scalar leaves.
///
/// Leaf names are the path of container names joined with `_`, so a
/// dict `pressure` holding `floor1` yields `pressure_floor1`. Nesting
/// of any depth is walked; leaf order follows the original traversal
/// order. The output is always a single reading with the same asset
/// name and timestamp.
#[derive(Debug, Clone)]
pub struct FlattenRule;

impl FlattenRule {
    pub(super) fn execute(&self, reading: Reading) -> Vec<Reading> {
        let mut flat = Vec::with_capacity(reading.datapoints.len());
        for dp in reading.datapoints {
            flatten_into(dp.name, dp.value, &mut flat);
        }
        vec![Reading::with_timestamp(
            reading.asset,
            flat,
            reading.timestamp,
        )]
    }
}

fn flatten_into(prefix: String, value: Value, out: &mut Vec<DataPoint>) {
    match value {
        Value::Dict(children) | Value::List(children) => {
            for child in children {
                flatten_into(format!("{prefix}_{}", child.name), child.value, out);
            }
        }
        leaf => out.push(DataPoint::new(prefix, leaf)),
    }
}
