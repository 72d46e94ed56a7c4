//! The nest rule: gather datapoints under new dict children.

use sift_core::{DataPoint, Reading, Value};

/// Move the named datapoints of each group into a dict datapoint named
/// after the group.
///
/// Groups apply in configuration order, so a later group can nest a
/// dict produced by an earlier one. A group whose datapoints are all
/// absent still inserts an empty dict. Datapoints named by no group are
/// untouched.
#[derive(Debug, Clone)]
pub struct NestRule {
    groups: Vec<(String, Vec<String>)>,
}

impl NestRule {
    pub fn new(groups: Vec<(String, Vec<String>)>) -> Self {
        Self { groups }
    }

    pub(super) fn execute(&self, mut reading: Reading) -> Vec<Reading> {
        for (group, wanted) in &self.groups {
            let mut children = Vec::with_capacity(wanted.len());
            for name in wanted {
                if let Some(dp) = reading.remove_datapoint(name) {
                    children.push(dp);
                }
            }
            reading.push_datapoint(DataPoint::new(group, Value::Dict(children)));
        }
        vec![reading]
    }
}
