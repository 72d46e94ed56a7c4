//! The filter engine: rule chaining over batches of readings.

use crate::lineage::{LineageSink, NullLineage};
use crate::rules::ExecContext;
use crate::table::RuleTable;
use crate::Result;
use parking_lot::RwLock;
use sift_core::Reading;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// A reconfigurable rule engine over batches of readings.
///
/// Each reading in a batch is chained through the rule table: the first
/// rule matching its asset name executes, and every reading that
/// execution produces continues down the table from the next entry. A
/// rule never sees output it already contributed to, so a rename back
/// to a previously matched name cannot loop. The default action applies
/// only to readings whose initial asset name matched no rule at all.
///
/// The compiled table sits behind a lock that `ingest` holds just long
/// enough to clone an [`Arc`], so reconfiguration never stalls the data
/// path.
pub struct FilterEngine {
    service: String,
    table: RwLock<Arc<RuleTable>>,
    enabled: AtomicBool,
    lineage: Arc<dyn LineageSink>,
}

impl FilterEngine {
    /// Build an engine from a JSON configuration document.
    ///
    /// Lineage notifications are discarded; use [`with_lineage`] to
    /// collect them.
    ///
    /// [`with_lineage`]: FilterEngine::with_lineage
    pub fn new(service: impl Into<String>, config: &str) -> Result<Self> {
        Self::with_lineage(service, config, Arc::new(NullLineage))
    }

    /// Build an engine reporting asset lineage to `lineage`.
    pub fn with_lineage(
        service: impl Into<String>,
        config: &str,
        lineage: Arc<dyn LineageSink>,
    ) -> Result<Self> {
        let service = service.into();
        let table = RuleTable::parse(config)?;
        info!(
            "Loaded {} rules for service '{service}'",
            table.entries().len()
        );
        Ok(Self {
            service,
            table: RwLock::new(Arc::new(table)),
            enabled: AtomicBool::new(true),
            lineage,
        })
    }

    /// Replace the rule table from a new configuration document.
    ///
    /// On any parse failure the previous table stays in force.
    pub fn reconfigure(&self, config: &str) -> Result<()> {
        let table = RuleTable::parse(config)?;
        info!(
            "Reconfigured service '{}' with {} rules",
            self.service,
            table.entries().len()
        );
        *self.table.write() = Arc::new(table);
        Ok(())
    }

    /// Whether ingest currently applies the rules.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enable or disable filtering; a disabled engine passes batches
    /// through untouched.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Run a batch of readings through the rule chain.
    pub fn ingest(&self, readings: Vec<Reading>) -> Vec<Reading> {
        if !self.is_enabled() {
            return readings;
        }
        let table = Arc::clone(&self.table.read());
        let ctx = ExecContext {
            service: &self.service,
            lineage: self.lineage.as_ref(),
        };

        let mut out = Vec::with_capacity(readings.len());
        for reading in readings {
            self.run_chain(&table, &ctx, reading, &mut out);
        }
        out
    }

    /// Chain one incoming reading through the table.
    fn run_chain(
        &self,
        table: &RuleTable,
        ctx: &ExecContext<'_>,
        reading: Reading,
        out: &mut Vec<Reading>,
    ) {
        match table.first_match(&reading.asset, 0) {
            Some(index) => descend(table, ctx, reading, index, out),
            None => match table.default_rule() {
                Some(rule) => {
                    debug!(
                        "No rule for asset '{}', applying the default {} action",
                        reading.asset,
                        rule.kind()
                    );
                    out.extend(rule.execute(reading, ctx));
                }
                None => out.push(reading),
            },
        }
    }
}

/// Execute the entry at `index` and chain each produced reading through
/// the remainder of the table.
fn descend(
    table: &RuleTable,
    ctx: &ExecContext<'_>,
    reading: Reading,
    index: usize,
    out: &mut Vec<Reading>,
) {
    let entry = &table.entries()[index];
    for produced in entry.rule.execute(reading, ctx) {
        match table.first_match(&produced.asset, index + 1) {
            Some(next) => descend(table, ctx, produced, next, out),
            None => out.push(produced),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::{DataPoint, Value};

    fn reading(asset: &str) -> Reading {
        Reading::new(asset, vec![DataPoint::new("value", Value::Integer(1))])
    }

    #[test]
    fn include_rule_passes_matching_readings() {
        let engine = FilterEngine::new(
            "svc",
            r#"{"rules": [{"asset_name": "pump", "action": "include"}]}"#,
        )
        .unwrap();
        let out = engine.ingest(vec![reading("pump")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].asset, "pump");
    }

    #[test]
    fn exclude_rule_drops_matching_readings() {
        let engine = FilterEngine::new(
            "svc",
            r#"{"rules": [{"asset_name": "pump", "action": "exclude"}]}"#,
        )
        .unwrap();
        assert!(engine.ingest(vec![reading("pump")]).is_empty());
    }

    #[test]
    fn default_action_applies_only_to_unmatched_readings() {
        let engine = FilterEngine::new(
            "svc",
            r#"{"defaultAction": "exclude",
                "rules": [{"asset_name": "pump", "action": "include"}]}"#,
        )
        .unwrap();
        let out = engine.ingest(vec![reading("pump"), reading("motor")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].asset, "pump");
    }

    #[test]
    fn rename_output_does_not_revisit_earlier_rules() {
        // The second rule renames back to a name the first rule matched;
        // the chain must not loop.
        let engine = FilterEngine::new(
            "svc",
            r#"{"rules": [
                {"asset_name": "a", "action": "rename", "new_asset_name": "b"},
                {"asset_name": "b", "action": "rename", "new_asset_name": "a"}
            ]}"#,
        )
        .unwrap();
        let out = engine.ingest(vec![reading("a")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].asset, "a");
    }

    #[test]
    fn disabled_engine_passes_batches_through() {
        let engine = FilterEngine::new(
            "svc",
            r#"{"rules": [{"asset_name": "pump", "action": "exclude"}]}"#,
        )
        .unwrap();
        engine.set_enabled(false);
        assert!(!engine.is_enabled());
        let out = engine.ingest(vec![reading("pump")]);
        assert_eq!(out.len(), 1);

        engine.set_enabled(true);
        assert!(engine.ingest(vec![reading("pump")]).is_empty());
    }

    #[test]
    fn failed_reconfigure_keeps_the_previous_table() {
        let engine = FilterEngine::new(
            "svc",
            r#"{"rules": [{"asset_name": "pump", "action": "exclude"}]}"#,
        )
        .unwrap();
        assert!(engine.reconfigure(r#"{"no": "rules"}"#).is_err());
        assert!(engine.ingest(vec![reading("pump")]).is_empty());
    }

    #[test]
    fn successful_reconfigure_swaps_the_table() {
        let engine = FilterEngine::new(
            "svc",
            r#"{"rules": [{"asset_name": "pump", "action": "exclude"}]}"#,
        )
        .unwrap();
        engine
            .reconfigure(r#"{"rules": [{"asset_name": "pump", "action": "include"}]}"#)
            .unwrap();
        assert_eq!(engine.ingest(vec![reading("pump")]).len(), 1);
    }

    #[test]
    fn empty_table_applies_the_default_to_everything() {
        let engine =
            FilterEngine::new("svc", r#"{"defaultAction": "exclude", "rules": []}"#).unwrap();
        assert!(engine.ingest(vec![reading("anything")]).is_empty());
    }
}
