//! Asset lineage notifications.
//!
//! The engine reports every terminal asset name it emits (including
//! excluded and renamed names) to an external lineage collaborator.
//! The collaborator is behind a trait so the host can wire in its own
//! tracker; the engine defaults to a no-op sink.

/// Event name reported for every filter-produced asset.
pub const FILTER_EVENT: &str = "Filter";

/// Sink for asset lineage notifications.
pub trait LineageSink: Send + Sync {
    /// Record that `service` produced (or consumed) `asset` via `event`.
    fn notify(&self, service: &str, asset: &str, event: &str);
}

/// A lineage sink that discards all notifications.
#[derive(Debug, Default)]
pub struct NullLineage;

impl LineageSink for NullLineage {
    fn notify(&self, _service: &str, _asset: &str, _event: &str) {}
}
