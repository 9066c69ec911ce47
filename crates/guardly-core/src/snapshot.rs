// ── Snapshot ──
//
// Immutable aggregate of everything the poller read, replaced whole on
// every publish. Each sub-resource lives in a `Section` that remembers
// when it was last refreshed and whether the latest attempt failed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::TopEntry;
use crate::capability::{CapabilitySet, RemoteVersion};
use crate::model::status::StatusSources;
use crate::model::{
    BlockableService, BlockedServicesSet, ClientConfig, DhcpStatus, DnsConfig, EnabledStatus,
    FilteringStatus, GlobalStatus, QueryLogConfig, QueryLogEntry, RewriteRule, SafeSearchSettings,
    ServerStatus, Stats, StatsConfig,
};

/// Result of the cycle that produced a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CycleOutcome {
    /// No cycle has completed yet.
    #[default]
    Pending,
    Succeeded,
    PartiallyFailed,
    Failed,
}

// ── Section ──────────────────────────────────────────────────────────

/// One sub-resource with its freshness metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Section<T> {
    pub value: Option<Arc<T>>,
    /// Cycle that last refreshed the value. 0 = never.
    pub cycle: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// The latest read failed; `value` is the last known good one.
    pub stale: bool,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            value: None,
            cycle: 0,
            refreshed_at: None,
            stale: false,
        }
    }
}

impl<T> Section<T> {
    pub(crate) fn refresh(&mut self, value: T, cycle: u64, at: DateTime<Utc>) {
        self.value = Some(Arc::new(value));
        self.cycle = cycle;
        self.refreshed_at = Some(at);
        self.stale = false;
    }

    /// Keep the last known good value and timestamp, flag it stale.
    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_deref()
    }

    /// The value only if the latest read succeeded.
    pub fn fresh(&self) -> Option<&T> {
        if self.stale { None } else { self.get() }
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// Everything known about the server after one poll cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub cycle: u64,
    pub produced_at: Option<DateTime<Utc>>,
    /// The whole snapshot is a carry-over from a failed cycle.
    pub stale: bool,
    pub outcome: CycleOutcome,
    pub version: Option<RemoteVersion>,
    pub capabilities: CapabilitySet,
    pub status: GlobalStatus,

    pub server: Section<ServerStatus>,
    pub stats: Section<Stats>,
    pub clients: Section<Vec<ClientConfig>>,
    pub filtering: Section<FilteringStatus>,
    pub rewrites: Section<Vec<RewriteRule>>,
    pub dhcp: Section<DhcpStatus>,
    pub blocked_services: Section<BlockedServicesSet>,
    pub dns: Section<DnsConfig>,
    pub safe_browsing: Section<EnabledStatus>,
    pub parental: Section<EnabledStatus>,
    pub safe_search: Section<SafeSearchSettings>,
    pub stats_config: Section<StatsConfig>,
    pub querylog_config: Section<QueryLogConfig>,
    pub query_log: Section<Vec<QueryLogEntry>>,

    pub top_queried: Vec<TopEntry>,
    pub top_blocked: Vec<TopEntry>,
    pub top_clients: Vec<TopEntry>,
    pub catalog: Arc<Vec<BlockableService>>,
}

impl Snapshot {
    /// Recompute `status` from the freshly read sections.
    pub(crate) fn derive_status(&mut self) {
        self.status = GlobalStatus::derive(StatusSources {
            server: self.server.fresh(),
            filtering: self.filtering.fresh(),
            safe_browsing: self.safe_browsing.fresh(),
            parental: self.parental.fresh(),
            safe_search: self.safe_search.fresh(),
        });
    }

    /// Find a persistent client by name.
    pub fn client(&self, name: &str) -> Option<&ClientConfig> {
        self.clients
            .get()
            .and_then(|clients| clients.iter().find(|c| c.name == name))
    }

    /// Names of sections whose latest read failed.
    pub fn stale_sections(&self) -> Vec<&'static str> {
        let flags = [
            ("server", self.server.stale),
            ("stats", self.stats.stale),
            ("clients", self.clients.stale),
            ("filtering", self.filtering.stale),
            ("rewrites", self.rewrites.stale),
            ("dhcp", self.dhcp.stale),
            ("blocked_services", self.blocked_services.stale),
            ("dns", self.dns.stale),
            ("safe_browsing", self.safe_browsing.stale),
            ("parental", self.parental.stale),
            ("safe_search", self.safe_search.stale),
            ("stats_config", self.stats_config.stale),
            ("querylog_config", self.querylog_config.stale),
            ("query_log", self.query_log.stale),
        ];
        flags
            .into_iter()
            .filter_map(|(name, stale)| stale.then_some(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn stale_section_keeps_value_and_timestamp() {
        let t1 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid time");
        let mut section = Section::default();
        section.refresh(vec![1u32, 2, 3], 1, t1);
        section.mark_stale();

        assert_eq!(section.get(), Some(&vec![1, 2, 3]));
        assert_eq!(section.fresh(), None);
        assert_eq!(section.refreshed_at, Some(t1));
        assert_eq!(section.cycle, 1);
    }

    #[test]
    fn status_of_stale_source_is_unknown() {
        let now = Utc::now();
        let mut snap = Snapshot::default();
        snap.parental.refresh(EnabledStatus { enabled: Some(true) }, 1, now);
        snap.safe_browsing
            .refresh(EnabledStatus { enabled: Some(false) }, 1, now);
        snap.safe_browsing.mark_stale();
        snap.derive_status();

        assert_eq!(snap.status.parental, crate::model::FlagState::Enabled);
        assert_eq!(snap.status.safe_browsing, crate::model::FlagState::Unknown);
        assert_eq!(snap.stale_sections(), vec!["safe_browsing"]);
    }
}
