// ── Reconciling poller ──
//
// Periodically reads every sub-resource, classifies failures, and
// publishes a fresh `Snapshot`. The poller is the only writer of the
// snapshot channel; commands ask it for an early cycle through
// `Shared::refresh` instead of patching the snapshot themselves.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::Utc;
use futures_util::StreamExt;
use futures_util::stream;
use guardly_api::{HomeClient, QueryLogParams};
use tokio::sync::{Notify, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregate::top_n;
use crate::capability::{Capability, CapabilitySet, RemoteVersion, capabilities_for};
use crate::controller::ConnectionState;
use crate::error::CoreError;
use crate::model::{
    BlockableService, BlockedServicesSet, ClientConfig, DhcpStatus, DnsConfig, EnabledStatus,
    FilteringStatus, QueryLogConfig, QueryLogEntry, RewriteRule, SafeSearchSettings,
    ServerStatus, Stats, StatsConfig,
};
use crate::snapshot::{CycleOutcome, Snapshot};

// ── Shared state ─────────────────────────────────────────────────────

/// State shared between the controller handle and the poll task.
pub(crate) struct Shared {
    pub snapshot: watch::Sender<Arc<Snapshot>>,
    pub capabilities: ArcSwap<CapabilitySet>,
    pub connection: watch::Sender<ConnectionState>,
    pub poll_state: watch::Sender<PollState>,
    /// Wakes the poll task for an out-of-cycle refresh.
    pub refresh: Notify,
    /// Bumped whenever credentials are replaced.
    pub credentials: watch::Sender<u64>,
}

impl Shared {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        let (connection, _) = watch::channel(ConnectionState::Disconnected);
        let (poll_state, _) = watch::channel(PollState::Idle);
        let (credentials, _) = watch::channel(0);
        Self {
            snapshot,
            capabilities: ArcSwap::from_pointee(CapabilitySet::default()),
            connection,
            poll_state,
            refresh: Notify::new(),
            credentials,
        }
    }
}

/// What the poll loop is doing. After a cycle the state holds its
/// outcome until the next cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    Idle,
    Polling,
    Succeeded,
    PartiallyFailed,
    Failed,
    /// Credentials were rejected; no cycles run until they are replaced.
    Suspended,
}

impl From<CycleOutcome> for PollState {
    fn from(outcome: CycleOutcome) -> Self {
        match outcome {
            CycleOutcome::Pending => Self::Idle,
            CycleOutcome::Succeeded => Self::Succeeded,
            CycleOutcome::PartiallyFailed => Self::PartiallyFailed,
            CycleOutcome::Failed => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PollSettings {
    pub max_concurrent_requests: usize,
    pub query_log_limit: u32,
    pub top_n: usize,
}

// ── Reads ────────────────────────────────────────────────────────────

/// One remote read performed per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReadKey {
    Status,
    Stats,
    Clients,
    Filtering,
    Rewrites,
    Dhcp,
    BlockedServices,
    Dns,
    SafeBrowsing,
    Parental,
    SafeSearch,
    QueryLog,
    StatsConfig,
    QuerylogConfig,
}

const ALWAYS_READ: [ReadKey; 11] = [
    ReadKey::Stats,
    ReadKey::Clients,
    ReadKey::Filtering,
    ReadKey::Rewrites,
    ReadKey::Dhcp,
    ReadKey::BlockedServices,
    ReadKey::Dns,
    ReadKey::SafeBrowsing,
    ReadKey::Parental,
    ReadKey::SafeSearch,
    ReadKey::QueryLog,
];

enum ReadValue {
    Status(ServerStatus),
    Stats(Stats),
    Clients(Vec<ClientConfig>),
    Filtering(FilteringStatus),
    Rewrites(Vec<RewriteRule>),
    Dhcp(DhcpStatus),
    BlockedServices(BlockedServicesSet),
    Dns(DnsConfig),
    SafeBrowsing(EnabledStatus),
    Parental(EnabledStatus),
    SafeSearch(SafeSearchSettings),
    QueryLog(Vec<QueryLogEntry>),
    StatsConfig(StatsConfig),
    QuerylogConfig(QueryLogConfig),
}

/// Reads to issue after `status`, given the capabilities in force.
fn plan(caps: &CapabilitySet) -> Vec<ReadKey> {
    let mut keys = ALWAYS_READ.to_vec();
    if caps.contains(Capability::StatsConfig) {
        keys.push(ReadKey::StatsConfig);
    }
    if caps.contains(Capability::QuerylogConfig) {
        keys.push(ReadKey::QuerylogConfig);
    }
    keys
}

async fn fetch(
    client: &HomeClient,
    key: ReadKey,
    caps: &CapabilitySet,
    query_log_limit: u32,
) -> Result<ReadValue, guardly_api::Error> {
    Ok(match key {
        ReadKey::Status => ReadValue::Status(client.status().await?),
        ReadKey::Stats => ReadValue::Stats(client.stats().await?),
        ReadKey::Clients => ReadValue::Clients(client.clients().await?),
        ReadKey::Filtering => ReadValue::Filtering(client.filtering_status().await?),
        ReadKey::Rewrites => ReadValue::Rewrites(client.rewrites().await?),
        ReadKey::Dhcp => ReadValue::Dhcp(client.dhcp_status().await?),
        ReadKey::BlockedServices => {
            let set = if caps.contains(Capability::ScheduleOnBlockedServices) {
                client.blocked_services().await?
            } else {
                client.blocked_services_legacy().await?
            };
            ReadValue::BlockedServices(set)
        }
        ReadKey::Dns => ReadValue::Dns(client.dns_info().await?),
        ReadKey::SafeBrowsing => ReadValue::SafeBrowsing(client.safebrowsing_status().await?),
        ReadKey::Parental => ReadValue::Parental(client.parental_status().await?),
        ReadKey::SafeSearch => ReadValue::SafeSearch(client.safesearch_settings().await?),
        ReadKey::QueryLog => {
            let params = QueryLogParams {
                limit: query_log_limit,
                ..QueryLogParams::default()
            };
            ReadValue::QueryLog(client.query_log(&params).await?.data)
        }
        ReadKey::StatsConfig => ReadValue::StatsConfig(client.stats_config().await?),
        ReadKey::QuerylogConfig => ReadValue::QuerylogConfig(client.query_log_config().await?),
    })
}

fn apply(next: &mut Snapshot, value: ReadValue, cycle: u64, now: chrono::DateTime<Utc>) {
    match value {
        ReadValue::Status(v) => next.server.refresh(v, cycle, now),
        ReadValue::Stats(v) => next.stats.refresh(v, cycle, now),
        ReadValue::Clients(v) => next.clients.refresh(v, cycle, now),
        ReadValue::Filtering(v) => next.filtering.refresh(v, cycle, now),
        ReadValue::Rewrites(v) => next.rewrites.refresh(v, cycle, now),
        ReadValue::Dhcp(v) => next.dhcp.refresh(v, cycle, now),
        ReadValue::BlockedServices(v) => next.blocked_services.refresh(v, cycle, now),
        ReadValue::Dns(v) => next.dns.refresh(v, cycle, now),
        ReadValue::SafeBrowsing(v) => next.safe_browsing.refresh(v, cycle, now),
        ReadValue::Parental(v) => next.parental.refresh(v, cycle, now),
        ReadValue::SafeSearch(v) => next.safe_search.refresh(v, cycle, now),
        ReadValue::QueryLog(v) => next.query_log.refresh(v, cycle, now),
        ReadValue::StatsConfig(v) => next.stats_config.refresh(v, cycle, now),
        ReadValue::QuerylogConfig(v) => next.querylog_config.refresh(v, cycle, now),
    }
}

fn mark_stale(next: &mut Snapshot, key: ReadKey) {
    match key {
        ReadKey::Status => next.server.mark_stale(),
        ReadKey::Stats => next.stats.mark_stale(),
        ReadKey::Clients => next.clients.mark_stale(),
        ReadKey::Filtering => next.filtering.mark_stale(),
        ReadKey::Rewrites => next.rewrites.mark_stale(),
        ReadKey::Dhcp => next.dhcp.mark_stale(),
        ReadKey::BlockedServices => next.blocked_services.mark_stale(),
        ReadKey::Dns => next.dns.mark_stale(),
        ReadKey::SafeBrowsing => next.safe_browsing.mark_stale(),
        ReadKey::Parental => next.parental.mark_stale(),
        ReadKey::SafeSearch => next.safe_search.mark_stale(),
        ReadKey::QueryLog => next.query_log.mark_stale(),
        ReadKey::StatsConfig => next.stats_config.mark_stale(),
        ReadKey::QuerylogConfig => next.querylog_config.mark_stale(),
    }
}

// ── Failure latch ────────────────────────────────────────────────────

/// Counts consecutive failures of one read and decides how loudly to
/// log them: warn on the 1st, 2nd, 4th, 8th... failure, debug otherwise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FailureLatch {
    consecutive: u32,
}

impl FailureLatch {
    /// Record a failure. Returns `true` if this one should be a warning.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive.is_power_of_two()
    }

    /// Record a success. Returns the length of the failure streak that
    /// just ended, if any.
    pub fn record_success(&mut self) -> Option<u32> {
        let streak = std::mem::take(&mut self.consecutive);
        (streak > 0).then_some(streak)
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

// ── Poller ───────────────────────────────────────────────────────────

pub(crate) struct Poller {
    client: Arc<HomeClient>,
    shared: Arc<Shared>,
    settings: PollSettings,
    version: Option<RemoteVersion>,
    downgraded: BTreeSet<Capability>,
    latches: HashMap<ReadKey, FailureLatch>,
    catalog: Arc<Vec<BlockableService>>,
    cycle: u64,
    credentials: watch::Receiver<u64>,
    suspended: bool,
}

impl Poller {
    pub(crate) fn new(client: Arc<HomeClient>, shared: Arc<Shared>, settings: PollSettings) -> Self {
        let credentials = shared.credentials.subscribe();
        Self {
            client,
            shared,
            settings,
            version: None,
            downgraded: BTreeSet::new(),
            latches: HashMap::new(),
            catalog: Arc::new(Vec::new()),
            cycle: 0,
            credentials,
            suspended: false,
        }
    }

    pub(crate) fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Load the blockable-service catalog. Failures leave it empty.
    pub(crate) async fn load_catalog(&mut self) {
        match self.client.service_catalog().await {
            Ok(services) => {
                debug!(count = services.len(), "loaded blockable service catalog");
                self.catalog = Arc::new(services);
            }
            Err(e) => warn!(error = %e, "could not load blockable service catalog"),
        }
    }

    /// Run one cycle and publish its snapshot.
    ///
    /// `Err` means the cycle produced nothing new: either the status
    /// baseline failed (the previous snapshot is republished stale) or
    /// credentials were rejected (polling is now suspended).
    #[allow(clippy::too_many_lines)]
    pub(crate) async fn run_cycle(&mut self) -> Result<CycleOutcome, CoreError> {
        self.cycle += 1;
        let cycle = self.cycle;
        // Credentials replaced from here on resume a suspension this
        // cycle causes, even while its requests are still in flight.
        self.credentials.borrow_and_update();
        self.shared.poll_state.send_replace(PollState::Polling);
        debug!(cycle, "poll cycle started");

        // ── Status baseline ──
        let status = match self.client.status().await {
            Ok(status) => {
                self.record_success(ReadKey::Status);
                status
            }
            Err(e) if e.is_auth() => return Err(self.suspend(e)),
            Err(e) => {
                self.record_failure(ReadKey::Status, &e);
                self.publish_failed(cycle);
                return Err(e.into());
            }
        };

        let caps = self.observe_version(&status.version).await;

        // ── Fan-out ──
        let keys = plan(&caps);
        let client = &self.client;
        let caps_ref = &caps;
        let limit = self.settings.query_log_limit;
        let mut results: Vec<(ReadKey, Result<ReadValue, guardly_api::Error>)> = stream::iter(keys)
            .map(|key| async move { (key, fetch(client, key, caps_ref, limit).await) })
            .buffer_unordered(self.settings.max_concurrent_requests.max(1))
            .collect()
            .await;

        if let Some(pos) = results
            .iter()
            .position(|(_, r)| r.as_ref().is_err_and(guardly_api::Error::is_auth))
        {
            if let (_, Err(e)) = results.swap_remove(pos) {
                return Err(self.suspend(e));
            }
        }

        // ── Assemble ──
        let now = Utc::now();
        let mut next = Snapshot::clone(&self.shared.snapshot.borrow());
        next.server.refresh(status, cycle, now);

        let mut failed = 0usize;
        for (key, result) in results {
            match result {
                Ok(value) => {
                    self.record_success(key);
                    apply(&mut next, value, cycle, now);
                }
                Err(guardly_api::Error::Unsupported { path, status }) => {
                    if let Some(cap) = Capability::for_path(path) {
                        info!(%cap, path, status, "endpoint missing, disabling capability");
                        self.downgraded.insert(cap);
                    }
                }
                Err(e) => {
                    self.record_failure(key, &e);
                    mark_stale(&mut next, key);
                    failed += 1;
                }
            }
        }

        let caps = self.effective_capabilities();
        self.shared.capabilities.store(Arc::new(caps.clone()));

        if let Some(stats) = next.stats.get() {
            next.top_queried = top_n(&stats.top_queried_domains, self.settings.top_n);
            next.top_blocked = top_n(&stats.top_blocked_domains, self.settings.top_n);
            next.top_clients = top_n(&stats.top_clients, self.settings.top_n);
        }

        let outcome = if failed == 0 {
            CycleOutcome::Succeeded
        } else {
            CycleOutcome::PartiallyFailed
        };
        next.cycle = cycle;
        next.produced_at = Some(now);
        next.stale = false;
        next.outcome = outcome;
        next.version.clone_from(&self.version);
        next.capabilities = caps;
        next.catalog = Arc::clone(&self.catalog);
        next.derive_status();

        self.shared.snapshot.send_replace(Arc::new(next));
        self.shared.connection.send_if_modified(|state| {
            if *state == ConnectionState::Connected {
                false
            } else {
                *state = ConnectionState::Connected;
                true
            }
        });
        self.shared.poll_state.send_replace(outcome.into());
        debug!(cycle, %outcome, failed, "poll cycle finished");
        Ok(outcome)
    }

    /// Track the server version and return the capabilities in force.
    async fn observe_version(&mut self, raw: &str) -> CapabilitySet {
        let version = RemoteVersion::parse(raw);
        if self.version.as_ref() != Some(&version) {
            match self.version.replace(version.clone()) {
                Some(previous) => {
                    info!(%previous, current = %version, "server version changed");
                    self.downgraded.clear();
                    self.load_catalog().await;
                }
                None => info!(%version, "detected server version"),
            }
        }
        let caps = self.effective_capabilities();
        self.shared.capabilities.store(Arc::new(caps.clone()));
        caps
    }

    fn effective_capabilities(&self) -> CapabilitySet {
        let base = self
            .version
            .as_ref()
            .map(capabilities_for)
            .unwrap_or_default();
        self.downgraded
            .iter()
            .fold(base, |caps, cap| caps.without(*cap))
    }

    /// Republish the previous snapshot, flagged stale.
    fn publish_failed(&mut self, cycle: u64) {
        let mut next = Snapshot::clone(&self.shared.snapshot.borrow());
        next.cycle = cycle;
        next.produced_at = Some(Utc::now());
        next.stale = true;
        next.outcome = CycleOutcome::Failed;
        self.shared.snapshot.send_replace(Arc::new(next));

        let attempt = self
            .latches
            .get(&ReadKey::Status)
            .map_or(1, FailureLatch::consecutive);
        self.shared.connection.send_if_modified(|state| match state {
            ConnectionState::Connected | ConnectionState::Reconnecting { .. } => {
                *state = ConnectionState::Reconnecting { attempt };
                true
            }
            _ => false,
        });
        self.shared.poll_state.send_replace(PollState::Failed);
    }

    fn suspend(&mut self, err: guardly_api::Error) -> CoreError {
        warn!(error = %err, "credentials rejected, suspending polling");
        self.suspended = true;
        self.shared.poll_state.send_replace(PollState::Suspended);
        self.shared
            .connection
            .send_replace(ConnectionState::AuthRequired);
        err.into()
    }

    /// Wait until credentials are replaced. `Err` if the controller is gone.
    pub(crate) async fn credentials_changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.credentials.changed().await
    }

    pub(crate) fn resume(&mut self) {
        self.suspended = false;
        self.shared.poll_state.send_replace(PollState::Idle);
    }

    fn record_success(&mut self, key: ReadKey) {
        if let Some(streak) = self.latches.entry(key).or_default().record_success() {
            info!(read = %key, failures = streak, "read recovered");
        }
    }

    fn record_failure(&mut self, key: ReadKey, err: &guardly_api::Error) {
        let latch = self.latches.entry(key).or_default();
        let failures = latch.consecutive() + 1;
        if latch.record_failure() {
            warn!(read = %key, failures, error = %err, "read failed");
        } else {
            debug!(read = %key, failures, error = %err, "read failed");
        }
    }
}

// ── Background task ──────────────────────────────────────────────────

/// Drive `poller` until `cancel` fires.
pub(crate) async fn poll_task(mut poller: Poller, period: Duration, cancel: CancellationToken) {
    let shared = Arc::clone(&poller.shared);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        if poller.is_suspended() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                changed = poller.credentials_changed() => {
                    if changed.is_err() {
                        break;
                    }
                    info!("credentials replaced, resuming polling");
                    poller.resume();
                    interval.reset();
                }
            }
        } else {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = shared.refresh.notified() => debug!("out-of-cycle refresh requested"),
                _ = interval.tick() => {}
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = poller.run_cycle() => {
                if let Err(e) = result {
                    debug!(error = %e, "poll cycle produced no update");
                }
            }
        }
    }
    debug!("poll task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_warns_on_powers_of_two() {
        let mut latch = FailureLatch::default();
        let warned: Vec<u32> = (1..=20)
            .filter_map(|_| latch.record_failure().then(|| latch.consecutive()))
            .collect();
        assert_eq!(warned, vec![1, 2, 4, 8, 16]);
        assert_eq!(latch.record_success(), Some(20));
        assert_eq!(latch.record_success(), None);
        assert!(latch.record_failure(), "first failure after recovery warns again");
    }

    #[test]
    fn plan_includes_config_reads_only_when_capable() {
        let old = plan(&capabilities_for(&RemoteVersion::new(0, 107, 20)));
        assert!(!old.contains(&ReadKey::StatsConfig));
        assert!(!old.contains(&ReadKey::QuerylogConfig));
        assert_eq!(old.len(), ALWAYS_READ.len());

        let new = plan(&capabilities_for(&RemoteVersion::new(0, 107, 30)));
        assert!(new.contains(&ReadKey::StatsConfig));
        assert!(new.contains(&ReadKey::QuerylogConfig));
        assert!(!new.contains(&ReadKey::Status));
    }
}
