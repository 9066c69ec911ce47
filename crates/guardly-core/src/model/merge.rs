// ── Merge-before-write ──
//
// The server replaces whole records on update. Every write therefore
// starts from a freshly fetched record and overlays only the fields the
// caller named. A field absent from the patch keeps its fetched value,
// including `None`; no default is ever substituted here.

use super::{
    BlockedServicesSet, ClientConfig, FilterList, QueryLogConfig, SafeSearchSettings, Schedule,
    ServiceSet, StatsConfig,
};

/// A record that can absorb a partial update.
pub trait Merge: Sized {
    /// Per-field overlay. `None` means "leave as fetched".
    type Patch: Default;

    fn merge(self, patch: Self::Patch) -> Self;
}

/// The caller's intent for a record of type `T`.
pub type PartialUpdate<T> = <T as Merge>::Patch;

/// Overlay `intent` onto `current`.
pub fn merge_update<T: Merge>(current: T, intent: PartialUpdate<T>) -> T {
    current.merge(intent)
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

// ── Clients ──────────────────────────────────────────────────────────

/// Changes to a persistent client. `name` renames the record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub ids: Option<Vec<String>>,
    pub use_global_settings: Option<bool>,
    pub filtering_enabled: Option<bool>,
    pub parental_enabled: Option<bool>,
    pub safebrowsing_enabled: Option<bool>,
    pub safesearch_enabled: Option<bool>,
    pub safe_search: Option<SafeSearchSettings>,
    pub use_global_blocked_services: Option<bool>,
    pub blocked_services: Option<Vec<String>>,
    pub blocked_services_schedule: Option<Schedule>,
    pub upstreams: Option<Vec<String>>,
    pub upstreams_cache_enabled: Option<bool>,
    pub upstreams_cache_size: Option<u64>,
    pub ignore_querylog: Option<bool>,
    pub ignore_statistics: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Merge for ClientConfig {
    type Patch = ClientPatch;

    fn merge(mut self, patch: ClientPatch) -> Self {
        replace(&mut self.name, patch.name);
        replace(&mut self.ids, patch.ids);
        overlay(&mut self.use_global_settings, patch.use_global_settings);
        overlay(&mut self.filtering_enabled, patch.filtering_enabled);
        overlay(&mut self.parental_enabled, patch.parental_enabled);
        overlay(&mut self.safebrowsing_enabled, patch.safebrowsing_enabled);
        overlay(&mut self.safesearch_enabled, patch.safesearch_enabled);
        overlay(&mut self.safe_search, patch.safe_search);
        overlay(
            &mut self.use_global_blocked_services,
            patch.use_global_blocked_services,
        );
        overlay(&mut self.blocked_services, patch.blocked_services);
        overlay(
            &mut self.blocked_services_schedule,
            patch.blocked_services_schedule,
        );
        overlay(&mut self.upstreams, patch.upstreams);
        overlay(&mut self.upstreams_cache_enabled, patch.upstreams_cache_enabled);
        overlay(&mut self.upstreams_cache_size, patch.upstreams_cache_size);
        overlay(&mut self.ignore_querylog, patch.ignore_querylog);
        overlay(&mut self.ignore_statistics, patch.ignore_statistics);
        overlay(&mut self.tags, patch.tags);
        self
    }
}

// ── Filter lists ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterListPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub enabled: Option<bool>,
}

impl Merge for FilterList {
    type Patch = FilterListPatch;

    fn merge(mut self, patch: FilterListPatch) -> Self {
        replace(&mut self.name, patch.name);
        replace(&mut self.url, patch.url);
        replace(&mut self.enabled, patch.enabled);
        self
    }
}

// ── Blocked services ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockedServicesPatch {
    pub ids: Option<ServiceSet>,
    pub schedule: Option<Schedule>,
}

impl Merge for BlockedServicesSet {
    type Patch = BlockedServicesPatch;

    fn merge(mut self, patch: BlockedServicesPatch) -> Self {
        replace(&mut self.ids, patch.ids);
        overlay(&mut self.schedule, patch.schedule);
        self
    }
}

// ── Safe search ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafeSearchPatch {
    pub enabled: Option<bool>,
    pub bing: Option<bool>,
    pub duckduckgo: Option<bool>,
    pub ecosia: Option<bool>,
    pub google: Option<bool>,
    pub pixabay: Option<bool>,
    pub yandex: Option<bool>,
    pub youtube: Option<bool>,
}

impl Merge for SafeSearchSettings {
    type Patch = SafeSearchPatch;

    fn merge(mut self, patch: SafeSearchPatch) -> Self {
        overlay(&mut self.enabled, patch.enabled);
        overlay(&mut self.bing, patch.bing);
        overlay(&mut self.duckduckgo, patch.duckduckgo);
        overlay(&mut self.ecosia, patch.ecosia);
        overlay(&mut self.google, patch.google);
        overlay(&mut self.pixabay, patch.pixabay);
        overlay(&mut self.yandex, patch.yandex);
        overlay(&mut self.youtube, patch.youtube);
        self
    }
}

// ── Stats / query log retention ──────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsConfigPatch {
    pub enabled: Option<bool>,
    /// Retention in milliseconds.
    pub interval: Option<u64>,
    pub ignored: Option<Vec<String>>,
}

impl Merge for StatsConfig {
    type Patch = StatsConfigPatch;

    fn merge(mut self, patch: StatsConfigPatch) -> Self {
        overlay(&mut self.enabled, patch.enabled);
        overlay(&mut self.interval, patch.interval);
        overlay(&mut self.ignored, patch.ignored);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryLogConfigPatch {
    pub enabled: Option<bool>,
    pub interval: Option<u64>,
    pub anonymize_client_ip: Option<bool>,
    pub ignored: Option<Vec<String>>,
}

impl Merge for QueryLogConfig {
    type Patch = QueryLogConfigPatch;

    fn merge(mut self, patch: QueryLogConfigPatch) -> Self {
        overlay(&mut self.enabled, patch.enabled);
        overlay(&mut self.interval, patch.interval);
        overlay(&mut self.anonymize_client_ip, patch.anonymize_client_ip);
        overlay(&mut self.ignored, patch.ignored);
        self
    }
}
