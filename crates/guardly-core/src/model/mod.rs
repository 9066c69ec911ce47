// ── Domain model ──
//
// Record types are the wire models from `guardly-api`; this module adds
// the partial-update overlays and the aggregated global status.

pub mod merge;
pub mod status;

pub use guardly_api::models::{
    BlockableService, BlockedServicesSet, CheckHostResult, ClientConfig, ClientSearchHit,
    DayRange, DhcpLease, DhcpStatus, DnsConfig, DnsConfigUpdate, EnabledStatus, FilterList,
    FilteringStatus, QueryLogConfig, QueryLogEntry, QueryLogPage, QueryLogParams, RewriteRule,
    SafeSearchSettings, Schedule, ServerStatus, Stats, StatsConfig,
};

pub use merge::{
    BlockedServicesPatch, ClientPatch, FilterListPatch, Merge, PartialUpdate, QueryLogConfigPatch,
    SafeSearchPatch, StatsConfigPatch, merge_update,
};
pub use status::{FlagState, GlobalStatus};

/// Ordered, de-duplicated service ids.
pub type ServiceSet = indexmap::IndexSet<String>;
