// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller routes each variant to a read-merge-write sequence against
// a freshly fetched record, then asks the poller for an early cycle.

mod route;

use std::time::Duration;

use crate::model::{
    BlockedServicesSet, ClientConfig, ClientPatch, DnsConfigUpdate, FilterList, FilterListPatch,
    QueryLogConfigPatch, RewriteRule, SafeSearchPatch, Schedule, ServiceSet, StatsConfigPatch,
};

pub(crate) use route::{RecordLocks, RouteContext, route_command};

/// All possible write operations against an AdGuard Home server.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Protection toggles ───────────────────────────────────────────
    SetProtection {
        enabled: bool,
        /// Re-enable automatically after this long. Only meaningful
        /// with `enabled = false`.
        pause: Option<Duration>,
    },
    SetSafeBrowsing {
        enabled: bool,
    },
    SetParental {
        enabled: bool,
    },
    SetSafeSearch {
        enabled: bool,
    },
    UpdateSafeSearch(SafeSearchPatch),

    // ── Filtering ────────────────────────────────────────────────────
    SetFiltering {
        enabled: bool,
        /// Update check interval in hours. Carried forward when absent.
        interval: Option<u32>,
    },
    AddFilterList {
        name: String,
        url: String,
        allowlist: bool,
    },
    RemoveFilterList {
        url: String,
        allowlist: bool,
    },
    UpdateFilterList {
        url: String,
        allowlist: bool,
        patch: FilterListPatch,
    },
    RefreshFilters {
        allowlist: bool,
    },

    // ── Persistent clients ───────────────────────────────────────────
    AddClient(Box<ClientConfig>),
    DeleteClient {
        name: String,
    },
    UpdateClient {
        name: String,
        patch: Box<ClientPatch>,
    },
    SetClientBlockedServices {
        name: String,
        services: Vec<String>,
        schedule: Option<Schedule>,
    },

    // ── Global blocked services ──────────────────────────────────────
    /// Full replace. An absent schedule clears the remote one.
    SetBlockedServices {
        services: ServiceSet,
        schedule: Option<Schedule>,
    },
    BlockService {
        id: String,
    },
    UnblockService {
        id: String,
    },

    // ── DNS rewrites ─────────────────────────────────────────────────
    AddRewrite {
        domain: String,
        answer: String,
    },
    RemoveRewrite {
        domain: String,
        answer: String,
    },
    UpdateRewrite {
        domain: String,
        answer: String,
        new_domain: Option<String>,
        new_answer: Option<String>,
        enabled: Option<bool>,
    },
    SetRewriteEnabled {
        domain: String,
        answer: String,
        enabled: bool,
    },

    // ── DNS server ───────────────────────────────────────────────────
    UpdateDnsConfig(DnsConfigUpdate),

    // ── Statistics & query log ───────────────────────────────────────
    UpdateStatsConfig(StatsConfigPatch),
    UpdateQueryLogConfig(QueryLogConfigPatch),
    ResetStats,
    ClearQueryLog,
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetProtection { .. } => "set_protection",
            Self::SetSafeBrowsing { .. } => "set_safe_browsing",
            Self::SetParental { .. } => "set_parental",
            Self::SetSafeSearch { .. } => "set_safe_search",
            Self::UpdateSafeSearch(_) => "update_safe_search",
            Self::SetFiltering { .. } => "set_filtering",
            Self::AddFilterList { .. } => "add_filter_list",
            Self::RemoveFilterList { .. } => "remove_filter_list",
            Self::UpdateFilterList { .. } => "update_filter_list",
            Self::RefreshFilters { .. } => "refresh_filters",
            Self::AddClient(_) => "add_client",
            Self::DeleteClient { .. } => "delete_client",
            Self::UpdateClient { .. } => "update_client",
            Self::SetClientBlockedServices { .. } => "set_client_blocked_services",
            Self::SetBlockedServices { .. } => "set_blocked_services",
            Self::BlockService { .. } => "block_service",
            Self::UnblockService { .. } => "unblock_service",
            Self::AddRewrite { .. } => "add_rewrite",
            Self::RemoveRewrite { .. } => "remove_rewrite",
            Self::UpdateRewrite { .. } => "update_rewrite",
            Self::SetRewriteEnabled { .. } => "set_rewrite_enabled",
            Self::UpdateDnsConfig(_) => "update_dns_config",
            Self::UpdateStatsConfig(_) => "update_stats_config",
            Self::UpdateQueryLogConfig(_) => "update_query_log_config",
            Self::ResetStats => "reset_stats",
            Self::ClearQueryLog => "clear_query_log",
        }
    }
}

/// Result of a command execution. Record writes return what was sent.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Client(Box<ClientConfig>),
    FilterList(FilterList),
    BlockedServices(BlockedServicesSet),
    Rewrite(RewriteRule),
}
