// Typed endpoint groups for the `/control/*` API.
//
// Each submodule adds inherent methods to `HomeClient`. Paths are
// collected in `paths` so the gated set is visible in one place.

mod blocked_services;
mod clients;
mod dhcp;
mod dns;
mod filtering;
mod querylog;
mod rewrites;
mod stats;
mod status;

/// Every resource path the client knows about.
pub mod paths {
    use crate::client::Endpoint;

    // ── Status & protection ──
    pub const STATUS: Endpoint = Endpoint::open("control/status");
    pub const PROTECTION: Endpoint = Endpoint::open("control/protection");
    pub const SAFEBROWSING_STATUS: Endpoint = Endpoint::open("control/safebrowsing/status");
    pub const SAFEBROWSING_ENABLE: Endpoint = Endpoint::open("control/safebrowsing/enable");
    pub const SAFEBROWSING_DISABLE: Endpoint = Endpoint::open("control/safebrowsing/disable");
    pub const PARENTAL_STATUS: Endpoint = Endpoint::open("control/parental/status");
    pub const PARENTAL_ENABLE: Endpoint = Endpoint::open("control/parental/enable");
    pub const PARENTAL_DISABLE: Endpoint = Endpoint::open("control/parental/disable");
    pub const SAFESEARCH_STATUS: Endpoint = Endpoint::open("control/safesearch/status");
    pub const SAFESEARCH_SETTINGS: Endpoint = Endpoint::open("control/safesearch/settings");

    // ── Stats ──
    pub const STATS: Endpoint = Endpoint::open("control/stats");
    pub const STATS_RESET: Endpoint = Endpoint::open("control/stats_reset");
    pub const STATS_CONFIG: Endpoint = Endpoint::gated("control/stats/config");
    pub const STATS_CONFIG_UPDATE: Endpoint = Endpoint::gated("control/stats/config/update");

    // ── Query log ──
    pub const QUERYLOG: Endpoint = Endpoint::open("control/querylog");
    pub const QUERYLOG_CLEAR: Endpoint = Endpoint::open("control/querylog_clear");
    pub const QUERYLOG_CONFIG: Endpoint = Endpoint::gated("control/querylog/config");
    pub const QUERYLOG_CONFIG_UPDATE: Endpoint =
        Endpoint::gated("control/querylog/config/update");

    // ── Filtering ──
    pub const FILTERING_STATUS: Endpoint = Endpoint::open("control/filtering/status");
    pub const FILTERING_CONFIG: Endpoint = Endpoint::open("control/filtering/config");
    pub const FILTERING_ADD_URL: Endpoint = Endpoint::open("control/filtering/add_url");
    pub const FILTERING_REMOVE_URL: Endpoint = Endpoint::open("control/filtering/remove_url");
    pub const FILTERING_SET_URL: Endpoint = Endpoint::open("control/filtering/set_url");
    pub const FILTERING_REFRESH: Endpoint = Endpoint::open("control/filtering/refresh");
    pub const CHECK_HOST: Endpoint = Endpoint::open("control/filtering/check_host");

    // ── Clients ──
    pub const CLIENTS: Endpoint = Endpoint::open("control/clients");
    pub const CLIENTS_ADD: Endpoint = Endpoint::open("control/clients/add");
    pub const CLIENTS_UPDATE: Endpoint = Endpoint::open("control/clients/update");
    pub const CLIENTS_DELETE: Endpoint = Endpoint::open("control/clients/delete");
    pub const CLIENTS_SEARCH: Endpoint = Endpoint::gated("control/clients/search");

    // ── Blocked services ──
    pub const BLOCKED_SERVICES_ALL: Endpoint = Endpoint::open("control/blocked_services/all");
    pub const BLOCKED_SERVICES_LIST: Endpoint = Endpoint::open("control/blocked_services/list");
    pub const BLOCKED_SERVICES_SET: Endpoint = Endpoint::open("control/blocked_services/set");
    pub const BLOCKED_SERVICES_GET: Endpoint = Endpoint::gated("control/blocked_services/get");
    pub const BLOCKED_SERVICES_UPDATE: Endpoint =
        Endpoint::gated("control/blocked_services/update");

    // ── Rewrites ──
    pub const REWRITE_LIST: Endpoint = Endpoint::open("control/rewrite/list");
    pub const REWRITE_ADD: Endpoint = Endpoint::open("control/rewrite/add");
    pub const REWRITE_DELETE: Endpoint = Endpoint::open("control/rewrite/delete");
    pub const REWRITE_UPDATE: Endpoint = Endpoint::open("control/rewrite/update");

    // ── DNS & DHCP ──
    pub const DNS_INFO: Endpoint = Endpoint::open("control/dns_info");
    pub const DNS_CONFIG: Endpoint = Endpoint::open("control/dns_config");
    pub const DHCP_STATUS: Endpoint = Endpoint::open("control/dhcp/status");
}
