// ── Wire models ──
//
// Serde types for `/control/*` payloads. Records that get written back
// (clients, safe search, stats/query log config, DNS config) keep
// unrecognised fields in `extra`, and optional fields stay `None` when
// the server omitted them, so a write never adds or drops anything the
// caller did not touch.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserialize JSON `null` as the type's default.
///
/// The server sends `null` for empty arrays on several resources.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Status & protection ─────────────────────────────────────────────

/// `GET /control/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStatus {
    pub version: String,
    pub running: Option<bool>,
    pub protection_enabled: Option<bool>,
    /// Remaining pause in milliseconds while protection is paused.
    pub protection_disabled_duration: u64,
    pub protection_disabled_until: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dns_addresses: Vec<String>,
    pub dns_port: u16,
    pub http_port: u16,
    pub language: String,
    pub dhcp_available: bool,
}

/// `{"enabled": bool}` shape shared by safebrowsing and parental status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledStatus {
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// `POST /control/protection` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtectionRequest {
    pub enabled: bool,
    /// Auto-resume after this many milliseconds. Only meaningful when disabling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// Safe search settings with per-engine switches.
///
/// Read from `safesearch/status`, written whole to `safesearch/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafeSearchSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duckduckgo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosia: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixabay: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yandex: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Statistics ──────────────────────────────────────────────────────

/// One `top_*` list: single-key `{name: count}` objects.
pub type TopList = Vec<BTreeMap<String, u64>>;

/// `GET /control/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub num_dns_queries: u64,
    pub num_blocked_filtering: u64,
    pub num_replaced_safebrowsing: u64,
    pub num_replaced_parental: u64,
    pub num_replaced_safesearch: u64,
    pub avg_processing_time: f64,
    pub time_units: String,
    #[serde(deserialize_with = "null_as_default")]
    pub top_queried_domains: TopList,
    #[serde(deserialize_with = "null_as_default")]
    pub top_blocked_domains: TopList,
    #[serde(deserialize_with = "null_as_default")]
    pub top_clients: TopList,
    #[serde(deserialize_with = "null_as_default")]
    pub top_upstreams_responses: TopList,
    #[serde(rename = "dns_queries", deserialize_with = "null_as_default")]
    pub dns_queries_series: Vec<u64>,
    #[serde(rename = "blocked_filtering", deserialize_with = "null_as_default")]
    pub blocked_filtering_series: Vec<u64>,
}

/// `GET /control/stats/config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Retention in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Query log ───────────────────────────────────────────────────────

/// `GET /control/querylog/config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryLogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymize_client_ip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query parameters for `GET /control/querylog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLogParams {
    pub limit: u32,
    pub offset: u32,
    /// Domain or client substring.
    pub search: Option<String>,
    /// `all`, `filtered`, `blocked`, `processed`, ... Newer servers only.
    pub response_status: Option<String>,
}

impl Default for QueryLogParams {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            search: None,
            response_status: None,
        }
    }
}

impl QueryLogParams {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(ref search) = self.search {
            query.push(("search", search.clone()));
        }
        if let Some(ref status) = self.response_status {
            query.push(("response_status", status.clone()));
        }
        query
    }
}

/// `GET /control/querylog` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLogPage {
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<QueryLogEntry>,
    pub oldest: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryLogEntry {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub question: QueryQuestion,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "elapsedMs", default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<String>,
    #[serde(default)]
    pub upstream: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryQuestion {
    pub name: String,
    #[serde(rename = "type")]
    pub qtype: String,
    pub class: String,
}

// ── Filtering ───────────────────────────────────────────────────────

/// `GET /control/filtering/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringStatus {
    pub enabled: Option<bool>,
    /// Update check interval in hours.
    pub interval: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub filters: Vec<FilterList>,
    #[serde(deserialize_with = "null_as_default")]
    pub whitelist_filters: Vec<FilterList>,
    #[serde(deserialize_with = "null_as_default")]
    pub user_rules: Vec<String>,
}

impl FilteringStatus {
    /// Tag lists that came from `whitelist_filters`.
    pub(crate) fn with_allowlists_marked(mut self) -> Self {
        for list in &mut self.whitelist_filters {
            list.allowlist = true;
        }
        self
    }

    /// Every blocklist followed by every allowlist.
    pub fn lists(&self) -> impl Iterator<Item = &FilterList> {
        self.filters.iter().chain(self.whitelist_filters.iter())
    }

    /// Find a list by URL on the requested side.
    pub fn find(&self, url: &str, allowlist: bool) -> Option<&FilterList> {
        let side = if allowlist {
            &self.whitelist_filters
        } else {
            &self.filters
        };
        side.iter().find(|f| f.url == url)
    }
}

/// A block- or allowlist subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterList {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub rules_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Set locally from which list the entry was read from.
    #[serde(default)]
    pub allowlist: bool,
}

/// `POST /control/filtering/config`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilteringConfig {
    pub enabled: bool,
    pub interval: u32,
}

/// `POST /control/filtering/set_url` body.
///
/// `data` is a full replacement: an absent `name` renames the list to "".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetFilterUrl {
    pub url: String,
    pub data: FilterUrlData,
    pub whitelist: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterUrlData {
    pub enabled: bool,
    pub name: String,
    pub url: String,
}

impl SetFilterUrl {
    /// Address `target_url` and replace it with `list`.
    pub fn new(target_url: &str, list: &FilterList) -> Self {
        Self {
            url: target_url.to_owned(),
            data: FilterUrlData {
                enabled: list.enabled,
                name: list.name.clone(),
                url: list.url.clone(),
            },
            whitelist: list.allowlist,
        }
    }
}

/// `GET /control/filtering/check_host`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckHostResult {
    #[serde(default)]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<CheckHostRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip_addrs: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckHostRule {
    pub filter_list_id: i64,
    pub text: String,
}

// ── Clients ─────────────────────────────────────────────────────────

/// A persistent client record.
///
/// The server replaces the whole record on update, so every optional
/// field that was fetched must be written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_global_settings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtering_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parental_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safebrowsing_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safesearch_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_search: Option<SafeSearchSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_global_blocked_services: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_services: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_services_schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstreams: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstreams_cache_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstreams_cache_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_querylog: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_statistics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /control/clients`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub clients: Vec<ClientConfig>,
}

/// `POST /control/clients/update` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ClientUpdate<'a> {
    pub name: &'a str,
    pub data: &'a ClientConfig,
}

/// One hit from `POST /control/clients/search`, keyed by the searched id.
pub type ClientSearchHit = BTreeMap<String, Value>;

// ── Blocked services ────────────────────────────────────────────────

/// A weekly blocking window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mon: Option<DayRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tue: Option<DayRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wed: Option<DayRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thu: Option<DayRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fri: Option<DayRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<DayRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun: Option<DayRange>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schedule {
    /// An empty schedule in the server's local time zone.
    pub fn local() -> Self {
        Self {
            time_zone: Some("Local".into()),
            ..Self::default()
        }
    }
}

/// Offsets in milliseconds from local midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: u64,
    pub end: u64,
}

/// Globally blocked services with their optional schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockedServicesSet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ids: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

/// `blocked_services/list` answers a bare array on old servers and an
/// `{ids, schedule}` object on newer ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum BlockedServicesResponse {
    Legacy(Vec<String>),
    Current(BlockedServicesSet),
}

impl Default for BlockedServicesResponse {
    fn default() -> Self {
        Self::Legacy(Vec::new())
    }
}

impl From<BlockedServicesResponse> for BlockedServicesSet {
    fn from(resp: BlockedServicesResponse) -> Self {
        match resp {
            BlockedServicesResponse::Legacy(ids) => Self {
                ids: ids.into_iter().collect(),
                schedule: None,
            },
            BlockedServicesResponse::Current(set) => set,
        }
    }
}

/// One entry of the blockable-service catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockableService {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group_id: String,
}

/// `GET /control/blocked_services/all`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCatalog {
    #[serde(deserialize_with = "null_as_default")]
    pub blocked_services: Vec<BlockableService>,
}

// ── DNS rewrites ────────────────────────────────────────────────────

/// A DNS rewrite. `(domain, answer)` identifies the rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub domain: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl RewriteRule {
    pub fn new(domain: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            answer: answer.into(),
            enabled: None,
        }
    }

    pub fn matches(&self, domain: &str, answer: &str) -> bool {
        self.domain == domain && self.answer == answer
    }
}

/// `PUT /control/rewrite/update` body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RewriteUpdate<'a> {
    pub target: RewriteTarget<'a>,
    pub update: &'a RewriteRule,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RewriteTarget<'a> {
    pub domain: &'a str,
    pub answer: &'a str,
}

// ── DNS configuration ───────────────────────────────────────────────

/// `GET /control/dns_info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    #[serde(deserialize_with = "null_as_default")]
    pub upstream_dns: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub bootstrap_dns: Vec<String>,
    #[serde(alias = "rate_limit")]
    pub ratelimit: u32,
    pub blocking_mode: String,
    pub edns_cs_enabled: bool,
    pub dnssec_enabled: bool,
    pub cache_size: u64,
    pub cache_ttl_min: u32,
    pub cache_ttl_max: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DnsConfig {
    /// Servers without an explicit flag cache iff the cache has a size.
    pub fn cache_active(&self) -> bool {
        self.cache_enabled.unwrap_or(self.cache_size > 0)
    }
}

/// `POST /control/dns_config` body. The server patches the fields present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DnsConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_dns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_dns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratelimit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edns_cs_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_enabled: Option<bool>,
}

impl DnsConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── DHCP ────────────────────────────────────────────────────────────

/// `GET /control/dhcp/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DhcpStatus {
    pub enabled: bool,
    pub interface_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub leases: Vec<DhcpLease>,
    #[serde(deserialize_with = "null_as_default")]
    pub static_leases: Vec<DhcpLease>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DhcpLease {
    pub mac: String,
    pub ip: String,
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn client_round_trip_keeps_unknown_fields_and_omits_absent_ones() {
        let raw = json!({
            "name": "kid-tablet",
            "ids": ["192.168.1.50"],
            "filtering_enabled": true,
            "uid": "0190-abc",
            "blocked_services": null
        });
        let client: ClientConfig = serde_json::from_value(raw).expect("client decodes");
        assert_eq!(client.blocked_services, None);
        assert_eq!(client.extra.get("uid"), Some(&json!("0190-abc")));

        let out = serde_json::to_value(&client).expect("client encodes");
        assert_eq!(
            out,
            json!({
                "name": "kid-tablet",
                "ids": ["192.168.1.50"],
                "filtering_enabled": true,
                "uid": "0190-abc"
            })
        );
    }

    #[test]
    fn blocked_services_accepts_both_response_shapes() {
        let legacy: BlockedServicesResponse =
            serde_json::from_value(json!(["youtube", "tiktok"])).expect("legacy shape");
        let set = BlockedServicesSet::from(legacy);
        assert_eq!(set.ids.len(), 2);
        assert!(set.schedule.is_none());

        let current: BlockedServicesResponse = serde_json::from_value(json!({
            "ids": ["tiktok", "tiktok", "reddit"],
            "schedule": {"time_zone": "Local", "mon": {"start": 0, "end": 3_600_000}}
        }))
        .expect("current shape");
        let set = BlockedServicesSet::from(current);
        assert_eq!(set.ids.iter().collect::<Vec<_>>(), ["tiktok", "reddit"]);
        let schedule = set.schedule.expect("schedule kept");
        assert_eq!(schedule.mon, Some(DayRange { start: 0, end: 3_600_000 }));
    }

    #[test]
    fn filtering_status_null_lists_become_empty() {
        let status: FilteringStatus = serde_json::from_value(json!({
            "enabled": true,
            "interval": 24,
            "filters": null,
            "whitelist_filters": [{"id": 7, "name": "allow", "url": "https://a", "enabled": true}],
            "user_rules": null
        }))
        .expect("status decodes");
        let status = status.with_allowlists_marked();
        assert!(status.filters.is_empty());
        assert!(status.user_rules.is_empty());
        assert!(status.find("https://a", true).is_some_and(|f| f.allowlist));
        assert!(status.find("https://a", false).is_none());
    }

    #[test]
    fn dns_cache_inferred_from_size() {
        let cfg: DnsConfig =
            serde_json::from_value(json!({"cache_size": 0, "rate_limit": 30})).expect("decodes");
        assert!(!cfg.cache_active());
        assert_eq!(cfg.ratelimit, 30);
        let cfg: DnsConfig = serde_json::from_value(json!({"cache_size": 4096})).expect("decodes");
        assert!(cfg.cache_active());
    }

    #[test]
    fn set_filter_url_echoes_name() {
        let list = FilterList {
            id: 1,
            name: "AdGuard DNS filter".into(),
            url: "https://filters/1.txt".into(),
            enabled: false,
            ..FilterList::default()
        };
        let body = serde_json::to_value(SetFilterUrl::new(&list.url, &list)).expect("encodes");
        assert_eq!(body["data"]["name"], "AdGuard DNS filter");
        assert_eq!(body["whitelist"], false);
    }
}
