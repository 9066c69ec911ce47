// ── Command routing ──
//
// Each mutating command takes its per-record lock, fetches the record
// fresh, merges the caller's intent and writes the full record back.

use std::sync::Arc;

use dashmap::DashMap;
use guardly_api::HomeClient;
use guardly_api::models::FilteringConfig;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::{Command, CommandResult};
use crate::capability::{Capability, CapabilitySet};
use crate::error::CoreError;
use crate::model::{
    BlockedServicesPatch, BlockedServicesSet, ClientConfig, ClientPatch, RewriteRule, Schedule,
    merge_update,
};

/// Filter update interval used when the server does not report one.
const DEFAULT_FILTER_INTERVAL_HOURS: u32 = 24;

// ── Per-record locks ─────────────────────────────────────────────────

/// Serializes local writers to the same record. Remote writers are not
/// covered; the fresh fetch before each write narrows that window.
///
/// An entry lives only while someone holds or waits for it.
#[derive(Debug, Default)]
pub(crate) struct RecordLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RecordLocks {
    pub(crate) async fn acquire(&self, key: String) -> RecordGuard<'_> {
        let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        RecordGuard {
            guard: Some(lock.lock_owned().await),
            key,
            locks: &self.locks,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Held for the duration of one record write.
pub(crate) struct RecordGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The map's own reference is the last one: nobody is waiting.
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// What a command needs from the controller.
pub(crate) struct RouteContext<'a> {
    pub client: &'a HomeClient,
    pub capabilities: Arc<CapabilitySet>,
    pub locks: &'a RecordLocks,
}

impl RouteContext<'_> {
    fn require(&self, operation: &str, cap: Capability) -> Result<(), CoreError> {
        if self.capabilities.contains(cap) {
            Ok(())
        } else {
            Err(CoreError::unsupported(operation, cap))
        }
    }

    fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }
}

// ── Routing ──────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub(crate) async fn route_command(
    ctx: &RouteContext<'_>,
    cmd: Command,
) -> Result<CommandResult, CoreError> {
    let client = ctx.client;

    match cmd {
        // ── Protection toggles ───────────────────────────────────

        Command::SetProtection { enabled, pause } => {
            let pause_ms = pause
                .filter(|_| !enabled)
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
            client.set_protection(enabled, pause_ms).await?;
            Ok(CommandResult::Ok)
        }

        Command::SetSafeBrowsing { enabled } => {
            client.set_safebrowsing(enabled).await?;
            Ok(CommandResult::Ok)
        }

        Command::SetParental { enabled } => {
            client.set_parental(enabled).await?;
            Ok(CommandResult::Ok)
        }

        Command::SetSafeSearch { enabled } => {
            update_safe_search(ctx, crate::model::SafeSearchPatch {
                enabled: Some(enabled),
                ..Default::default()
            })
            .await
        }

        Command::UpdateSafeSearch(patch) => {
            if patch.ecosia.is_some() {
                ctx.require("safe search: ecosia", Capability::EcosiaSafesearch)?;
            }
            update_safe_search(ctx, patch).await
        }

        // ── Filtering ────────────────────────────────────────────

        Command::SetFiltering { enabled, interval } => {
            let interval = match interval {
                Some(hours) => hours,
                None => client
                    .filtering_status()
                    .await?
                    .interval
                    .unwrap_or(DEFAULT_FILTER_INTERVAL_HOURS),
            };
            client
                .set_filtering_config(FilteringConfig { enabled, interval })
                .await?;
            Ok(CommandResult::Ok)
        }

        Command::AddFilterList {
            name,
            url,
            allowlist,
        } => {
            let _guard = ctx.locks.acquire(filter_key(&url, allowlist)).await;
            client.add_filter_url(&name, &url, allowlist).await?;
            Ok(CommandResult::Ok)
        }

        Command::RemoveFilterList { url, allowlist } => {
            let _guard = ctx.locks.acquire(filter_key(&url, allowlist)).await;
            let status = client.filtering_status().await?;
            if status.find(&url, allowlist).is_none() {
                return Err(CoreError::not_found("filter list", url));
            }
            client.remove_filter_url(&url, allowlist).await?;
            Ok(CommandResult::Ok)
        }

        Command::UpdateFilterList {
            url,
            allowlist,
            patch,
        } => {
            let _guard = ctx.locks.acquire(filter_key(&url, allowlist)).await;
            let status = client.filtering_status().await?;
            let current = status
                .find(&url, allowlist)
                .cloned()
                .ok_or_else(|| CoreError::not_found("filter list", url.clone()))?;
            let merged = merge_update(current, patch);
            client.set_filter_url(&url, &merged).await?;
            Ok(CommandResult::FilterList(merged))
        }

        Command::RefreshFilters { allowlist } => {
            client.refresh_filters(allowlist).await?;
            Ok(CommandResult::Ok)
        }

        // ── Persistent clients ───────────────────────────────────

        Command::AddClient(config) => {
            let _guard = ctx.locks.acquire(client_key(&config.name)).await;
            let config = with_schedule_default(ctx, *config);
            client.add_client(&config).await?;
            Ok(CommandResult::Client(Box::new(config)))
        }

        Command::DeleteClient { name } => {
            let _guard = ctx.locks.acquire(client_key(&name)).await;
            fetch_client(client, &name).await?;
            client.delete_client(&name).await?;
            Ok(CommandResult::Ok)
        }

        Command::UpdateClient { name, patch } => {
            if patch.blocked_services_schedule.is_some() {
                ctx.require("client schedule", Capability::ScheduleOnBlockedServices)?;
            }
            let _guard = ctx.locks.acquire(client_key(&name)).await;
            let merged = merge_client(ctx, &name, *patch).await?;
            Ok(CommandResult::Client(Box::new(merged)))
        }

        Command::SetClientBlockedServices {
            name,
            services,
            schedule,
        } => {
            if schedule.is_some() {
                ctx.require("client schedule", Capability::ScheduleOnBlockedServices)?;
            }
            let patch = ClientPatch {
                use_global_blocked_services: Some(false),
                blocked_services: Some(services),
                blocked_services_schedule: schedule,
                ..ClientPatch::default()
            };
            let _guard = ctx.locks.acquire(client_key(&name)).await;
            let merged = merge_client(ctx, &name, patch).await?;
            Ok(CommandResult::Client(Box::new(merged)))
        }

        // ── Global blocked services ──────────────────────────────

        Command::SetBlockedServices { services, schedule } => {
            let _guard = ctx.locks.acquire(BLOCKED_SERVICES_KEY.into()).await;
            let set = BlockedServicesSet {
                ids: services,
                schedule,
            };
            write_blocked_services(ctx, &set).await?;
            Ok(CommandResult::BlockedServices(set))
        }

        Command::BlockService { id } => {
            let _guard = ctx.locks.acquire(BLOCKED_SERVICES_KEY.into()).await;
            let current = fetch_blocked_services(ctx).await?;
            let mut ids = current.ids.clone();
            ids.insert(id);
            let set = merge_update(current, BlockedServicesPatch {
                ids: Some(ids),
                schedule: None,
            });
            write_blocked_services(ctx, &set).await?;
            Ok(CommandResult::BlockedServices(set))
        }

        Command::UnblockService { id } => {
            let _guard = ctx.locks.acquire(BLOCKED_SERVICES_KEY.into()).await;
            let current = fetch_blocked_services(ctx).await?;
            let mut ids = current.ids.clone();
            if !ids.shift_remove(&id) {
                return Err(CoreError::not_found("blocked service", id));
            }
            let set = merge_update(current, BlockedServicesPatch {
                ids: Some(ids),
                schedule: None,
            });
            write_blocked_services(ctx, &set).await?;
            Ok(CommandResult::BlockedServices(set))
        }

        // ── DNS rewrites ─────────────────────────────────────────

        Command::AddRewrite { domain, answer } => {
            let _guard = ctx.locks.acquire(rewrite_key(&domain, &answer)).await;
            client.add_rewrite(&domain, &answer).await?;
            Ok(CommandResult::Rewrite(RewriteRule::new(domain, answer)))
        }

        Command::RemoveRewrite { domain, answer } => {
            let _guard = ctx.locks.acquire(rewrite_key(&domain, &answer)).await;
            fetch_rewrite(client, &domain, &answer).await?;
            client.delete_rewrite(&domain, &answer).await?;
            Ok(CommandResult::Ok)
        }

        Command::UpdateRewrite {
            domain,
            answer,
            new_domain,
            new_answer,
            enabled,
        } => {
            if enabled.is_some() {
                ctx.require("rewrite enabled flag", Capability::RewriteEnableFlag)?;
            }
            let _guard = ctx.locks.acquire(rewrite_key(&domain, &answer)).await;
            let mut rule = fetch_rewrite(client, &domain, &answer).await?;
            if let Some(new_domain) = new_domain {
                rule.domain = new_domain;
            }
            if let Some(new_answer) = new_answer {
                rule.answer = new_answer;
            }
            if enabled.is_some() {
                rule.enabled = enabled;
            }
            client.update_rewrite(&domain, &answer, &rule).await?;
            Ok(CommandResult::Rewrite(rule))
        }

        Command::SetRewriteEnabled {
            domain,
            answer,
            enabled,
        } => {
            ctx.require("rewrite enabled flag", Capability::RewriteEnableFlag)?;
            let _guard = ctx.locks.acquire(rewrite_key(&domain, &answer)).await;
            let mut rule = fetch_rewrite(client, &domain, &answer).await?;
            rule.enabled = Some(enabled);
            client.update_rewrite(&domain, &answer, &rule).await?;
            Ok(CommandResult::Rewrite(rule))
        }

        // ── DNS server ───────────────────────────────────────────

        Command::UpdateDnsConfig(update) => {
            if update.is_empty() {
                return Err(CoreError::Validation {
                    message: "DNS update names no fields".into(),
                });
            }
            if update.cache_enabled.is_some() {
                ctx.require("DNS cache toggle", Capability::CacheToggle)?;
            }
            client.set_dns_config(&update).await?;
            Ok(CommandResult::Ok)
        }

        // ── Statistics & query log ───────────────────────────────

        Command::UpdateStatsConfig(patch) => {
            ctx.require("statistics settings", Capability::StatsConfig)?;
            let _guard = ctx.locks.acquire("stats-config".into()).await;
            let merged = merge_update(client.stats_config().await?, patch);
            client.set_stats_config(&merged).await?;
            Ok(CommandResult::Ok)
        }

        Command::UpdateQueryLogConfig(patch) => {
            ctx.require("query log settings", Capability::QuerylogConfig)?;
            let _guard = ctx.locks.acquire("querylog-config".into()).await;
            let merged = merge_update(client.query_log_config().await?, patch);
            client.set_query_log_config(&merged).await?;
            Ok(CommandResult::Ok)
        }

        Command::ResetStats => {
            client.reset_stats().await?;
            Ok(CommandResult::Ok)
        }

        Command::ClearQueryLog => {
            client.clear_query_log().await?;
            Ok(CommandResult::Ok)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

const BLOCKED_SERVICES_KEY: &str = "blocked-services";

fn client_key(name: &str) -> String {
    format!("client:{name}")
}

fn filter_key(url: &str, allowlist: bool) -> String {
    format!("filter:{allowlist}:{url}")
}

fn rewrite_key(domain: &str, answer: &str) -> String {
    format!("rewrite:{domain}|{answer}")
}

async fn update_safe_search(
    ctx: &RouteContext<'_>,
    patch: crate::model::SafeSearchPatch,
) -> Result<CommandResult, CoreError> {
    let _guard = ctx.locks.acquire("safesearch".into()).await;
    let merged = merge_update(ctx.client.safesearch_settings().await?, patch);
    ctx.client.set_safesearch_settings(&merged).await?;
    Ok(CommandResult::Ok)
}

async fn fetch_client(client: &HomeClient, name: &str) -> Result<ClientConfig, CoreError> {
    client
        .clients()
        .await?
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| CoreError::not_found("client", name))
}

async fn merge_client(
    ctx: &RouteContext<'_>,
    name: &str,
    patch: ClientPatch,
) -> Result<ClientConfig, CoreError> {
    let current = fetch_client(ctx.client, name).await?;
    let merged = with_schedule_default(ctx, merge_update(current, patch));
    debug!(client = name, "writing merged client record");
    ctx.client.update_client(name, &merged).await?;
    Ok(merged)
}

/// A client with its own blocked services needs a schedule on servers
/// that understand schedules; an empty local one blocks all day.
fn with_schedule_default(ctx: &RouteContext<'_>, mut config: ClientConfig) -> ClientConfig {
    if ctx.has(Capability::ScheduleOnBlockedServices)
        && config.use_global_blocked_services == Some(false)
        && config.blocked_services_schedule.is_none()
    {
        config.blocked_services_schedule = Some(Schedule::local());
    }
    config
}

async fn fetch_blocked_services(ctx: &RouteContext<'_>) -> Result<BlockedServicesSet, CoreError> {
    let set = if ctx.has(Capability::ScheduleOnBlockedServices) {
        ctx.client.blocked_services().await?
    } else {
        ctx.client.blocked_services_legacy().await?
    };
    Ok(set)
}

async fn write_blocked_services(
    ctx: &RouteContext<'_>,
    set: &BlockedServicesSet,
) -> Result<(), CoreError> {
    if ctx.has(Capability::ScheduleOnBlockedServices) {
        ctx.client.set_blocked_services(set).await?;
    } else {
        if set.schedule.is_some() {
            return Err(CoreError::unsupported(
                "blocked services schedule",
                Capability::ScheduleOnBlockedServices,
            ));
        }
        let ids: Vec<&str> = set.ids.iter().map(String::as_str).collect();
        ctx.client.set_blocked_services_legacy(&ids).await?;
    }
    Ok(())
}

async fn fetch_rewrite(
    client: &HomeClient,
    domain: &str,
    answer: &str,
) -> Result<RewriteRule, CoreError> {
    client
        .rewrites()
        .await?
        .into_iter()
        .find(|r| r.matches(domain, answer))
        .ok_or_else(|| CoreError::not_found("rewrite", format!("{domain} -> {answer}")))
}
