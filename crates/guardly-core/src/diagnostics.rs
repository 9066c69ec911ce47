// ── Diagnostics export ──
//
// A redacted JSON dump of what the controller knows, safe to paste into
// a bug report: configuration without secrets, version and capabilities,
// per-section counts, and no addresses or identifiers.

use serde_json::{Map, Value, json};

use crate::config::ControllerConfig;
use crate::controller::ConnectionState;
use crate::snapshot::Snapshot;

pub const REDACTED: &str = "**REDACTED**";

/// Keys whose values are replaced wherever they appear.
const SENSITIVE_KEYS: [&str; 9] = [
    "ids",
    "mac",
    "ip",
    "hostname",
    "IP",
    "dns_addresses",
    "password",
    "username",
    "answer",
];

/// Rewrite domains listed before truncation.
const REWRITE_SAMPLE: usize = 20;

/// Replace the value of every sensitive key, at any depth.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    *child = Value::String(REDACTED.into());
                } else {
                    redact(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Build the diagnostics document.
pub fn export(config: &ControllerConfig, snapshot: &Snapshot, state: &ConnectionState) -> Value {
    let mut doc = Map::new();
    doc.insert("config".into(), config_summary(config));
    doc.insert(
        "version".into(),
        snapshot
            .version
            .as_ref()
            .map_or(Value::Null, |v| Value::String(v.to_string())),
    );
    doc.insert(
        "capabilities".into(),
        serde_json::to_value(&snapshot.capabilities).unwrap_or(Value::Null),
    );
    doc.insert("connection_state".into(), Value::String(state.to_string()));
    doc.insert(
        "snapshot".into(),
        json!({
            "cycle": snapshot.cycle,
            "produced_at": snapshot.produced_at,
            "stale": snapshot.stale,
            "outcome": snapshot.outcome,
            "stale_sections": snapshot.stale_sections(),
        }),
    );

    if let Some(server) = snapshot.server.get() {
        let mut status = serde_json::to_value(server).unwrap_or(Value::Null);
        redact(&mut status);
        doc.insert("status".into(), status);
    }

    if let Some(stats) = snapshot.stats.get() {
        doc.insert(
            "stats".into(),
            json!({
                "num_dns_queries": stats.num_dns_queries,
                "num_blocked_filtering": stats.num_blocked_filtering,
                "num_replaced_safebrowsing": stats.num_replaced_safebrowsing,
                "num_replaced_parental": stats.num_replaced_parental,
                "top_queried_domains": stats.top_queried_domains.len(),
                "top_blocked_domains": stats.top_blocked_domains.len(),
                "top_clients": stats.top_clients.len(),
            }),
        );
    }

    if let Some(filtering) = snapshot.filtering.get() {
        doc.insert(
            "filtering".into(),
            json!({
                "enabled": filtering.enabled,
                "interval": filtering.interval,
                "filters": filtering.filters.len(),
                "enabled_filters": filtering.filters.iter().filter(|f| f.enabled).count(),
                "allowlists": filtering.whitelist_filters.len(),
                "user_rules": filtering.user_rules.len(),
            }),
        );
    }

    if let Some(blocked) = snapshot.blocked_services.get() {
        doc.insert(
            "blocked_services".into(),
            json!({
                "ids": blocked.ids.len(),
                "scheduled": blocked.schedule.is_some(),
            }),
        );
    }

    if let Some(clients) = snapshot.clients.get() {
        let entries: Vec<Value> = clients
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "ids": REDACTED,
                    "use_global_settings": c.use_global_settings,
                    "filtering_enabled": c.filtering_enabled,
                    "parental_enabled": c.parental_enabled,
                    "safebrowsing_enabled": c.safebrowsing_enabled,
                    "use_global_blocked_services": c.use_global_blocked_services,
                    "blocked_services_count": c.blocked_services.as_ref().map_or(0, Vec::len),
                })
            })
            .collect();
        doc.insert("clients".into(), Value::Array(entries));
    }

    if let Some(dhcp) = snapshot.dhcp.get() {
        doc.insert(
            "dhcp".into(),
            json!({
                "enabled": dhcp.enabled,
                "interface_name": dhcp.interface_name,
                "leases": dhcp.leases.len(),
                "static_leases": dhcp.static_leases.len(),
            }),
        );
    }

    if let Some(rewrites) = snapshot.rewrites.get() {
        let domains: Vec<&str> = rewrites
            .iter()
            .take(REWRITE_SAMPLE)
            .map(|r| r.domain.as_str())
            .collect();
        doc.insert(
            "rewrites".into(),
            json!({ "count": rewrites.len(), "domains": domains }),
        );
    }

    if let Some(entries) = snapshot.query_log.get() {
        doc.insert(
            "query_log".into(),
            json!({ "entries_fetched": entries.len() }),
        );
    }

    Value::Object(doc)
}

fn config_summary(config: &ControllerConfig) -> Value {
    let mut url = config.url.clone();
    // Userinfo never leaves the process; these only fail on cannot-be-a-base URLs.
    let _ = url.set_username("");
    let _ = url.set_password(None);

    json!({
        "url": url.as_str(),
        "username": config.credentials.as_ref().map(|_| REDACTED),
        "password": config.credentials.as_ref().map(|_| REDACTED),
        "tls": format!("{:?}", config.tls),
        "timeout_secs": config.timeout.as_secs(),
        "poll_interval_secs": config.poll_interval.as_secs(),
        "max_concurrent_requests": config.max_concurrent_requests,
        "query_log_limit": config.query_log_limit,
        "top_n": config.top_n,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use url::Url;

    use super::*;
    use crate::model::{ClientConfig, DhcpLease, DhcpStatus, RewriteRule, ServerStatus};

    #[test]
    fn redact_walks_nested_values() {
        let mut value = json!({
            "name": "kid-tablet",
            "ids": ["192.168.1.50", "aa:bb:cc:dd:ee:ff"],
            "leases": [{ "mac": "aa:bb", "ip": "10.0.0.2", "hostname": "tv", "expires": "x" }],
            "nested": { "password": "hunter2", "answer": "1.2.3.4" }
        });
        redact(&mut value);
        assert_eq!(
            value,
            json!({
                "name": "kid-tablet",
                "ids": REDACTED,
                "leases": [{ "mac": REDACTED, "ip": REDACTED, "hostname": REDACTED, "expires": "x" }],
                "nested": { "password": REDACTED, "answer": REDACTED }
            })
        );
    }

    #[test]
    fn export_contains_no_secrets_or_addresses() {
        let url = Url::parse("http://admin:pw@192.168.1.2:3000/").expect("valid url");
        let config = ControllerConfig::new(url)
            .with_credentials("admin", SecretString::from("s3cret-pass".to_owned()));

        let now = Utc::now();
        let mut snap = Snapshot::default();
        snap.server.refresh(
            ServerStatus {
                version: "v0.107.60".into(),
                dns_addresses: vec!["192.168.1.2".into()],
                ..Default::default()
            },
            1,
            now,
        );
        snap.clients.refresh(
            vec![ClientConfig {
                name: "kid-tablet".into(),
                ids: vec!["192.168.1.50".into()],
                blocked_services: Some(vec!["tiktok".into()]),
                ..Default::default()
            }],
            1,
            now,
        );
        snap.dhcp.refresh(
            DhcpStatus {
                enabled: true,
                leases: vec![DhcpLease {
                    mac: "aa:bb:cc:dd:ee:ff".into(),
                    ip: "192.168.1.77".into(),
                    hostname: "tv".into(),
                    expires: None,
                }],
                ..Default::default()
            },
            1,
            now,
        );
        snap.rewrites
            .refresh(vec![RewriteRule::new("ads.example.com", "10.9.9.9")], 1, now);

        let doc = export(&config, &snap, &ConnectionState::Connected);
        let text = doc.to_string();
        for secret in ["s3cret-pass", "admin", "192.168.1.50", "192.168.1.77", "aa:bb:cc", "10.9.9.9"] {
            assert!(!text.contains(secret), "{secret} leaked: {text}");
        }
        assert!(!text.contains("\"192.168.1.2\""), "dns address leaked");
        assert!(text.contains("192.168.1.2:3000"), "url host kept");

        assert_eq!(doc["clients"][0]["blocked_services_count"], json!(1));
        assert_eq!(doc["dhcp"]["leases"], json!(1));
        assert_eq!(doc["rewrites"]["domains"], json!(["ads.example.com"]));
        assert_eq!(doc["connection_state"], json!("connected"));
    }
}
