// Shared wiremock fixtures for the core integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use guardly_core::{Controller, ControllerConfig};

pub const NEW_SERVER: &str = "v0.107.70";
pub const OLD_SERVER: &str = "v0.107.55";

pub const FILTER_URL: &str = "https://adguardteam.github.io/HostlistsRegistry/assets/filter_1.txt";

pub fn status_body(version: &str) -> Value {
    json!({
        "version": version,
        "running": true,
        "protection_enabled": true,
        "dns_addresses": ["192.168.1.2"],
        "dns_port": 53,
        "http_port": 3000
    })
}

/// Answer every read the poller issues with a small, consistent fixture.
/// Mounted at the default priority so tests can override single paths.
pub async fn mount_reads(server: &MockServer, version: &str) {
    let reads: Vec<(&str, &str, Value)> = vec![
        ("GET", "/control/status", status_body(version)),
        (
            "GET",
            "/control/stats",
            json!({
                "num_dns_queries": 1200,
                "num_blocked_filtering": 150,
                "top_queried_domains": [{"zeta.example": 40}, {"alpha.example": 40}, {"big.example": 90}],
                "top_blocked_domains": [{"ads.example.com": 70}],
                "top_clients": [{"192.168.1.50": 300}]
            }),
        ),
        (
            "GET",
            "/control/clients",
            json!({
                "clients": [{
                    "name": "kid-tablet",
                    "ids": ["192.168.1.50"],
                    "use_global_blocked_services": false,
                    "blocked_services": ["tiktok"],
                    "blocked_services_schedule": {
                        "time_zone": "Local",
                        "mon": {"start": 0, "end": 3_600_000}
                    }
                }]
            }),
        ),
        (
            "GET",
            "/control/filtering/status",
            json!({
                "enabled": true,
                "interval": 12,
                "filters": [{
                    "id": 1,
                    "name": "AdGuard DNS filter",
                    "url": FILTER_URL,
                    "enabled": true,
                    "rules_count": 52000
                }],
                "whitelist_filters": null,
                "user_rules": ["||example.org^"]
            }),
        ),
        (
            "GET",
            "/control/rewrite/list",
            json!([{"domain": "ads.example.com", "answer": "0.0.0.0"}]),
        ),
        (
            "GET",
            "/control/dhcp/status",
            json!({"enabled": false, "interface_name": "", "leases": [], "static_leases": []}),
        ),
        ("GET", "/control/blocked_services/list", json!(["facebook"])),
        (
            "GET",
            "/control/blocked_services/get",
            json!({"ids": ["facebook"], "schedule": {"time_zone": "Local"}}),
        ),
        (
            "GET",
            "/control/blocked_services/all",
            json!({"blocked_services": [
                {"id": "facebook", "name": "Facebook"},
                {"id": "instagram", "name": "Instagram"},
                {"id": "tiktok", "name": "TikTok"}
            ]}),
        ),
        (
            "GET",
            "/control/dns_info",
            json!({"upstream_dns": ["https://dns10.quad9.net/dns-query"], "cache_size": 4_194_304}),
        ),
        ("GET", "/control/safebrowsing/status", json!({"enabled": false})),
        ("GET", "/control/parental/status", json!({"enabled": true})),
        ("GET", "/control/safesearch/status", json!({"enabled": true, "bing": true})),
        ("GET", "/control/querylog", json!({"data": [], "oldest": ""})),
        (
            "GET",
            "/control/stats/config",
            json!({"enabled": true, "interval": 86_400_000, "ignored": []}),
        ),
        (
            "GET",
            "/control/querylog/config",
            json!({"enabled": true, "interval": 7_776_000_000_u64, "anonymize_client_ip": false}),
        ),
    ];

    for (verb, route, body) in reads {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}

/// Acknowledge a write with the server's usual plain-text `OK`.
pub fn ok_text() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/plain; charset=utf-8")
        .set_body_string("OK")
}

pub fn config(server: &MockServer, poll_interval: Duration) -> ControllerConfig {
    let mut config = ControllerConfig::new(Url::parse(&server.uri()).unwrap());
    config.timeout = Duration::from_secs(5);
    config.poll_interval = poll_interval;
    config
}

/// A connected controller with background polling disabled.
pub async fn connected(server: &MockServer) -> Controller {
    let controller = Controller::new(config(server, Duration::ZERO));
    controller.connect().await.unwrap();
    controller
}

/// Number of requests the server has seen for `route`.
pub async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}
