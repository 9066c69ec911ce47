#![allow(clippy::unwrap_used)]
// Command façade against a wiremock server: every write is checked for
// the exact payload it sends after the read-merge step.

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use guardly_core::model::{ClientPatch, FilterListPatch, SafeSearchPatch, ServiceSet};
use guardly_core::{Command, CommandResult, Controller, ControllerConfig, CoreError};

use common::{FILTER_URL, NEW_SERVER, OLD_SERVER, connected, hits, mount_reads, ok_text};

async fn server_at(version: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_reads(&server, version).await;
    server
}

fn services(ids: &[&str]) -> ServiceSet {
    ids.iter().map(|s| (*s).to_owned()).collect()
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_commands_rejected_before_connect() {
    let config = ControllerConfig::new("http://127.0.0.1:9".parse().unwrap());
    let controller = Controller::new(config);

    let err = controller
        .execute(Command::SetParental { enabled: true })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ControllerDisconnected));
}

// ── Toggles ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_protection_pause_sends_milliseconds() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("POST"))
        .and(path("/control/protection"))
        .and(body_json(json!({"enabled": false, "duration": 30_000})))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    controller
        .execute(Command::SetProtection {
            enabled: false,
            pause: Some(Duration::from_secs(30)),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_safe_search_toggle_keeps_engine_flags() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("PUT"))
        .and(path("/control/safesearch/settings"))
        .and(body_json(json!({"enabled": false, "bing": true})))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    controller
        .execute(Command::SetSafeSearch { enabled: false })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_ecosia_needs_capability() {
    let server = server_at("v0.107.40").await;
    let controller = connected(&server).await;

    let err = controller
        .execute(Command::UpdateSafeSearch(SafeSearchPatch {
            ecosia: Some(true),
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert!(err.is_unsupported(), "got {err:?}");
    assert_eq!(hits(&server, "/control/safesearch/settings").await, 0);
}

// ── Filtering ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_filter_disable_echoes_list_name() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("POST"))
        .and(path("/control/filtering/set_url"))
        .and(body_json(json!({
            "url": FILTER_URL,
            "data": {"enabled": false, "name": "AdGuard DNS filter", "url": FILTER_URL},
            "whitelist": false
        })))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let result = controller
        .execute(Command::UpdateFilterList {
            url: FILTER_URL.into(),
            allowlist: false,
            patch: FilterListPatch {
                enabled: Some(false),
                ..Default::default()
            },
        })
        .await
        .unwrap();

    match result {
        CommandResult::FilterList(list) => assert_eq!(list.name, "AdGuard DNS filter"),
        other => panic!("expected FilterList, got {other:?}"),
    }
}

#[tokio::test]
async fn test_filter_on_wrong_side_is_not_found() {
    let server = server_at(NEW_SERVER).await;
    let controller = connected(&server).await;

    let err = controller
        .execute(Command::UpdateFilterList {
            url: FILTER_URL.into(),
            allowlist: true,
            patch: FilterListPatch {
                enabled: Some(false),
                ..Default::default()
            },
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
    assert_eq!(hits(&server, "/control/filtering/set_url").await, 0);
}

#[tokio::test]
async fn test_set_filtering_carries_interval_forward() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("POST"))
        .and(path("/control/filtering/config"))
        .and(body_json(json!({"enabled": false, "interval": 12})))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    controller
        .execute(Command::SetFiltering {
            enabled: false,
            interval: None,
        })
        .await
        .unwrap();
}

// ── Clients ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_client_blocked_services_merge_preserves_schedule() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("POST"))
        .and(path("/control/clients/update"))
        .and(body_json(json!({
            "name": "kid-tablet",
            "data": {
                "name": "kid-tablet",
                "ids": ["192.168.1.50"],
                "use_global_blocked_services": false,
                "blocked_services": ["youtube", "tiktok"],
                "blocked_services_schedule": {
                    "time_zone": "Local",
                    "mon": {"start": 0, "end": 3_600_000}
                }
            }
        })))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    controller
        .execute(Command::SetClientBlockedServices {
            name: "kid-tablet".into(),
            services: vec!["youtube".into(), "tiktok".into()],
            schedule: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_client_is_not_found() {
    let server = server_at(NEW_SERVER).await;
    let controller = connected(&server).await;

    let err = controller
        .execute(Command::UpdateClient {
            name: "ghost".into(),
            patch: Box::new(ClientPatch {
                filtering_enabled: Some(false),
                ..Default::default()
            }),
        })
        .await
        .unwrap_err();

    match err {
        CoreError::NotFound { entity_type, identifier } => {
            assert_eq!(entity_type, "client");
            assert_eq!(identifier, "ghost");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(hits(&server, "/control/clients/update").await, 0);
}

#[tokio::test]
async fn test_client_schedule_needs_capability() {
    let server = server_at(OLD_SERVER).await;
    let controller = connected(&server).await;

    let err = controller
        .execute(Command::SetClientBlockedServices {
            name: "kid-tablet".into(),
            services: vec!["youtube".into()],
            schedule: Some(guardly_core::model::Schedule::local()),
        })
        .await
        .unwrap_err();
    assert!(err.is_unsupported(), "got {err:?}");
}

// ── Global blocked services ─────────────────────────────────────────

#[tokio::test]
async fn test_global_write_without_schedule_omits_it() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("PUT"))
        .and(path("/control/blocked_services/update"))
        .and(body_json(json!({"ids": ["tiktok", "instagram", "facebook"]})))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let result = controller
        .execute(Command::SetBlockedServices {
            services: services(&["tiktok", "instagram", "facebook"]),
            schedule: None,
        })
        .await
        .unwrap();

    match result {
        CommandResult::BlockedServices(set) => assert!(set.schedule.is_none()),
        other => panic!("expected BlockedServices, got {other:?}"),
    }
}

#[tokio::test]
async fn test_block_service_carries_schedule_forward() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("PUT"))
        .and(path("/control/blocked_services/update"))
        .and(body_json(json!({
            "ids": ["facebook", "tiktok"],
            "schedule": {"time_zone": "Local"}
        })))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    controller
        .execute(Command::BlockService { id: "tiktok".into() })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_old_server_uses_legacy_set() {
    let server = server_at(OLD_SERVER).await;
    Mock::given(method("POST"))
        .and(path("/control/blocked_services/set"))
        .and(body_json(json!(["tiktok"])))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    controller
        .execute(Command::SetBlockedServices {
            services: services(&["tiktok"]),
            schedule: None,
        })
        .await
        .unwrap();
    assert_eq!(hits(&server, "/control/blocked_services/update").await, 0);
}

// ── Rewrites ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rewrite_toggle_unsupported_on_old_server() {
    let server = server_at("v0.107.60").await;
    let controller = connected(&server).await;

    let err = controller
        .execute(Command::SetRewriteEnabled {
            domain: "ads.example.com".into(),
            answer: "0.0.0.0".into(),
            enabled: false,
        })
        .await
        .unwrap_err();

    assert!(err.is_unsupported(), "got {err:?}");
    assert_eq!(hits(&server, "/control/rewrite/update").await, 0);
}

#[tokio::test]
async fn test_rewrite_toggle_succeeds_with_capability() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("PUT"))
        .and(path("/control/rewrite/update"))
        .and(body_json(json!({
            "target": {"domain": "ads.example.com", "answer": "0.0.0.0"},
            "update": {"domain": "ads.example.com", "answer": "0.0.0.0", "enabled": false}
        })))
        .respond_with(ok_text())
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let result = controller
        .execute(Command::SetRewriteEnabled {
            domain: "ads.example.com".into(),
            answer: "0.0.0.0".into(),
            enabled: false,
        })
        .await
        .unwrap();

    match result {
        CommandResult::Rewrite(rule) => assert_eq!(rule.enabled, Some(false)),
        other => panic!("expected Rewrite, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_rewrite_is_not_found() {
    let server = server_at(NEW_SERVER).await;
    let controller = connected(&server).await;

    let err = controller
        .execute(Command::RemoveRewrite {
            domain: "nope.example.com".into(),
            answer: "1.2.3.4".into(),
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

// ── DNS ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_dns_update_is_rejected() {
    let server = server_at(NEW_SERVER).await;
    let controller = connected(&server).await;

    let err = controller
        .execute(Command::UpdateDnsConfig(Default::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_remote_rejection_surfaces_status_and_body() {
    let server = server_at(NEW_SERVER).await;
    Mock::given(method("POST"))
        .and(path("/control/stats_reset"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .mount(&server)
        .await;

    let controller = connected(&server).await;
    let err = controller.execute(Command::ResetStats).await.unwrap_err();
    match err {
        CoreError::Remote { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("disk full"));
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

// ── Queries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_host_params_gated() {
    let server = server_at("v0.107.50").await;
    let controller = connected(&server).await;

    let err = controller
        .check_host("ads.example.com", Some("192.168.1.50"), None)
        .await
        .unwrap_err();
    assert!(err.is_unsupported(), "got {err:?}");
}

#[tokio::test]
async fn test_diagnostics_redacts_client_ids() {
    let server = server_at(NEW_SERVER).await;
    let controller = connected(&server).await;

    let doc = controller.diagnostics();
    assert_eq!(doc["clients"][0]["name"], json!("kid-tablet"));
    assert_eq!(doc["clients"][0]["ids"], json!("**REDACTED**"));
    assert_eq!(doc["version"], json!("v0.107.70"));
    assert!(!doc.to_string().contains("192.168.1.50"));
}
