// ── Controller abstraction ──
//
// Full lifecycle management for one AdGuard Home server: client setup,
// the first poll cycle, the background poll task, command routing and
// snapshot streaming.

use std::sync::Arc;

use guardly_api::{BasicAuth, HomeClient, TlsMode, TransportConfig};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capability::{Capability, CapabilitySet};
use crate::command::{Command, CommandResult, RecordLocks, RouteContext, route_command};
use crate::config::{ControllerConfig, Credentials, TlsVerification};
use crate::diagnostics;
use crate::error::CoreError;
use crate::model::{BlockableService, CheckHostResult, ClientSearchHit, QueryLogPage, QueryLogParams};
use crate::poller::{PollSettings, PollState, Poller, Shared, poll_task};
use crate::snapshot::Snapshot;
use crate::stream::SnapshotStream;

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, strum::Display)]
#[serde(tag = "state", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The status read keeps failing; the snapshot is stale.
    Reconnecting { attempt: u32 },
    /// Credentials were rejected. Call
    /// [`update_credentials`](Controller::update_credentials).
    AuthRequired,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Reads come from the
/// published snapshot; writes go through [`execute`](Self::execute).
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    shared: Arc<Shared>,
    client: Mutex<Option<Arc<HomeClient>>>,
    /// Live credentials. Starts from `config` and follows `update_credentials`.
    credentials: Mutex<Option<Credentials>>,
    locks: RecordLocks,
    cancel: CancellationToken,
    /// Child of `cancel`, replaced on each connect.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to run the first cycle and start polling.
    pub fn new(config: ControllerConfig) -> Self {
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let credentials = config.credentials.clone();
        Self {
            inner: Arc::new(ControllerInner {
                config,
                shared: Arc::new(Shared::new()),
                client: Mutex::new(None),
                credentials: Mutex::new(credentials),
                locks: RecordLocks::default(),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Connect to the server.
    ///
    /// Builds the HTTP client, loads the service catalog, runs the first
    /// poll cycle and spawns the background poll task. Rejected
    /// credentials fail with `AuthenticationRequired`; an unreachable
    /// server fails with `Transient`. Connecting again first stops the
    /// previous poll task.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.stop_tasks().await;
        let shared = &self.inner.shared;
        shared.connection.send_replace(ConnectionState::Connecting);

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let transport = build_transport(config);
        let auth = self
            .inner
            .credentials
            .lock()
            .await
            .as_ref()
            .map(to_basic_auth);
        let client = match HomeClient::new(config.url.clone(), auth, &transport) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                shared.connection.send_replace(ConnectionState::Failed);
                return Err(e.into());
            }
        };
        *self.inner.client.lock().await = Some(Arc::clone(&client));

        let mut poller = Poller::new(Arc::clone(&client), Arc::clone(shared), PollSettings {
            max_concurrent_requests: config.max_concurrent_requests,
            query_log_limit: config.query_log_limit,
            top_n: config.top_n,
        });
        poller.load_catalog().await;

        if let Err(e) = poller.run_cycle().await {
            if !e.is_auth() {
                shared.connection.send_replace(ConnectionState::Failed);
            }
            return Err(e);
        }

        if !config.poll_interval.is_zero() {
            let period = config.poll_interval;
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(poll_task(poller, period, child)));
        }

        shared.connection.send_replace(ConnectionState::Connected);
        let snapshot = self.snapshot();
        info!(
            url = %config.url,
            version = ?snapshot.version.as_ref().map(ToString::to_string),
            "connected to server"
        );
        Ok(())
    }

    /// Disconnect from the server.
    ///
    /// Cancels the poll task and in-flight commands, joins the task, and
    /// resets the connection state to [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        self.stop_tasks().await;

        *self.inner.client.lock().await = None;
        self.inner
            .shared
            .connection
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Cancel the current child token and join every spawned task.
    async fn stop_tasks(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let handles: Vec<JoinHandle<()>> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll task ended abnormally");
            }
        }
    }

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Disables background polling since a single request-response cycle
    /// is all a CLI invocation needs.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval = std::time::Duration::ZERO;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    /// Replace the credentials. Resumes polling if it was suspended, and
    /// later calls to [`connect`](Self::connect) use them too.
    pub async fn update_credentials(&self, credentials: Option<Credentials>) {
        *self.inner.credentials.lock().await = credentials.clone();
        if let Some(client) = self.inner.client.lock().await.as_ref() {
            client.set_auth(credentials.as_ref().map(to_basic_auth));
        }
        self.inner.shared.credentials.send_modify(|generation| {
            *generation = generation.wrapping_add(1);
        });
        info!("credentials updated");
    }

    /// Ask the poll task for a cycle now instead of at the next tick.
    pub fn request_refresh(&self) {
        self.inner.shared.refresh.notify_one();
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a command against the server.
    ///
    /// Commands run on the caller's task, concurrently with polling and
    /// with each other. Writers to the same record are serialized. A
    /// successful command requests an out-of-cycle refresh.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let client = self.connected_client().await?;
        let cancel = self.inner.cancel_child.lock().await.clone();
        let name = cmd.name();
        debug!(command = name, "executing command");

        let ctx = RouteContext {
            client: &client,
            capabilities: self.capabilities(),
            locks: &self.inner.locks,
        };
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(CoreError::ControllerDisconnected),
            result = route_command(&ctx, cmd) => result,
        };

        match &result {
            Ok(_) => self.request_refresh(),
            Err(e) => debug!(command = name, error = %e, "command failed"),
        }
        result
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Fetch one query log page. The `response_status` filter needs
    /// `querylog-response-status`.
    pub async fn query_log(&self, params: QueryLogParams) -> Result<QueryLogPage, CoreError> {
        if params.response_status.is_some() {
            self.require("query log status filter", Capability::QuerylogResponseStatus)?;
        }
        let client = self.connected_client().await?;
        Ok(client.query_log(&params).await?)
    }

    /// How `name` would be filtered. `client` and `qtype` need
    /// `check-host-params`.
    pub async fn check_host(
        &self,
        name: &str,
        client_id: Option<&str>,
        qtype: Option<&str>,
    ) -> Result<CheckHostResult, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "host name must not be empty".into(),
            });
        }
        if client_id.is_some() || qtype.is_some() {
            self.require("check host parameters", Capability::CheckHostParams)?;
        }
        let client = self.connected_client().await?;
        Ok(client.check_host(name, client_id, qtype).await?)
    }

    /// Look up runtime and persistent clients by id (IP, MAC, ClientID).
    pub async fn search_clients(&self, ids: &[String]) -> Result<Vec<ClientSearchHit>, CoreError> {
        self.require("client search", Capability::ClientSearch)?;
        let client = self.connected_client().await?;
        Ok(client.search_clients(ids).await?)
    }

    /// The blockable-service catalog loaded at connect.
    pub fn catalog(&self) -> Arc<Vec<BlockableService>> {
        Arc::clone(&self.snapshot().catalog)
    }

    // ── State observation ────────────────────────────────────────────

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.shared.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot publishes.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.shared.snapshot.subscribe())
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.connection.subscribe()
    }

    /// Subscribe to poll loop state changes.
    pub fn poll_state(&self) -> watch::Receiver<PollState> {
        self.inner.shared.poll_state.subscribe()
    }

    /// Capabilities in force, including runtime downgrades.
    pub fn capabilities(&self) -> Arc<CapabilitySet> {
        self.inner.shared.capabilities.load_full()
    }

    /// Redacted diagnostics document.
    pub fn diagnostics(&self) -> serde_json::Value {
        let state = self.inner.shared.connection.borrow().clone();
        diagnostics::export(&self.inner.config, &self.snapshot(), &state)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require(&self, operation: &str, cap: Capability) -> Result<(), CoreError> {
        if self.capabilities().contains(cap) {
            Ok(())
        } else {
            Err(CoreError::unsupported(operation, cap))
        }
    }

    async fn connected_client(&self) -> Result<Arc<HomeClient>, CoreError> {
        let state = self.inner.shared.connection.borrow().clone();
        if matches!(
            state,
            ConnectionState::Disconnected | ConnectionState::Connecting | ConnectionState::Failed
        ) {
            return Err(CoreError::ControllerDisconnected);
        }
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::ControllerDisconnected)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

fn to_basic_auth(credentials: &Credentials) -> BasicAuth {
    BasicAuth {
        username: credentials.username.clone(),
        password: credentials.password.clone(),
    }
}
