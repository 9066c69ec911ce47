//! Server-wide views: status, snapshot, watch, capabilities,
//! diagnostics and host checks.

use serde::Serialize;
use tabled::Tabled;

use guardly_core::model::GlobalStatus;
use guardly_core::{Capability, ConnectionState, Controller, CycleOutcome, Snapshot};

use crate::cli::{CheckHostArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Status ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusView<'a> {
    version: Option<String>,
    connection: String,
    cycle: u64,
    outcome: CycleOutcome,
    stale: bool,
    stale_sections: Vec<&'static str>,
    #[serde(flatten)]
    status: &'a GlobalStatus,
    dns_queries: Option<u64>,
    blocked_queries: Option<u64>,
}

impl<'a> StatusView<'a> {
    fn new(snap: &'a Snapshot, connection: &ConnectionState) -> Self {
        let stats = snap.stats.get();
        Self {
            version: snap.version.as_ref().map(ToString::to_string),
            connection: connection.to_string(),
            cycle: snap.cycle,
            outcome: snap.outcome,
            stale: snap.stale,
            stale_sections: snap.stale_sections(),
            status: &snap.status,
            dns_queries: stats.map(|s| s.num_dns_queries),
            blocked_queries: stats.map(|s| s.num_blocked_filtering),
        }
    }
}

fn status_detail(view: &StatusView<'_>, snap: &Snapshot, color: bool) -> String {
    let s = view.status;
    let mut lines = vec![
        format!("Version:        {}", view.version.as_deref().unwrap_or("-")),
        format!("Connection:     {}", view.connection),
        format!("Running:        {}", output::flag(s.running, color)),
        format!("Protection:     {}", output::flag(s.protection, color)),
        format!("Filtering:      {}", output::flag(s.filtering, color)),
        format!("Safe browsing:  {}", output::flag(s.safe_browsing, color)),
        format!("Parental:       {}", output::flag(s.parental, color)),
        format!("Safe search:    {}", output::flag(s.safe_search, color)),
    ];
    if let Some(server) = snap.server.get() {
        let addrs = if server.dns_addresses.is_empty() {
            "-".to_owned()
        } else {
            server.dns_addresses.join(", ")
        };
        lines.push(format!("DNS:            {addrs} (port {})", server.dns_port));
        if let Some(ref until) = server.protection_disabled_until {
            lines.push(format!("Paused until:   {until}"));
        }
    }
    if let (Some(total), Some(blocked)) = (view.dns_queries, view.blocked_queries) {
        lines.push(format!("Queries:        {total} ({blocked} blocked)"));
    }
    if view.stale {
        lines.push("Snapshot:       stale (status read failed)".into());
    } else if !view.stale_sections.is_empty() {
        lines.push(format!("Stale:          {}", view.stale_sections.join(", ")));
    }
    lines.join("\n")
}

pub fn status(controller: &Controller, global: &GlobalOpts) {
    let snap = controller.snapshot();
    let connection = controller.connection_state().borrow().clone();
    let view = StatusView::new(&snap, &connection);
    let color = output::should_color(&global.color);

    let out = output::render_single(
        global.output(),
        &view,
        |v| status_detail(v, &snap, color),
        |v| v.status.protection.to_string(),
    );
    output::print_output(&out, global.quiet);
}

// ── Snapshot ────────────────────────────────────────────────────────

pub fn snapshot(controller: &Controller, global: &GlobalOpts) {
    let snap = controller.snapshot();
    let out = output::render_document(global.output(), snap.as_ref());
    output::print_output(&out, global.quiet);
}

// ── Watch ───────────────────────────────────────────────────────────

fn watch_line(snap: &Snapshot, color: bool) -> String {
    let time = chrono::Local::now().format("%H:%M:%S");
    let queries = snap
        .stats
        .get()
        .map_or_else(|| "-".to_owned(), |s| s.num_dns_queries.to_string());
    let mut line = format!(
        "[{time}] cycle {} {}  protection={}  filtering={}  queries={queries}",
        snap.cycle,
        snap.outcome,
        output::flag(snap.status.protection, color),
        output::flag(snap.status.filtering, color),
    );
    let stale = snap.stale_sections();
    if snap.stale {
        line.push_str("  (stale)");
    } else if !stale.is_empty() {
        line.push_str(&format!("  stale: {}", stale.join(",")));
    }
    line
}

fn print_watch(snap: &Snapshot, connection: &ConnectionState, global: &GlobalOpts, color: bool) {
    let out = match global.output() {
        OutputFormat::Table | OutputFormat::Plain => watch_line(snap, color),
        // One document per cycle, compact so consumers can read line by line.
        _ => output::render_document(
            &OutputFormat::JsonCompact,
            &StatusView::new(snap, connection),
        ),
    };
    output::print_output(&out, global.quiet);
}

/// Print a line per published snapshot until Ctrl-C.
pub async fn watch(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut stream = controller.subscribe();
    let mut connection = controller.connection_state();

    let state = connection.borrow().clone();
    print_watch(stream.current(), &state, global, color);

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = connection.borrow_and_update().clone();
                if !global.quiet {
                    eprintln!("connection: {state}");
                }
            }
            snap = stream.changed() => match snap {
                Some(snap) => {
                    let state = connection.borrow().clone();
                    print_watch(&snap, &state, global, color);
                }
                None => break,
            },
        }
    }
    Ok(())
}

// ── Capabilities ────────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct CapabilityRow {
    #[tabled(rename = "Capability")]
    capability: Capability,
    #[tabled(rename = "Since")]
    minimum_version: String,
    #[tabled(rename = "Available")]
    available: bool,
}

pub fn capabilities(controller: &Controller, global: &GlobalOpts) {
    let caps = controller.capabilities();
    let rows: Vec<CapabilityRow> = caps
        .iter()
        .map(|(capability, available)| CapabilityRow {
            capability,
            minimum_version: capability.minimum_version().to_string(),
            available,
        })
        .collect();

    let out = output::render_list(global.output(), &rows, Clone::clone, |r| {
        format!("{}\t{}", r.capability, r.available)
    });
    output::print_output(&out, global.quiet);
}

// ── Diagnostics ─────────────────────────────────────────────────────

pub fn diagnostics(controller: &Controller, global: &GlobalOpts) {
    let doc = controller.diagnostics();
    let out = output::render_document(global.output(), &doc);
    output::print_output(&out, global.quiet);
}

// ── Check host ──────────────────────────────────────────────────────

pub async fn check_host(
    controller: &Controller,
    args: &CheckHostArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = controller
        .check_host(&args.name, args.client.as_deref(), args.qtype.as_deref())
        .await?;

    let out = output::render_single(
        global.output(),
        &result,
        |r| {
            let mut lines = vec![
                format!("Host:     {}", args.name),
                format!("Reason:   {}", r.reason),
            ];
            if let Some(ref service) = r.service_name {
                lines.push(format!("Service:  {service}"));
            }
            if let Some(ref cname) = r.cname {
                lines.push(format!("CNAME:    {cname}"));
            }
            if !r.ip_addrs.is_empty() {
                lines.push(format!("Answer:   {}", r.ip_addrs.join(", ")));
            }
            for rule in &r.rules {
                lines.push(format!("Rule:     {} (list {})", rule.text, rule.filter_list_id));
            }
            lines.join("\n")
        },
        |r| r.reason.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
