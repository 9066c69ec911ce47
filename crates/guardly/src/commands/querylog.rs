//! Statistics and query log handlers.

use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;

use guardly_core::model::{QueryLogConfigPatch, QueryLogEntry, QueryLogParams, StatsConfigPatch};
use guardly_core::{Command as CoreCommand, Controller, Snapshot, TopEntry};

use crate::cli::{GlobalOpts, QuerylogArgs, QuerylogCommand, RetentionArgs, StatsArgs, StatsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Stats ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatsView<'a> {
    dns_queries: u64,
    blocked_filtering: u64,
    replaced_safebrowsing: u64,
    replaced_parental: u64,
    avg_processing_time: f64,
    top_queried: &'a [TopEntry],
    top_blocked: &'a [TopEntry],
    top_clients: &'a [TopEntry],
}

fn top_block(title: &str, entries: &[TopEntry]) -> String {
    if entries.is_empty() {
        return format!("{title}: -");
    }
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut lines = vec![format!("{title}:")];
    lines.extend(
        entries
            .iter()
            .map(|e| format!("  {:<width$}  {}", e.name, e.count)),
    );
    lines.join("\n")
}

fn stats_detail(v: &StatsView<'_>) -> String {
    [
        format!("Queries:        {}", v.dns_queries),
        format!("Blocked:        {}", v.blocked_filtering),
        format!("Safe browsing:  {}", v.replaced_safebrowsing),
        format!("Parental:       {}", v.replaced_parental),
        format!("Avg. time:      {:.1} ms", v.avg_processing_time * 1000.0),
        String::new(),
        top_block("Top queried", v.top_queried),
        top_block("Top blocked", v.top_blocked),
        top_block("Top clients", v.top_clients),
    ]
    .join("\n")
}

fn stats_view(snap: &Snapshot) -> StatsView<'_> {
    let stats = snap.stats.get();
    StatsView {
        dns_queries: stats.map_or(0, |s| s.num_dns_queries),
        blocked_filtering: stats.map_or(0, |s| s.num_blocked_filtering),
        replaced_safebrowsing: stats.map_or(0, |s| s.num_replaced_safebrowsing),
        replaced_parental: stats.map_or(0, |s| s.num_replaced_parental),
        avg_processing_time: stats.map_or(0.0, |s| s.avg_processing_time),
        top_queried: &snap.top_queried,
        top_blocked: &snap.top_blocked,
        top_clients: &snap.top_clients,
    }
}

fn retention_ms(interval: Option<&humantime::Duration>) -> Result<Option<u64>, CliError> {
    interval
        .map(|d| {
            let d: Duration = **d;
            u64::try_from(d.as_millis()).map_err(|_| CliError::Validation {
                field: "interval".into(),
                reason: "retention period is too long".into(),
            })
        })
        .transpose()
}

fn stats_patch(args: &RetentionArgs) -> Result<StatsConfigPatch, CliError> {
    Ok(StatsConfigPatch {
        enabled: args.enabled,
        interval: retention_ms(args.interval.as_ref())?,
        ignored: (!args.ignored.is_empty()).then(|| args.ignored.clone()),
    })
}

pub async fn stats(
    controller: &Controller,
    args: &StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match &args.command {
        StatsCommand::Show => {
            let snap = controller.snapshot();
            let view = stats_view(&snap);
            let out = output::render_single(global.output(), &view, stats_detail, |v| {
                v.dns_queries.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StatsCommand::Reset => {
            if !util::confirm("Reset all statistics?", "stats reset", global.yes)? {
                return Ok(());
            }
            controller.execute(CoreCommand::ResetStats).await?;
            output::print_done("Statistics reset", global.quiet);
            Ok(())
        }

        StatsCommand::Config(retention) => {
            controller
                .execute(CoreCommand::UpdateStatsConfig(stats_patch(retention)?))
                .await?;
            output::print_done("Statistics settings updated", global.quiet);
            Ok(())
        }
    }
}

// ── Query log ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct QueryRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Type")]
    qtype: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "ms")]
    elapsed: String,
}

impl From<&QueryLogEntry> for QueryRow {
    fn from(e: &QueryLogEntry) -> Self {
        Self {
            time: e.time.clone(),
            client: e.client.clone(),
            domain: e.question.name.clone(),
            qtype: e.question.qtype.clone(),
            reason: e.reason.clone(),
            elapsed: e.elapsed_ms.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

pub async fn querylog(
    controller: &Controller,
    args: &QuerylogArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match &args.command {
        QuerylogCommand::Show {
            limit,
            offset,
            search,
            status,
        } => {
            let page = controller
                .query_log(QueryLogParams {
                    limit: *limit,
                    offset: *offset,
                    search: search.clone(),
                    response_status: status.clone(),
                })
                .await?;
            let out = output::render_list(global.output(), &page.data, |x| QueryRow::from(x), |e| {
                e.question.name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        QuerylogCommand::Clear => {
            if !util::confirm("Delete the whole query log?", "querylog clear", global.yes)? {
                return Ok(());
            }
            controller.execute(CoreCommand::ClearQueryLog).await?;
            output::print_done("Query log cleared", global.quiet);
            Ok(())
        }

        QuerylogCommand::Config {
            retention,
            anonymize_client_ip,
        } => {
            let stats = stats_patch(retention)?;
            let patch = QueryLogConfigPatch {
                enabled: stats.enabled,
                interval: stats.interval,
                anonymize_client_ip: *anonymize_client_ip,
                ignored: stats.ignored,
            };
            controller
                .execute(CoreCommand::UpdateQueryLogConfig(patch))
                .await?;
            output::print_done("Query log settings updated", global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_is_sent_in_milliseconds() {
        let day: humantime::Duration = "24h".parse().expect("duration");
        assert_eq!(retention_ms(Some(&day)).expect("fits"), Some(86_400_000));
        assert_eq!(retention_ms(None).expect("fits"), None);
    }

    #[test]
    fn top_block_aligns_names() {
        let entries = vec![
            TopEntry {
                name: "big.example".into(),
                count: 90,
            },
            TopEntry {
                name: "a.example".into(),
                count: 40,
            },
        ];
        assert_eq!(
            top_block("Top queried", &entries),
            "Top queried:\n  big.example  90\n  a.example    40"
        );
        assert_eq!(top_block("Top clients", &[]), "Top clients: -");
    }
}
