//! Blocked service command handlers.

use serde::Serialize;
use tabled::Tabled;

use guardly_core::model::{BlockableService, BlockedServicesSet, Schedule, ServiceSet};
use guardly_core::{Command as CoreCommand, CommandResult, Controller};

use crate::cli::{BlockedArgs, BlockedCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Clone, Serialize, Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Blocked")]
    blocked: String,
}

fn schedule_summary(schedule: Option<&Schedule>) -> String {
    let Some(schedule) = schedule else {
        return "always".into();
    };
    let days = [
        ("mon", schedule.mon.as_ref()),
        ("tue", schedule.tue.as_ref()),
        ("wed", schedule.wed.as_ref()),
        ("thu", schedule.thu.as_ref()),
        ("fri", schedule.fri.as_ref()),
        ("sat", schedule.sat.as_ref()),
        ("sun", schedule.sun.as_ref()),
    ];
    let windows: Vec<String> = days
        .into_iter()
        .filter_map(|(day, range)| {
            range.map(|r| format!("{day} {}-{}", clock(r.start), clock(r.end)))
        })
        .collect();
    let zone = schedule.time_zone.as_deref().unwrap_or("Local");
    if windows.is_empty() {
        format!("always ({zone})")
    } else {
        format!("paused {} ({zone})", windows.join(", "))
    }
}

/// Milliseconds since midnight as `HH:MM`.
fn clock(ms: u64) -> String {
    let minutes = ms / 60_000;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn global_detail(set: &BlockedServicesSet, catalog: &[BlockableService]) -> String {
    let names: Vec<String> = set
        .ids
        .iter()
        .map(|id| {
            catalog
                .iter()
                .find(|s| &s.id == id)
                .map_or_else(|| id.clone(), |s| format!("{} ({id})", s.name))
        })
        .collect();
    [
        format!("Services: {}", util::join_or_dash(&names)),
        format!("Schedule: {}", schedule_summary(set.schedule.as_ref())),
    ]
    .join("\n")
}

fn report_set(result: &CommandResult, message: &str, global: &GlobalOpts) {
    if let CommandResult::BlockedServices(set) = result {
        output::print_written(global.output(), &set, message, global.quiet);
    }
}

pub async fn handle(
    controller: &Controller,
    args: &BlockedArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match &args.command {
        BlockedCommand::Global => {
            let snap = controller.snapshot();
            let set = snap.blocked_services.get().cloned().unwrap_or_default();
            let out = output::render_single(
                global.output(),
                &set,
                |s| global_detail(s, &snap.catalog),
                |s| s.ids.iter().cloned().collect::<Vec<_>>().join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BlockedCommand::Set {
            services,
            schedule_file,
        } => {
            let schedule: Option<Schedule> = schedule_file
                .as_deref()
                .map(|path| util::read_json_file(path, "schedule-file"))
                .transpose()?;
            if schedule.is_none() && !global.quiet {
                eprintln!("note: no --schedule-file given; any existing schedule is cleared");
            }
            let services: ServiceSet = services.iter().cloned().collect();
            let count = services.len();
            let result = controller
                .execute(CoreCommand::SetBlockedServices { services, schedule })
                .await?;
            report_set(&result, &format!("{count} service(s) blocked globally"), global);
            Ok(())
        }

        BlockedCommand::Block { id } => {
            let result = controller
                .execute(CoreCommand::BlockService { id: id.clone() })
                .await?;
            report_set(&result, &format!("Blocked '{id}'"), global);
            Ok(())
        }

        BlockedCommand::Unblock { id } => {
            let result = controller
                .execute(CoreCommand::UnblockService { id: id.clone() })
                .await?;
            report_set(&result, &format!("Unblocked '{id}'"), global);
            Ok(())
        }

        BlockedCommand::Catalog => {
            let snap = controller.snapshot();
            let blocked = snap.blocked_services.get();
            let rows: Vec<ServiceRow> = snap
                .catalog
                .iter()
                .map(|s| ServiceRow {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    group: s.group_id.clone(),
                    blocked: output::yes_no(blocked.is_some_and(|b| b.ids.contains(&s.id))),
                })
                .collect();
            let out =
                output::render_list(global.output(), &rows, Clone::clone, |r| r.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use guardly_core::model::DayRange;

    use super::*;

    #[test]
    fn schedule_summary_lists_paused_windows() {
        let schedule = Schedule {
            time_zone: Some("Europe/Berlin".into()),
            mon: Some(DayRange {
                start: 8 * 3_600_000,
                end: 15 * 3_600_000 + 30 * 60_000,
            }),
            ..Schedule::default()
        };
        assert_eq!(
            schedule_summary(Some(&schedule)),
            "paused mon 08:00-15:30 (Europe/Berlin)"
        );
        assert_eq!(schedule_summary(None), "always");
    }

    #[test]
    fn detail_names_services_from_catalog() {
        let set = BlockedServicesSet {
            ids: ["tiktok".to_owned(), "custom".to_owned()].into_iter().collect(),
            schedule: None,
        };
        let catalog = vec![BlockableService {
            id: "tiktok".into(),
            name: "TikTok".into(),
            group_id: "social_network".into(),
        }];
        let detail = global_detail(&set, &catalog);
        assert!(detail.contains("TikTok (tiktok), custom"), "{detail}");
    }
}
