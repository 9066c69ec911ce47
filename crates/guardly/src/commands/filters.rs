//! Filter list command handlers.

use tabled::Tabled;

use guardly_core::model::{FilterList, FilterListPatch};
use guardly_core::{Command as CoreCommand, CommandResult, Controller};

use crate::cli::{FiltersArgs, FiltersCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FilterRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Rules")]
    rules: u64,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&FilterList> for FilterRow {
    fn from(f: &FilterList) -> Self {
        Self {
            id: f.id,
            name: f.name.clone(),
            kind: if f.allowlist { "allow" } else { "block" },
            enabled: output::yes_no(f.enabled),
            rules: f.rules_count,
            updated: f.last_updated.clone().unwrap_or_else(|| "-".into()),
            url: f.url.clone(),
        }
    }
}

fn side_label(allowlist: bool) -> &'static str {
    if allowlist { "allowlist" } else { "blocklist" }
}

async fn toggle(
    controller: &Controller,
    url: &str,
    allowlist: bool,
    enabled: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = controller
        .execute(CoreCommand::UpdateFilterList {
            url: url.to_owned(),
            allowlist,
            patch: FilterListPatch {
                enabled: Some(enabled),
                ..FilterListPatch::default()
            },
        })
        .await?;
    if let CommandResult::FilterList(list) = result {
        let verb = if enabled { "enabled" } else { "disabled" };
        output::print_written(
            global.output(),
            &list,
            &format!("Filter list '{}' {verb}", list.name),
            global.quiet,
        );
    }
    Ok(())
}

pub async fn handle(
    controller: &Controller,
    args: &FiltersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match &args.command {
        FiltersCommand::List => {
            let snap = controller.snapshot();
            let lists: Vec<FilterList> = snap
                .filtering
                .get()
                .map(|status| status.lists().cloned().collect())
                .unwrap_or_default();
            let out = output::render_list(global.output(), &lists, |x| FilterRow::from(x), |f| {
                f.url.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FiltersCommand::Add { url, name, side } => {
            controller
                .execute(CoreCommand::AddFilterList {
                    name: name.clone(),
                    url: url.clone(),
                    allowlist: side.allowlist,
                })
                .await?;
            output::print_done(
                &format!("Added '{name}' to the {}", side_label(side.allowlist)),
                global.quiet,
            );
            Ok(())
        }

        FiltersCommand::Remove { url, side } => {
            controller
                .execute(CoreCommand::RemoveFilterList {
                    url: url.clone(),
                    allowlist: side.allowlist,
                })
                .await?;
            output::print_done(
                &format!("Removed {url} from the {}", side_label(side.allowlist)),
                global.quiet,
            );
            Ok(())
        }

        FiltersCommand::Enable { url, side } => {
            toggle(controller, url, side.allowlist, true, global).await
        }

        FiltersCommand::Disable { url, side } => {
            toggle(controller, url, side.allowlist, false, global).await
        }

        FiltersCommand::Refresh { side } => {
            controller
                .execute(CoreCommand::RefreshFilters {
                    allowlist: side.allowlist,
                })
                .await?;
            output::print_done(
                &format!("Refresh of the {} requested", side_label(side.allowlist)),
                global.quiet,
            );
            Ok(())
        }

        FiltersCommand::Set { state, interval } => {
            let enabled = state.enabled();
            controller
                .execute(CoreCommand::SetFiltering {
                    enabled,
                    interval: *interval,
                })
                .await?;
            let verb = if enabled { "enabled" } else { "disabled" };
            output::print_done(&format!("Filtering {verb}"), global.quiet);
            Ok(())
        }
    }
}
