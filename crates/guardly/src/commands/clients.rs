//! Persistent client command handlers.

use tabled::Tabled;

use guardly_core::model::{ClientConfig, ClientPatch, Schedule};
use guardly_core::{Command as CoreCommand, CommandResult, Controller};

use crate::cli::{ClientUpdateArgs, ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IDs")]
    ids: String,
    #[tabled(rename = "Global settings")]
    global_settings: String,
    #[tabled(rename = "Blocked services")]
    blocked: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&ClientConfig> for ClientRow {
    fn from(c: &ClientConfig) -> Self {
        let blocked = if c.use_global_blocked_services.unwrap_or(true) {
            "(global)".to_owned()
        } else {
            util::join_or_dash(c.blocked_services.as_deref().unwrap_or_default())
        };
        Self {
            name: c.name.clone(),
            ids: util::join_or_dash(&c.ids),
            global_settings: output::yes_no(c.use_global_settings.unwrap_or(true)),
            blocked,
            tags: util::join_or_dash(c.tags.as_deref().unwrap_or_default()),
        }
    }
}

fn opt_flag(value: Option<bool>) -> String {
    value.map_or_else(|| "-".into(), output::yes_no)
}

fn detail(c: &ClientConfig) -> String {
    let mut lines = vec![
        format!("Name:            {}", c.name),
        format!("IDs:             {}", util::join_or_dash(&c.ids)),
        format!("Global settings: {}", opt_flag(c.use_global_settings)),
        format!("Filtering:       {}", opt_flag(c.filtering_enabled)),
        format!("Parental:        {}", opt_flag(c.parental_enabled)),
        format!("Safe browsing:   {}", opt_flag(c.safebrowsing_enabled)),
        format!("Safe search:     {}", opt_flag(c.safesearch_enabled)),
    ];
    if c.use_global_blocked_services.unwrap_or(true) {
        lines.push("Blocked:         (global)".into());
    } else {
        lines.push(format!(
            "Blocked:         {}",
            util::join_or_dash(c.blocked_services.as_deref().unwrap_or_default())
        ));
    }
    if let Some(ref schedule) = c.blocked_services_schedule {
        lines.push(format!(
            "Schedule:        {}",
            schedule.time_zone.as_deref().unwrap_or("Local")
        ));
    }
    if let Some(ref upstreams) = c.upstreams {
        lines.push(format!("Upstreams:       {}", util::join_or_dash(upstreams)));
    }
    if let Some(ref tags) = c.tags {
        lines.push(format!("Tags:            {}", util::join_or_dash(tags)));
    }
    lines.join("\n")
}

fn update_patch(args: &ClientUpdateArgs) -> ClientPatch {
    let non_empty = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());
    ClientPatch {
        name: args.rename.clone(),
        ids: non_empty(&args.ids),
        use_global_settings: args.use_global_settings,
        filtering_enabled: args.filtering,
        parental_enabled: args.parental,
        safebrowsing_enabled: args.safe_browsing,
        safesearch_enabled: args.safe_search,
        use_global_blocked_services: args.use_global_blocked_services,
        upstreams: non_empty(&args.upstreams),
        ignore_querylog: args.ignore_querylog,
        ignore_statistics: args.ignore_statistics,
        tags: non_empty(&args.tags),
        ..ClientPatch::default()
    }
}

fn written_client(result: CommandResult) -> Option<Box<ClientConfig>> {
    match result {
        CommandResult::Client(client) => Some(client),
        _ => None,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: &ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match &args.command {
        ClientsCommand::List => {
            let snap = controller.snapshot();
            let clients = snap.clients.get().map_or(&[][..], Vec::as_slice);
            let out = output::render_list(
                global.output(),
                clients,
                |x| ClientRow::from(x),
                |c| c.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Show { name } => {
            let snap = controller.snapshot();
            let client = snap.client(name).ok_or_else(|| CliError::NotFound {
                resource_type: "client".into(),
                identifier: name.clone(),
                list_command: "clients list".into(),
            })?;
            let out = output::render_single(global.output(), client, detail, |c| c.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Search { ids } => {
            let hits = controller.search_clients(ids).await?;
            let out = output::render_document(global.output(), &hits);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Add {
            name,
            ids,
            tags,
            from_file,
        } => {
            let mut client: ClientConfig = match from_file {
                Some(path) => util::read_json_file(path, "from-file")?,
                None => ClientConfig {
                    ids: ids.clone(),
                    tags: (!tags.is_empty()).then(|| tags.clone()),
                    use_global_settings: Some(true),
                    use_global_blocked_services: Some(true),
                    ..ClientConfig::default()
                },
            };
            client.name.clone_from(name);

            let result = controller
                .execute(CoreCommand::AddClient(Box::new(client)))
                .await?;
            if let Some(client) = written_client(result) {
                output::print_written(
                    global.output(),
                    client.as_ref(),
                    &format!("Client '{name}' added"),
                    global.quiet,
                );
            }
            Ok(())
        }

        ClientsCommand::Remove { name } => {
            if !util::confirm(
                &format!("Remove client '{name}'?"),
                "clients remove",
                global.yes,
            )? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteClient { name: name.clone() })
                .await?;
            output::print_done(&format!("Client '{name}' removed"), global.quiet);
            Ok(())
        }

        ClientsCommand::Update(update) => {
            let patch = update_patch(update);
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass at least one field flag".into(),
                });
            }
            let result = controller
                .execute(CoreCommand::UpdateClient {
                    name: update.name.clone(),
                    patch: Box::new(patch),
                })
                .await?;
            if let Some(client) = written_client(result) {
                output::print_written(
                    global.output(),
                    client.as_ref(),
                    &format!("Client '{}' updated", client.name),
                    global.quiet,
                );
            }
            Ok(())
        }

        ClientsCommand::SetBlockedServices {
            name,
            services,
            schedule_file,
        } => {
            let schedule: Option<Schedule> = schedule_file
                .as_deref()
                .map(|path| util::read_json_file(path, "schedule-file"))
                .transpose()?;
            let result = controller
                .execute(CoreCommand::SetClientBlockedServices {
                    name: name.clone(),
                    services: services.clone(),
                    schedule,
                })
                .await?;
            if let Some(client) = written_client(result) {
                output::print_written(
                    global.output(),
                    client.as_ref(),
                    &format!("Client '{name}' now blocks {} service(s)", services.len()),
                    global.quiet,
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn parse_update(args: &[&str]) -> ClientUpdateArgs {
        let mut argv = vec!["guardly", "clients", "update", "kid-tablet"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).expect("parses").command {
            Command::Clients(ClientsArgs {
                command: ClientsCommand::Update(update),
            }) => update,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn update_patch_touches_only_given_flags() {
        let patch = update_patch(&parse_update(&["--parental", "true", "--tag", "device_tablet"]));
        assert_eq!(patch.parental_enabled, Some(true));
        assert_eq!(patch.tags, Some(vec!["device_tablet".to_owned()]));
        assert_eq!(patch.ids, None);
        assert_eq!(patch.blocked_services_schedule, None);
        assert_eq!(patch.filtering_enabled, None);
    }

    #[test]
    fn update_without_flags_is_empty() {
        assert!(update_patch(&parse_update(&[])).is_empty());
    }

    #[test]
    fn row_shows_global_blocking() {
        let client = ClientConfig {
            name: "tv".into(),
            ids: vec!["192.168.1.60".into()],
            ..ClientConfig::default()
        };
        let row = ClientRow::from(&client);
        assert_eq!(row.blocked, "(global)");
        assert_eq!(row.tags, "-");
    }
}
