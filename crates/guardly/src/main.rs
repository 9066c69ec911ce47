mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use guardly_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet, cli.global.log_json);

    if let Err(err) = run(&mut cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool, json: bool) {
    let level = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: &mut Cli) -> Result<(), CliError> {
    // Config and completions never touch the server.
    match &cli.command {
        Command::Config(args) => return commands::config_cmd::handle(args, &cli.global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "guardly", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let file_config = config::load_config()?;
    if cli.global.output.is_none() {
        cli.global.output = config::default_output(&file_config);
    }
    let mut controller_config = config::build_controller_config(&cli.global, &file_config)?;

    // Only `watch` keeps polling in the background.
    match &cli.command {
        Command::Watch(args) => {
            if let Some(interval) = &args.interval {
                controller_config.poll_interval = **interval;
            }
            if controller_config.poll_interval.is_zero() {
                controller_config.poll_interval = Duration::from_secs(1);
            }
        }
        _ => controller_config.poll_interval = Duration::ZERO,
    }

    let controller = Controller::new(controller_config);
    controller.connect().await?;

    tracing::debug!(command = ?cli.command, "dispatching command");
    let result = commands::dispatch(&cli.command, &controller, &cli.global).await;
    controller.disconnect().await;
    result
}
