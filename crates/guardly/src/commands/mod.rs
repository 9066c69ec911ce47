//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod blocked;
pub mod clients;
pub mod config_cmd;
pub mod filters;
pub mod network;
pub mod protection;
pub mod querylog;
pub mod rewrites;
pub mod server;
pub mod util;

use guardly_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: &Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => {
            server::status(controller, global);
            Ok(())
        }
        Command::Snapshot => {
            server::snapshot(controller, global);
            Ok(())
        }
        Command::Watch(_) => server::watch(controller, global).await,
        Command::Capabilities => {
            server::capabilities(controller, global);
            Ok(())
        }
        Command::Diagnostics => {
            server::diagnostics(controller, global);
            Ok(())
        }
        Command::CheckHost(args) => server::check_host(controller, args, global).await,
        Command::Protection(args) => protection::protection(controller, args, global).await,
        Command::SafeBrowsing(args) => protection::safe_browsing(controller, args, global).await,
        Command::Parental(args) => protection::parental(controller, args, global).await,
        Command::SafeSearch(args) => protection::safe_search(controller, args, global).await,
        Command::Clients(args) => clients::handle(controller, args, global).await,
        Command::Filters(args) => filters::handle(controller, args, global).await,
        Command::Blocked(args) => blocked::handle(controller, args, global).await,
        Command::Rewrites(args) => rewrites::handle(controller, args, global).await,
        Command::Dns(args) => network::dns(controller, args, global).await,
        Command::Dhcp(args) => {
            network::dhcp(controller, args, global);
            Ok(())
        }
        Command::Stats(args) => querylog::stats(controller, args, global).await,
        Command::Querylog(args) => querylog::querylog(controller, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before connecting".into(),
        }),
    }
}
