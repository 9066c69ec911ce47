//! Protection toggles: global protection, safe browsing, parental
//! control and safe search.

use guardly_core::model::SafeSearchPatch;
use guardly_core::{Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, ProtectionArgs, ProtectionCommand, SafeSearchArgs, SearchEngine, ToggleArgs};
use crate::error::CliError;
use crate::output;

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

pub async fn protection(
    controller: &Controller,
    args: &ProtectionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (enabled, pause) = match &args.command {
        ProtectionCommand::On => (true, None),
        ProtectionCommand::Off => (false, None),
        ProtectionCommand::Pause { duration } => (false, Some(**duration)),
    };
    controller
        .execute(CoreCommand::SetProtection { enabled, pause })
        .await?;

    let message = match &args.command {
        ProtectionCommand::Pause { duration } => format!("Protection paused for {duration}"),
        _ => format!("Protection {}", on_off(enabled)),
    };
    output::print_done(&message, global.quiet);
    Ok(())
}

pub async fn safe_browsing(
    controller: &Controller,
    args: &ToggleArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let enabled = args.state.enabled();
    controller
        .execute(CoreCommand::SetSafeBrowsing { enabled })
        .await?;
    output::print_done(&format!("Safe browsing {}", on_off(enabled)), global.quiet);
    Ok(())
}

pub async fn parental(
    controller: &Controller,
    args: &ToggleArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let enabled = args.state.enabled();
    controller
        .execute(CoreCommand::SetParental { enabled })
        .await?;
    output::print_done(&format!("Parental control {}", on_off(enabled)), global.quiet);
    Ok(())
}

/// Overlay that flips only the named engines.
fn engine_patch(engines: &[SearchEngine], enabled: bool) -> SafeSearchPatch {
    let mut patch = SafeSearchPatch::default();
    for engine in engines {
        let slot = match engine {
            SearchEngine::Bing => &mut patch.bing,
            SearchEngine::Duckduckgo => &mut patch.duckduckgo,
            SearchEngine::Ecosia => &mut patch.ecosia,
            SearchEngine::Google => &mut patch.google,
            SearchEngine::Pixabay => &mut patch.pixabay,
            SearchEngine::Yandex => &mut patch.yandex,
            SearchEngine::Youtube => &mut patch.youtube,
        };
        *slot = Some(enabled);
    }
    patch
}

pub async fn safe_search(
    controller: &Controller,
    args: &SafeSearchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let enabled = args.state.enabled();
    if args.engines.is_empty() {
        controller
            .execute(CoreCommand::SetSafeSearch { enabled })
            .await?;
        output::print_done(&format!("Safe search {}", on_off(enabled)), global.quiet);
    } else {
        controller
            .execute(CoreCommand::UpdateSafeSearch(engine_patch(&args.engines, enabled)))
            .await?;
        output::print_done(
            &format!("Safe search {} for {} engine(s)", on_off(enabled), args.engines.len()),
            global.quiet,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_patch_touches_only_named_engines() {
        let patch = engine_patch(&[SearchEngine::Youtube, SearchEngine::Ecosia], false);
        assert_eq!(patch.youtube, Some(false));
        assert_eq!(patch.ecosia, Some(false));
        assert_eq!(patch.enabled, None);
        assert_eq!(patch.google, None);
    }
}
