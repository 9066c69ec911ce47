//! DNS rewrite command handlers.

use tabled::Tabled;

use guardly_core::model::RewriteRule;
use guardly_core::{Command as CoreCommand, CommandResult, Controller};

use crate::cli::{GlobalOpts, RewriteTarget, RewritesArgs, RewritesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct RewriteRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Answer")]
    answer: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl From<&RewriteRule> for RewriteRow {
    fn from(r: &RewriteRule) -> Self {
        Self {
            domain: r.domain.clone(),
            answer: r.answer.clone(),
            // Servers without the flag treat every rule as active.
            enabled: output::yes_no(r.enabled.unwrap_or(true)),
        }
    }
}

async fn set_enabled(
    controller: &Controller,
    target: &RewriteTarget,
    enabled: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = controller
        .execute(CoreCommand::SetRewriteEnabled {
            domain: target.domain.clone(),
            answer: target.answer.clone(),
            enabled,
        })
        .await?;
    if let CommandResult::Rewrite(rule) = result {
        let verb = if enabled { "enabled" } else { "disabled" };
        output::print_written(
            global.output(),
            &rule,
            &format!("Rewrite {} -> {} {verb}", rule.domain, rule.answer),
            global.quiet,
        );
    }
    Ok(())
}

pub async fn handle(
    controller: &Controller,
    args: &RewritesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match &args.command {
        RewritesCommand::List => {
            let snap = controller.snapshot();
            let rules = snap.rewrites.get().map_or(&[][..], Vec::as_slice);
            let out = output::render_list(global.output(), rules, |x| RewriteRow::from(x), |r| {
                format!("{}\t{}", r.domain, r.answer)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RewritesCommand::Add(target) => {
            let result = controller
                .execute(CoreCommand::AddRewrite {
                    domain: target.domain.clone(),
                    answer: target.answer.clone(),
                })
                .await?;
            if let CommandResult::Rewrite(rule) = result {
                output::print_written(
                    global.output(),
                    &rule,
                    &format!("Rewrite {} -> {} added", rule.domain, rule.answer),
                    global.quiet,
                );
            }
            Ok(())
        }

        RewritesCommand::Remove(target) => {
            controller
                .execute(CoreCommand::RemoveRewrite {
                    domain: target.domain.clone(),
                    answer: target.answer.clone(),
                })
                .await?;
            output::print_done(
                &format!("Rewrite {} -> {} removed", target.domain, target.answer),
                global.quiet,
            );
            Ok(())
        }

        RewritesCommand::Enable(target) => set_enabled(controller, target, true, global).await,
        RewritesCommand::Disable(target) => set_enabled(controller, target, false, global).await,
    }
}
