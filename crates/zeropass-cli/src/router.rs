//! Command routing logic for CLI

use crate::args::{
    CacheAction, Cli, Commands, IdentityAction, RulesAction, ScenariosAction, SessionAction,
    TemplatesAction,
};
use crate::commands;
use crate::console::CliConsole;
use crate::context::AppContext;
use zeropass_core::ZeroPassConfig;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli, config: ZeroPassConfig, console: &CliConsole) -> anyhow::Result<()> {
    let ctx = AppContext::build(config)?;

    match cli.command {
        Commands::Health { probe } => commands::health::run(&ctx, console, probe).await,

        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(&ctx, console).await,
            RulesAction::Show { id } => commands::rules::show(&ctx, console, &id).await,
            RulesAction::Create(args) => commands::rules::create(&ctx, console, args).await,
            RulesAction::Delete { id } => commands::rules::delete(&ctx, console, &id).await,
            RulesAction::Watch { interval } => {
                commands::rules::watch(&ctx, console, interval).await
            }
        },

        Commands::Simulate(args) => commands::simulate::run(&ctx, console, args).await,

        Commands::Logs { limit, clear } => {
            if clear {
                commands::logs::clear(&ctx, console).await
            } else {
                commands::logs::list(&ctx, console, limit).await
            }
        }

        Commands::Templates { action } => match action {
            TemplatesAction::List => commands::catalog::list_templates(&ctx, console).await,
            TemplatesAction::Apply { template_id, name } => {
                commands::catalog::apply_template(&ctx, console, &template_id, &name).await
            }
        },

        Commands::Scenarios { action } => match action {
            ScenariosAction::List => commands::catalog::list_scenarios(&ctx, console).await,
            ScenariosAction::Test {
                scenario_id,
                rule_set,
            } => commands::catalog::test_scenario(&ctx, console, &scenario_id, &rule_set).await,
        },

        Commands::Identity { action } => match action {
            IdentityAction::Show => commands::identity::show(&ctx, console).await,
            IdentityAction::Reset { purge } => commands::identity::reset(&ctx, console, purge).await,
        },

        Commands::Session { action } => match action {
            SessionAction::Show => commands::identity::show_session(&ctx, console).await,
            SessionAction::Rename { name } => {
                commands::identity::rename_session(&ctx, console, &name).await
            }
        },

        Commands::Cache { action } => match action {
            CacheAction::Stats => commands::cache::stats(&ctx, console).await,
            CacheAction::Clear { pattern } => {
                commands::cache::clear(&ctx, console, pattern.as_deref()).await
            }
        },

        Commands::Recover { force } => commands::recover::run(&ctx, console, force).await,
    }
}
