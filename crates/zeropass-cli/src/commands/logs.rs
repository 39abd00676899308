//! Evaluation log commands

use crate::console::CliConsole;
use crate::context::AppContext;
use colored::*;
use zeropass_core::Decision;

pub async fn list(ctx: &AppContext, console: &CliConsole, limit: Option<usize>) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(ctx.config.logs_limit);
    let logs = ctx.gateway.get_logs(limit).await;

    if console.is_json() {
        return console.emit(&logs);
    }
    if logs.is_empty() {
        println!("{}", "No evaluation logs".dimmed());
        return Ok(());
    }

    for log in &logs {
        let decision = match log.result.decision {
            Decision::Allowed => "ALLOWED".green(),
            Decision::Blocked => "BLOCKED".red(),
        };
        println!(
            "{}  {:<7}  {:<15}  {:<20}  {}",
            log.timestamp.dimmed(),
            decision,
            log.client_ip,
            log.rule_set_id,
            log.result.reason
        );
    }
    Ok(())
}

pub async fn clear(ctx: &AppContext, console: &CliConsole) -> anyhow::Result<()> {
    let receipt = ctx.gateway.clear_logs().await?;
    if console.is_json() {
        return console.emit(&receipt);
    }
    console.success(receipt.message.as_deref().unwrap_or("Evaluation logs cleared"));
    Ok(())
}
