//! Health and connectivity

use crate::console::CliConsole;
use crate::context::AppContext;
use colored::*;

pub async fn run(ctx: &AppContext, console: &CliConsole, probe: bool) -> anyhow::Result<()> {
    if probe {
        let report = ctx.gateway.probe().await;
        if console.is_json() {
            return console.emit(&report);
        }

        console.header("Connectivity Probe");
        console.field("URL", &report.url);
        console.field(
            "Reachable",
            if report.reachable { "yes".green() } else { "no".red() },
        );
        if let Some(status) = report.status {
            console.field("Status", status);
        }
        console.field("Latency", format!("{}ms", report.latency.as_millis()));
        if let Some(error) = &report.error {
            console.field("Error", error.red());
        }
        return Ok(());
    }

    let health = ctx.gateway.health_check().await?;
    if console.is_json() {
        return console.emit(&health);
    }

    console.header("Backend Health");
    console.field("URL", ctx.gateway.base_url());
    console.field(
        "Status",
        if health.is_healthy() {
            health.status.green()
        } else {
            health.status.yellow()
        },
    );
    if let Some(at) = health.reported_at() {
        console.field("Reported", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(count) = health.rule_sets_count {
        console.field("Rule sets", count);
    }
    if let Some(count) = health.logs_count {
        console.field("Logs", count);
    }
    Ok(())
}
