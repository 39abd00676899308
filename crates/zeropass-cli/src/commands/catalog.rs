//! Templates and exploit scenarios

use crate::console::CliConsole;
use crate::context::AppContext;
use colored::*;

pub async fn list_templates(ctx: &AppContext, console: &CliConsole) -> anyhow::Result<()> {
    let templates = ctx.gateway.get_templates().await;
    if console.is_json() {
        return console.emit(&templates);
    }
    if templates.is_empty() {
        println!("{}", "No templates".dimmed());
    }
    for template in &templates {
        println!(
            "{:<20} {:<28} {}",
            template.id.bold(),
            template.name,
            template.description.as_deref().unwrap_or_default().dimmed()
        );
    }
    Ok(())
}

pub async fn apply_template(
    ctx: &AppContext,
    console: &CliConsole,
    template_id: &str,
    name: &str,
) -> anyhow::Result<()> {
    let receipt = ctx.gateway.apply_template(template_id, name).await?;
    if console.is_json() {
        return console.emit(&receipt);
    }
    match receipt.rule_set_id.as_deref() {
        Some(id) => console.success(&format!("Created rule set {} from {}", id.bold(), template_id)),
        None => console.success(&format!("Applied template {}", template_id)),
    }
    Ok(())
}

pub async fn list_scenarios(ctx: &AppContext, console: &CliConsole) -> anyhow::Result<()> {
    let scenarios = ctx.gateway.get_scenarios().await;
    if console.is_json() {
        return console.emit(&scenarios);
    }
    if scenarios.is_empty() {
        println!("{}", "No scenarios".dimmed());
    }
    for scenario in &scenarios {
        println!(
            "{:<20} {:<12} {}",
            scenario.id.bold(),
            scenario.category.as_deref().unwrap_or("-"),
            scenario.name
        );
    }
    Ok(())
}

pub async fn test_scenario(
    ctx: &AppContext,
    console: &CliConsole,
    scenario_id: &str,
    rule_set_id: &str,
) -> anyhow::Result<()> {
    let result = ctx.gateway.test_scenario(scenario_id, rule_set_id).await?;
    if console.is_json() {
        return console.emit(&result);
    }

    console.header(&format!("Scenario {} against {}", scenario_id, rule_set_id));
    match result.passed {
        Some(true) => console.field("Result", "passed".green()),
        Some(false) => console.field("Result", "failed".red()),
        None => console.field("Result", "unknown".yellow()),
    }
    for (key, value) in &result.extra {
        match value {
            serde_json::Value::String(s) => console.field(key, s),
            other => console.field(key, other),
        }
    }
    Ok(())
}
