//! Rule set commands

use crate::args::CreateRuleArgs;
use crate::console::CliConsole;
use crate::context::AppContext;
use anyhow::Context;
use colored::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zeropass_core::{Action, IpRule, RateLimitRule, RuleSet, RuleSetPoller};

pub async fn list(ctx: &AppContext, console: &CliConsole) -> anyhow::Result<()> {
    let rule_sets = ctx.gateway.get_rule_sets().await;
    if console.is_json() {
        return console.emit(&rule_sets);
    }
    print_table(&rule_sets);
    Ok(())
}

pub async fn show(ctx: &AppContext, console: &CliConsole, id: &str) -> anyhow::Result<()> {
    let rule_set = ctx.gateway.get_rule_set(id).await?;
    if console.is_json() {
        return console.emit(&rule_set);
    }

    console.header(&rule_set.name);
    console.field("ID", &rule_set.id);
    if let Some(description) = &rule_set.description {
        console.field("Description", description);
    }
    console.field("Default", action_label(rule_set.default_action));
    if let Some(ip) = &rule_set.ip_rules {
        console.field(
            "IP rule",
            format!("{} {}", action_label(ip.rule_type), ip.cidrs.join(", ")),
        );
    }
    if let Some(rate) = &rule_set.rate_limiting {
        console.field(
            "Rate limit",
            format!("{} req / {}s", rate.requests_per_window, rate.window_seconds),
        );
    }
    if let Some(jwt) = &rule_set.jwt_validation {
        console.field("JWT", if jwt.enabled { "required" } else { "disabled" });
    }
    if let Some(oauth) = &rule_set.oauth2_validation {
        console.field("OAuth2 scopes", oauth.required_scopes.join(", "));
    }
    console.field("Header rules", rule_set.header_rules.len());
    console.field("Path rules", rule_set.path_rules.len());
    Ok(())
}

pub async fn create(ctx: &AppContext, console: &CliConsole, args: CreateRuleArgs) -> anyhow::Result<()> {
    let replace = args.replace;
    let rule_set = build_rule_set(args)?;

    let receipt = if replace {
        ctx.gateway.update_rule_set(&rule_set).await?
    } else {
        ctx.gateway.create_rule_set(&rule_set).await?
    };

    if console.is_json() {
        return console.emit(&receipt);
    }
    console.success(&format!(
        "Saved rule set {}",
        receipt.rule_set_id.as_deref().unwrap_or(&rule_set.id).bold()
    ));
    Ok(())
}

pub async fn delete(ctx: &AppContext, console: &CliConsole, id: &str) -> anyhow::Result<()> {
    let receipt = ctx.gateway.delete_rule_set(id).await?;
    if console.is_json() {
        return console.emit(&receipt);
    }
    console.success(
        receipt
            .message
            .as_deref()
            .unwrap_or(&format!("Rule set {} deleted", id)),
    );
    Ok(())
}

pub async fn watch(ctx: &AppContext, console: &CliConsole, interval: Option<u64>) -> anyhow::Result<()> {
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or(ctx.config.poll_interval)
        .max(Duration::from_secs(1));

    let cancel = CancellationToken::new();
    let poller = RuleSetPoller::spawn(ctx.gateway.clone(), interval, cancel.clone());
    let mut updates = poller.subscribe();

    if !console.is_json() {
        println!(
            "{}",
            format!("Watching rule sets every {}s, Ctrl-C to stop", interval.as_secs()).dimmed()
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let rule_sets = updates.borrow_and_update().clone();
                if console.is_json() {
                    println!("{}", serde_json::to_string(&rule_sets)?);
                } else {
                    println!();
                    println!("{}", chrono::Local::now().format("%H:%M:%S").to_string().dimmed());
                    print_table(&rule_sets);
                }
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

fn build_rule_set(args: CreateRuleArgs) -> anyhow::Result<RuleSet> {
    if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut rule_set: RuleSet = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a valid rule set", path.display()))?;
        if let Some(id) = args.id {
            rule_set.id = id;
        }
        return Ok(rule_set);
    }

    let id = args
        .id
        .unwrap_or_else(|| format!("rs-{}", chrono::Utc::now().timestamp_millis()));
    let name = args.name.unwrap_or_else(|| id.clone());

    let mut rule_set = RuleSet::new(id, name, args.default_action.into());
    rule_set.description = args.description;
    if !args.cidr.is_empty() {
        rule_set.ip_rules = Some(IpRule {
            rule_type: args.ip_action.into(),
            cidrs: args.cidr,
        });
    }
    if let Some(requests) = args.rate_limit {
        rule_set.rate_limiting = Some(RateLimitRule {
            enabled: true,
            requests_per_window: requests,
            window_seconds: args.window,
        });
    }
    Ok(rule_set)
}

fn print_table(rule_sets: &[RuleSet]) {
    if rule_sets.is_empty() {
        println!("{}", "No rule sets".dimmed());
        return;
    }
    println!("{:<24} {:<28} {:<8} {}", "ID".bold(), "NAME".bold(), "DEFAULT".bold(), "RULES".bold());
    for rule_set in rule_sets {
        println!(
            "{:<24} {:<28} {:<8} {}",
            rule_set.id,
            rule_set.name,
            action_label(rule_set.default_action),
            rule_summary(rule_set)
        );
    }
}

fn rule_summary(rule_set: &RuleSet) -> String {
    let mut parts = Vec::new();
    if rule_set.ip_rules.is_some() {
        parts.push("ip".to_string());
    }
    if rule_set.jwt_validation.as_ref().is_some_and(|r| r.enabled) {
        parts.push("jwt".to_string());
    }
    if rule_set.oauth2_validation.as_ref().is_some_and(|r| r.enabled) {
        parts.push("oauth2".to_string());
    }
    if rule_set.rate_limiting.as_ref().is_some_and(|r| r.enabled) {
        parts.push("rate".to_string());
    }
    if !rule_set.header_rules.is_empty() {
        parts.push(format!("headers({})", rule_set.header_rules.len()));
    }
    if !rule_set.path_rules.is_empty() {
        parts.push(format!("paths({})", rule_set.path_rules.len()));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

fn action_label(action: Action) -> ColoredString {
    match action {
        Action::Allow => "allow".green(),
        Action::Block => "block".red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ActionArg;
    use std::io::Write;

    fn args() -> CreateRuleArgs {
        CreateRuleArgs {
            file: None,
            id: Some("rs-office".to_string()),
            name: Some("Office".to_string()),
            description: None,
            default_action: ActionArg::Block,
            cidr: vec!["10.0.0.0/8".to_string()],
            ip_action: ActionArg::Allow,
            rate_limit: Some(100),
            window: 30,
            replace: false,
        }
    }

    #[test]
    fn test_build_rule_set_from_flags() {
        let rule_set = build_rule_set(args()).unwrap();
        assert_eq!(rule_set.id, "rs-office");
        assert_eq!(rule_set.default_action, Action::Block);
        assert_eq!(rule_set.ip_rules.as_ref().unwrap().rule_type, Action::Allow);
        assert_eq!(rule_set.rate_limiting.as_ref().unwrap().window_seconds, 30);
        assert_eq!(rule_summary(&rule_set), "ip rate");
        assert!(rule_set.validate().is_ok());
    }

    #[test]
    fn test_build_rule_set_from_file_with_id_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"id": "from-file", "name": "File", "default_action": "allow"}}"#
        )
        .unwrap();

        let rule_set = build_rule_set(CreateRuleArgs {
            file: Some(file.path().to_path_buf()),
            id: Some("override".to_string()),
            name: None,
            rate_limit: None,
            cidr: Vec::new(),
            ..args()
        })
        .unwrap();
        assert_eq!(rule_set.id, "override");
        assert_eq!(rule_set.name, "File");
    }

    #[test]
    fn test_generated_id_when_missing() {
        let rule_set = build_rule_set(CreateRuleArgs { id: None, ..args() }).unwrap();
        assert!(rule_set.id.starts_with("rs-"));
    }
}
