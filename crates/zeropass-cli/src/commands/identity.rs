//! Identity and session commands

use crate::console::CliConsole;
use crate::context::AppContext;
use colored::*;
use serde_json::json;

pub async fn show(ctx: &AppContext, console: &CliConsole) -> anyhow::Result<()> {
    let identity = ctx.identity.current().await;
    if console.is_json() {
        return console.emit(&identity);
    }

    console.header("Identity");
    console.field("User ID", identity.id.bold());
    console.field("Session ID", &identity.session_id);
    console.field("Created", identity.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if identity.is_placeholder() {
        console.warn("Storage is unavailable; using a shared placeholder identity");
    }
    Ok(())
}

pub async fn reset(ctx: &AppContext, console: &CliConsole, purge: bool) -> anyhow::Result<()> {
    let (previous, purged) = ctx.cache.reset_identity(purge).await;
    let current = ctx.identity.current().await;

    if console.is_json() {
        return console.emit(&json!({
            "previous": previous,
            "current": current,
            "purged_entries": purged,
        }));
    }

    console.success(&format!("New identity {}", current.id.bold()));
    if let Some(old) = previous {
        console.field("Previous", old);
        if purge {
            console.field("Purged", format!("{} cached entries", purged));
        } else {
            println!(
                "{}",
                "Cached rule sets of the previous identity were kept; run `zeropass recover` to re-own them."
                    .dimmed()
            );
        }
    }
    Ok(())
}

pub async fn show_session(ctx: &AppContext, console: &CliConsole) -> anyhow::Result<()> {
    let session = ctx.identity.current_session().await;
    if console.is_json() {
        return console.emit(&session);
    }

    console.header(&session.name);
    console.field("ID", &session.id);
    console.field("Created", session.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    console.field("Last active", session.last_active.format("%Y-%m-%d %H:%M:%S UTC"));
    Ok(())
}

pub async fn rename_session(ctx: &AppContext, console: &CliConsole, name: &str) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Session name cannot be empty");
    }
    let session = ctx.identity.rename_session(name).await;
    if console.is_json() {
        return console.emit(&session);
    }
    console.success(&format!("Session renamed to {}", session.name.bold()));
    Ok(())
}
