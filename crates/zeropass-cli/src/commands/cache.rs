//! Cache inspection

use crate::console::CliConsole;
use crate::context::AppContext;
use colored::*;
use serde::Serialize;
use zeropass_core::cache::CacheEntry;
use zeropass_core::clock::age_since;

#[derive(Debug, Serialize)]
struct EntrySummary {
    key: String,
    age_secs: u64,
    fresh: bool,
}

pub async fn stats(ctx: &AppContext, console: &CliConsole) -> anyhow::Result<()> {
    let identity = ctx.identity.current().await;
    let suffix = format!("_{}", identity.id);
    let ttl = ctx.cache.config().persisted_ttl;
    let now = chrono::Utc::now();

    let mut entries = Vec::new();
    for key in ctx.durable.keys().await? {
        if !key.ends_with(&suffix) {
            continue;
        }
        let Some(raw) = ctx.durable.get(&key).await? else {
            continue;
        };
        if let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) {
            entries.push(EntrySummary {
                key: key.trim_end_matches(&suffix).to_string(),
                age_secs: age_since(now, entry.timestamp).as_secs(),
                fresh: entry.is_fresh(now, ttl),
            });
        }
    }

    let statistics = ctx.cache.statistics();
    if console.is_json() {
        return console.emit(&serde_json::json!({
            "user_id": identity.id,
            "persisted_entries": entries,
            "statistics": statistics,
        }));
    }

    console.header("Cache");
    console.field("User ID", &identity.id);
    console.field("Persisted TTL", format!("{}s", ttl.as_secs()));
    console.field("Memory TTL", format!("{}s", ctx.cache.config().memory_ttl.as_secs()));
    if entries.is_empty() {
        println!("  {}", "No persisted entries".dimmed());
    }
    for entry in &entries {
        let state = if entry.fresh { "fresh".green() } else { "expired".dimmed() };
        println!("  {:<20} {:>6}s  {}", entry.key, entry.age_secs, state);
    }
    Ok(())
}

pub async fn clear(ctx: &AppContext, console: &CliConsole, pattern: Option<&str>) -> anyhow::Result<()> {
    let removed = ctx.cache.invalidate(pattern).await;
    if console.is_json() {
        return console.emit(&serde_json::json!({ "removed": removed }));
    }
    console.success(&format!("Removed {} cached entries", removed));
    Ok(())
}
