//! Best-effort recovery of rule sets left behind by earlier identities
//!
//! After an identity reset the old rule sets are still on the backend, but
//! tagged to an id nobody holds any more, and the ownership filter hides
//! them. Their last cached listing usually survives in the durable store under
//! `rules_<old id>`; recovery reads those listings and re-submits each rule
//! set under the current identity. Source entries are never deleted.
//!
//! Recovery only runs while the current identity sees no rule sets at all,
//! so an established session never has foreign rule sets merged into it
//! unless the caller asks for it with [`RecoveryService::force`].

use crate::cache::{CacheEntry, RULES_KEY, namespaced_key};
use crate::gateway::ApiGateway;
use crate::storage::KeyValueStore;
use crate::types::RuleSet;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a recovery run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    pub success: bool,
    pub message: String,
    pub recovered_count: usize,
}

impl RecoveryReport {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            recovered_count: 0,
        }
    }
}

/// Scans other identities' cached rule-set listings and re-creates what the
/// current identity is missing
#[derive(Debug)]
pub struct RecoveryService {
    gateway: Arc<ApiGateway>,
    store: Arc<dyn KeyValueStore>,
    force: bool,
}

impl RecoveryService {
    pub fn new(gateway: Arc<ApiGateway>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            gateway,
            store,
            force: false,
        }
    }

    /// Merge orphaned rule sets even when the current identity already has some
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Run once. Safe to repeat: a second run finds the recovered rule sets
    /// visible and stops, and ids already present are never resubmitted.
    pub async fn recover(&self) -> RecoveryReport {
        let identity = self.gateway.identity().current().await;

        let current = match self.gateway.refresh_rule_sets().await {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "Recovery aborted, current rule sets unavailable");
                return RecoveryReport::failed(format!("Could not load current rule sets: {}", e));
            }
        };

        if !current.is_empty() && !self.force {
            info!(
                user_id = %identity.id,
                existing = current.len(),
                "Recovery skipped, current identity already has rule sets"
            );
            return RecoveryReport {
                success: true,
                message: format!(
                    "Nothing to recover: this session already has {} rule set{}",
                    current.len(),
                    plural(current.len())
                ),
                recovered_count: 0,
            };
        }

        let (candidates, sources) = match self.orphaned_rule_sets(&identity.id).await {
            Ok(found) => found,
            Err(message) => return RecoveryReport::failed(message),
        };

        let mut seen: HashSet<String> = current.into_iter().map(|r| r.id).collect();
        let mut recovered = 0usize;
        let mut failed = 0usize;

        for rule_set in candidates {
            if !seen.insert(rule_set.id.clone()) {
                debug!(rule_set_id = %rule_set.id, "Skipping rule set already present");
                continue;
            }
            match self.gateway.create_rule_set(&rule_set).await {
                Ok(_) => recovered += 1,
                Err(e) => {
                    failed += 1;
                    warn!(rule_set_id = %rule_set.id, error = %e, "Failed to recover rule set");
                }
            }
        }

        info!(
            user_id = %identity.id,
            recovered,
            failed,
            sources,
            "Recovery finished"
        );

        let message = match (recovered, failed) {
            (0, 0) => "No orphaned rule sets found".to_string(),
            (n, 0) => format!(
                "Recovered {} rule set{} from {} previous session{}",
                n,
                plural(n),
                sources,
                plural(sources)
            ),
            (n, f) => format!("Recovered {} rule set{}, {} failed", n, plural(n), f),
        };

        RecoveryReport {
            success: failed == 0,
            message,
            recovered_count: recovered,
        }
    }

    /// Rule sets from every foreign `rules_*` cache entry, plus the number of
    /// entries they came from
    async fn orphaned_rule_sets(&self, user_id: &str) -> Result<(Vec<RuleSet>, usize), String> {
        let own_key = namespaced_key(RULES_KEY, user_id);
        let prefix = format!("{}_", RULES_KEY);

        let keys = self.store.keys().await.map_err(|e| {
            warn!(error = %e, "Recovery could not list stored keys");
            format!("Local storage unavailable: {}", e)
        })?;

        let mut found = Vec::new();
        let mut sources = 0usize;

        for key in keys.iter().filter(|k| k.starts_with(&prefix) && **k != own_key) {
            let raw = match self.store.get(key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping unreadable cache entry");
                    continue;
                }
            };
            let entry: CacheEntry = match serde_json::from_str(&raw) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(key = %key, error = %e, "Skipping non-cache entry");
                    continue;
                }
            };
            if entry.user_id == user_id {
                continue;
            }
            match serde_json::from_value::<Vec<RuleSet>>(entry.data) {
                Ok(rule_sets) if !rule_sets.is_empty() => {
                    sources += 1;
                    found.extend(rule_sets);
                }
                Ok(_) => {}
                Err(e) => debug!(key = %key, error = %e, "Skipping entry without rule sets"),
            }
        }

        Ok((found, sources))
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
