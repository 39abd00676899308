//! Cache-aware, ownership-enforcing gateway to the backend

use super::client::{ProbeReport, RestClient};
use crate::cache::{CacheStore, LOGS_KEY, RULES_KEY, SCENARIOS_KEY, TEMPLATES_KEY};
use crate::config::ZeroPassConfig;
use crate::error::{ZeroPassError, ZeroPassResult};
use crate::identity::{Identity, IdentityProvider};
use crate::ownership::{self, OwnedRecord};
use crate::types::{
    EvaluationLog, HealthStatus, RuleSet, RuleTemplate, Scenario, ScenarioTestResult,
    SimulationRequest, SimulationResult, WriteReceipt,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use urlencoding::encode;

const NO_QUERY: Option<&[(&str, &str)]> = None;
const NO_BODY: Option<&()> = None;

/// Single entry point for every backend call.
///
/// Reads are cache-aside and never fail: backend errors are logged and an
/// empty list is returned. Writes tag their payload with the current
/// identity, propagate errors and always invalidate the slice they touched,
/// whether or not the call succeeded.
#[derive(Debug)]
pub struct ApiGateway {
    client: RestClient,
    identity: Arc<IdentityProvider>,
    cache: Arc<CacheStore>,
    probe_timeout: Duration,
    stale_retry_delay: Duration,
}

impl ApiGateway {
    pub fn new(
        config: &ZeroPassConfig,
        identity: Arc<IdentityProvider>,
        cache: Arc<CacheStore>,
    ) -> ZeroPassResult<Self> {
        Ok(Self {
            client: RestClient::new(&config.api_base_url, config.request_timeout)?,
            identity,
            cache,
            probe_timeout: config.probe_timeout,
            stale_retry_delay: config.stale_retry_delay,
        })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn identity(&self) -> &Arc<IdentityProvider> {
        &self.identity
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// Backend liveness; not cached, errors propagate
    pub async fn health_check(&self) -> ZeroPassResult<HealthStatus> {
        let identity = self.identity.current().await;
        self.client.get_json(&identity.id, "/health", NO_QUERY).await
    }

    /// Connectivity probe bounded by the configured probe timeout
    pub async fn probe(&self) -> ProbeReport {
        let identity = self.identity.current().await;
        let report = self
            .client
            .probe(&identity.id, "/health", self.probe_timeout)
            .await;
        debug!(reachable = report.reachable, latency = ?report.latency, "Probe finished");
        report
    }

    // ----- reads -----

    /// Rule sets visible to the current identity
    pub async fn get_rule_sets(&self) -> Vec<RuleSet> {
        self.fetch_rule_sets()
            .await
            .unwrap_or_else(|e| read_failed("rule sets", e))
    }

    /// Like [`get_rule_sets`](Self::get_rule_sets) but bypasses the cache and
    /// propagates errors
    pub async fn refresh_rule_sets(&self) -> ZeroPassResult<Vec<RuleSet>> {
        self.cache.invalidate(Some(RULES_KEY)).await;
        self.fetch_rule_sets().await
    }

    /// One rule set by id; uncached. A record owned by someone else is
    /// reported as missing.
    pub async fn get_rule_set(&self, id: &str) -> ZeroPassResult<RuleSet> {
        let identity = self.identity.current().await;
        let rule_set = self.fetch_raw_rule_set(&identity, id).await?;

        ownership::filter(vec![rule_set], &identity)
            .pop()
            .ok_or_else(|| stale_rule_set(id))
    }

    /// Most recent evaluation logs, at most `limit`
    pub async fn get_logs(&self, limit: usize) -> Vec<EvaluationLog> {
        let key = format!("{}_{}", LOGS_KEY, limit);
        let limit = limit.to_string();
        self.cached_read(&key, "/logs", Some(&[("limit", limit.as_str())]))
            .await
            .unwrap_or_else(|e| read_failed("evaluation logs", e))
    }

    pub async fn get_templates(&self) -> Vec<RuleTemplate> {
        self.cached_read(TEMPLATES_KEY, "/templates", NO_QUERY)
            .await
            .unwrap_or_else(|e| read_failed("templates", e))
    }

    pub async fn get_scenarios(&self) -> Vec<Scenario> {
        self.cached_read(SCENARIOS_KEY, "/scenarios", NO_QUERY)
            .await
            .unwrap_or_else(|e| read_failed("scenarios", e))
    }

    // ----- writes -----

    /// Create (or upsert) a rule set owned by the current identity
    pub async fn create_rule_set(&self, rule_set: &RuleSet) -> ZeroPassResult<WriteReceipt> {
        rule_set.validate()?;
        let identity = self.identity.current().await;
        let tagged = ownership::tag(rule_set, &identity);

        let result = self
            .client
            .post_json(&identity.id, "/rules", NO_QUERY, Some(&tagged))
            .await;
        self.cache.invalidate(Some(RULES_KEY)).await;

        let receipt: WriteReceipt = result?;
        info!(rule_set_id = %tagged.id, user_id = %identity.id, "Rule set saved");
        Ok(receipt)
    }

    /// Replace an existing rule set. Refuses records owned by another identity.
    pub async fn update_rule_set(&self, rule_set: &RuleSet) -> ZeroPassResult<WriteReceipt> {
        let identity = self.identity.current().await;
        ownership::ensure_owned(rule_set, &identity)?;
        self.ensure_not_foreign(&identity, &rule_set.id).await?;
        self.create_rule_set(rule_set).await
    }

    pub async fn delete_rule_set(&self, id: &str) -> ZeroPassResult<WriteReceipt> {
        let identity = self.identity.current().await;
        self.ensure_not_foreign(&identity, id).await?;

        let path = format!("/rules/{}", encode(id));
        let result = self.client.delete_json(&identity.id, &path).await;
        self.cache.invalidate(Some(RULES_KEY)).await;

        result.map_err(|e| {
            if e.is_rule_set_not_found() {
                stale_rule_set(id)
            } else {
                e
            }
        })
    }

    /// Instantiate a rule set from a template
    pub async fn apply_template(
        &self,
        template_id: &str,
        rule_set_name: &str,
    ) -> ZeroPassResult<WriteReceipt> {
        if rule_set_name.trim().is_empty() {
            return Err(ZeroPassError::invalid_input_field(
                "Rule set name cannot be empty",
                "rule_set_name",
            ));
        }
        let identity = self.identity.current().await;
        let path = format!("/templates/{}/apply", encode(template_id));

        let result = self
            .client
            .post_json(
                &identity.id,
                &path,
                Some(&[("rule_set_name", rule_set_name)]),
                NO_BODY,
            )
            .await;
        self.cache.invalidate(Some(RULES_KEY)).await;
        result
    }

    pub async fn clear_logs(&self) -> ZeroPassResult<WriteReceipt> {
        let identity = self.identity.current().await;
        let result = self.client.delete_json(&identity.id, "/logs").await;
        self.cache.invalidate(Some(LOGS_KEY)).await;
        result
    }

    // ----- evaluation -----

    /// Evaluate a synthetic request. Never cached.
    ///
    /// A rule-set id the backend no longer knows surfaces as
    /// [`ZeroPassError::StaleReference`]; no other rule set is substituted.
    pub async fn simulate(&self, request: &SimulationRequest) -> ZeroPassResult<SimulationResult> {
        let identity = self.identity.current().await;
        let tagged = ownership::tag(request, &identity);

        let result: ZeroPassResult<SimulationResult> = self
            .client
            .post_json(&identity.id, "/simulate", NO_QUERY, Some(&tagged))
            .await;
        // Every evaluation appends a backend log entry
        self.cache.invalidate(Some(LOGS_KEY)).await;

        match result {
            Ok(response) => Ok(ownership::tag(&response, &identity)),
            Err(e) if e.is_rule_set_not_found() => Err(stale_rule_set(&request.rule_set_id)),
            Err(e) => Err(e),
        }
    }

    /// Run an exploit scenario against a rule set.
    ///
    /// The rule set must be visible to the current identity; a missing one
    /// triggers one full cache refresh before giving up. A backend "rule set
    /// not found" is retried exactly once after the configured delay.
    pub async fn test_scenario(
        &self,
        scenario_id: &str,
        rule_set_id: &str,
    ) -> ZeroPassResult<ScenarioTestResult> {
        let identity = self.identity.current().await;

        if !contains_rule_set(&self.fetch_rule_sets().await?, rule_set_id) {
            debug!(rule_set_id, "Rule set not in cached list, refetching");
            self.cache.invalidate(None).await;
            if !contains_rule_set(&self.fetch_rule_sets().await?, rule_set_id) {
                return Err(stale_rule_set(rule_set_id));
            }
        }

        let path = format!("/scenarios/{}/test", encode(scenario_id));
        let query = [("rule_set_id", rule_set_id)];

        let first: ZeroPassResult<ScenarioTestResult> = self
            .client
            .post_json(&identity.id, &path, Some(&query), NO_BODY)
            .await;

        let result = match first {
            Err(e) if e.is_rule_set_not_found() => {
                warn!(
                    scenario_id,
                    rule_set_id,
                    delay = ?self.stale_retry_delay,
                    "Backend lost the rule set, retrying once"
                );
                self.cache.invalidate(Some(RULES_KEY)).await;
                tokio::time::sleep(self.stale_retry_delay).await;
                self.client
                    .post_json(&identity.id, &path, Some(&query), NO_BODY)
                    .await
            }
            other => other,
        };
        self.cache.invalidate(Some(LOGS_KEY)).await;

        match result {
            Ok(outcome) => Ok(ownership::tag(&outcome, &identity)),
            Err(e) if e.is_rule_set_not_found() => Err(stale_rule_set(rule_set_id)),
            Err(e) => Err(e),
        }
    }

    // ----- helpers -----

    async fn fetch_rule_sets(&self) -> ZeroPassResult<Vec<RuleSet>> {
        self.cached_read(RULES_KEY, "/rules", NO_QUERY).await
    }

    async fn cached_read<T, Q>(&self, key: &str, path: &str, query: Option<&Q>) -> ZeroPassResult<Vec<T>>
    where
        T: OwnedRecord + Serialize + DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let identity = self.identity.current().await;

        if let Some(hit) = self.cache.get::<Vec<T>>(key).await {
            return Ok(ownership::filter(hit, &identity));
        }

        let fetched: Vec<T> = self.client.get_json(&identity.id, path, query).await?;
        let visible = ownership::filter(fetched, &identity);
        self.cache.set(key, &visible).await;
        Ok(visible)
    }

    async fn fetch_raw_rule_set(&self, identity: &Identity, id: &str) -> ZeroPassResult<RuleSet> {
        let path = format!("/rules/{}", encode(id));
        self.client
            .get_json(&identity.id, &path, NO_QUERY)
            .await
            .map_err(|e| {
                if e.is_rule_set_not_found() {
                    stale_rule_set(id)
                } else {
                    e
                }
            })
    }

    /// Fail when the backend holds `id` under another identity's tag.
    ///
    /// Best effort only: a missing record or a failed lookup lets the write
    /// through, and the backend has the final say.
    async fn ensure_not_foreign(&self, identity: &Identity, id: &str) -> ZeroPassResult<()> {
        match self.fetch_raw_rule_set(identity, id).await {
            Ok(existing) => ownership::ensure_owned(&existing, identity),
            Err(e) if e.is_rule_set_not_found() => Ok(()),
            Err(e) => {
                warn!(rule_set_id = id, error = %e, "Ownership lookup failed, writing anyway");
                Ok(())
            }
        }
    }
}

fn contains_rule_set(rule_sets: &[RuleSet], id: &str) -> bool {
    rule_sets.iter().any(|r| r.id == id)
}

fn stale_rule_set(id: &str) -> ZeroPassError {
    ZeroPassError::stale_reference(format!("Rule set '{}' no longer exists", id), id)
}

fn read_failed<T>(what: &str, error: ZeroPassError) -> Vec<T> {
    warn!(error = %error, "Failed to fetch {}, returning empty list", what);
    Vec::new()
}
