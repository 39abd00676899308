//! Simulation requests, results and evaluation logs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Synthetic request evaluated against a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub rule_set_id: String,
    pub client_ip: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_token: Option<String>,
    #[serde(default)]
    pub oauth_scopes: Vec<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SimulationRequest {
    /// Create a request with no headers, token or scopes
    pub fn new(
        rule_set_id: impl Into<String>,
        client_ip: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            rule_set_id: rule_set_id.into(),
            client_ip: client_ip.into(),
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            jwt_token: None,
            oauth_scopes: Vec::new(),
            user_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Allowed,
    Blocked,
}

/// Outcome of evaluating a [`SimulationRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub evaluation_details: Vec<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// One entry of the backend's evaluation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationLog {
    pub timestamp: String,
    pub rule_set_id: String,
    pub client_ip: String,
    pub result: SimulationResult,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_sets_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_count: Option<u64>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }

    /// Backend timestamp, when present and parseable
    pub fn reported_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|t| t.and_utc())
            })
    }
}

/// Parse a user-supplied JSON object of request headers.
///
/// Unparsable input is replaced by an empty map rather than surfaced.
/// Non-string values are kept in their JSON text form.
pub fn parse_header_payload(raw: &str) -> HashMap<String, String> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }

    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
        Ok(object) => object
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, value)
            })
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed header payload");
            HashMap::new()
        }
    }
}
