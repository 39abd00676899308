//! Rule templates and exploit scenarios
//!
//! The backend owns these shapes; fields the client does not interpret are
//! kept in `extra` so nothing is lost when records pass through the cache.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of running a scenario against a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_set_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = json!({
            "id": "sqli",
            "name": "SQL injection",
            "severity": "high",
            "requests": [{"path": "/login"}]
        });

        let scenario: Scenario = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(scenario.extra["severity"], "high");
        assert_eq!(serde_json::to_value(&scenario).unwrap(), raw);
    }

    #[test]
    fn test_test_result_tolerates_sparse_body() {
        let result: ScenarioTestResult =
            serde_json::from_value(json!({"passed": false, "blocked_requests": 2})).unwrap();
        assert_eq!(result.passed, Some(false));
        assert!(result.scenario_id.is_none());
        assert_eq!(result.extra["blocked_requests"], 2);
    }
}
