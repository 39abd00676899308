//! Domain records exchanged with the firewall simulator backend
//!
//! Every record that can be shown to a user carries an optional `userId`
//! ownership tag (see [`crate::ownership`]).

mod catalog;
mod rules;
mod simulation;

pub use catalog::{RuleTemplate, Scenario, ScenarioTestResult};
pub use rules::{
    Action, HeaderCondition, HeaderRule, IpRule, JwtRule, OAuth2Rule, PathCondition, PathRule,
    RateLimitRule, RuleSet,
};
pub use simulation::{
    Decision, EvaluationLog, HealthStatus, SimulationRequest, SimulationResult,
    parse_header_payload,
};

use serde::{Deserialize, Serialize};

/// Acknowledgement returned by the backend for mutations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_set_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WriteReceipt {
    /// Whether the backend reported success
    pub fn is_success(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s == "success")
    }
}
