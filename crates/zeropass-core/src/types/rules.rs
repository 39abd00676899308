//! Firewall rule sets

use crate::error::{ZeroPassError, ZeroPassResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Terminal action of a rule set or IP rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Block,
}

/// CIDR allow/block list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpRule {
    #[serde(rename = "type")]
    pub rule_type: Action,
    pub cidrs: Vec<String>,
}

/// JWT validation requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_claims: Option<HashMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}

/// Required OAuth2 scopes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Rule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub required_scopes: Vec<String>,
}

/// Sliding-window rate limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub requests_per_window: u32,
    pub window_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderCondition {
    Equals,
    Contains,
    Regex,
    Exists,
}

/// Header match rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderRule {
    pub header_name: String,
    pub condition: HeaderCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathCondition {
    Equals,
    Prefix,
    Regex,
}

/// Method + path match rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRule {
    #[serde(default)]
    pub methods: Vec<String>,
    pub path_pattern: String,
    pub condition: PathCondition,
}

/// A named collection of firewall rules evaluated by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_rules: Option<IpRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_validation: Option<JwtRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2_validation: Option<OAuth2Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limiting: Option<RateLimitRule>,
    #[serde(default)]
    pub header_rules: Vec<HeaderRule>,
    #[serde(default)]
    pub path_rules: Vec<PathRule>,
    pub default_action: Action,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl RuleSet {
    /// Create an empty rule set with the given default action
    pub fn new(id: impl Into<String>, name: impl Into<String>, default_action: Action) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            ip_rules: None,
            jwt_validation: None,
            oauth2_validation: None,
            rate_limiting: None,
            header_rules: Vec::new(),
            path_rules: Vec::new(),
            default_action,
            user_id: None,
        }
    }

    /// Reject rule sets the backend would refuse with a 400
    pub fn validate(&self) -> ZeroPassResult<()> {
        if self.id.trim().is_empty() {
            return Err(ZeroPassError::invalid_input_field("Rule set id is required", "id"));
        }
        if self.id.chars().any(is_reserved_id_char) {
            return Err(ZeroPassError::invalid_input_field(
                format!("Rule set id '{}' contains characters not allowed in a URL path", self.id),
                "id",
            ));
        }
        if self.name.trim().is_empty() {
            return Err(ZeroPassError::invalid_input_field("Rule set name is required", "name"));
        }
        if let Some(ip_rules) = &self.ip_rules {
            for cidr in &ip_rules.cidrs {
                if !is_valid_cidr(cidr) {
                    return Err(ZeroPassError::invalid_input_field(
                        format!("Invalid CIDR block: {}", cidr),
                        "ip_rules.cidrs",
                    ));
                }
            }
        }
        if let Some(rate) = &self.rate_limiting {
            if rate.requests_per_window == 0 || rate.window_seconds == 0 {
                return Err(ZeroPassError::invalid_input_field(
                    "Rate limit values must be greater than zero",
                    "rate_limiting",
                ));
            }
        }
        for rule in &self.header_rules {
            if rule.header_name.trim().is_empty() {
                return Err(ZeroPassError::invalid_input_field(
                    "Header rule needs a header name",
                    "header_rules.header_name",
                ));
            }
            if rule.condition != HeaderCondition::Exists && rule.value.is_none() {
                return Err(ZeroPassError::invalid_input_field(
                    format!("Header rule for {} needs a value", rule.header_name),
                    "header_rules.value",
                ));
            }
        }
        Ok(())
    }
}

/// Accepts `addr/prefix` or a bare address, like a non-strict network parse.
/// Characters that would change the meaning of `/rules/{id}`
fn is_reserved_id_char(c: char) -> bool {
    matches!(c, '/' | '?' | '#' | '%' | '\\') || c.is_whitespace() || c.is_control()
}

pub(crate) fn is_valid_cidr(cidr: &str) -> bool {
    let (addr, prefix) = match cidr.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (cidr, None),
    };

    let Ok(ip) = addr.trim().parse::<IpAddr>() else {
        return false;
    };

    let max_prefix = if ip.is_ipv4() { 32 } else { 128 };
    match prefix {
        None => true,
        Some(p) => p.trim().parse::<u8>().is_ok_and(|p| p <= max_prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_set_deserializes_backend_shape() {
        let value = json!({
            "id": "rs-1",
            "name": "Block office",
            "ip_rules": {"type": "block", "cidrs": ["10.0.0.0/8"]},
            "header_rules": [{"header_name": "X-Api-Key", "condition": "exists"}],
            "path_rules": [],
            "default_action": "allow"
        });

        let rule_set: RuleSet = serde_json::from_value(value).unwrap();
        assert_eq!(rule_set.ip_rules.unwrap().rule_type, Action::Block);
        assert_eq!(rule_set.header_rules[0].condition, HeaderCondition::Exists);
        assert!(rule_set.user_id.is_none());
    }

    #[test]
    fn test_user_id_serializes_as_camel_case() {
        let mut rule_set = RuleSet::new("rs-1", "Demo", Action::Block);
        rule_set.user_id = Some("user_a".to_string());
        let value = serde_json::to_value(&rule_set).unwrap();
        assert_eq!(value["userId"], "user_a");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_cidr_validation() {
        assert!(is_valid_cidr("192.168.0.0/16"));
        assert!(is_valid_cidr("10.1.2.3"));
        assert!(is_valid_cidr("2001:db8::/32"));
        assert!(!is_valid_cidr("10.0.0.0/33"));
        assert!(!is_valid_cidr("not-an-ip/8"));
        assert!(!is_valid_cidr(""));
    }

    #[test]
    fn test_validate_rejects_bad_rule_sets() {
        let mut rule_set = RuleSet::new("rs-1", "Demo", Action::Allow);
        assert!(rule_set.validate().is_ok());

        rule_set.ip_rules = Some(IpRule {
            rule_type: Action::Allow,
            cidrs: vec!["300.0.0.0/8".to_string()],
        });
        assert!(rule_set.validate().is_err());

        let blank = RuleSet::new(" ", "Demo", Action::Allow);
        assert!(blank.validate().is_err());

        let mut rate = RuleSet::new("rs-2", "Rate", Action::Allow);
        rate.rate_limiting = Some(RateLimitRule {
            enabled: true,
            requests_per_window: 0,
            window_seconds: 60,
        });
        assert!(rate.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_ids_that_change_the_url() {
        for id in ["rs-1?x=1", "rs-1#frag", "rs/1", "rs 1", "rs%2F1"] {
            let err = RuleSet::new(id, "Demo", Action::Allow).validate().unwrap_err();
            assert!(
                matches!(err, ZeroPassError::InvalidInput { field: Some(ref f), .. } if f == "id"),
                "{} should be rejected",
                id
            );
        }
        assert!(RuleSet::new("waf_template-1.v2", "Demo", Action::Allow).validate().is_ok());
    }
}
