use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached natural-language explanation of a rule, keyed by rule title.
///
/// Entries are created on the first cache miss and never modified by the
/// cache afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleExplanation {
    pub rule_title: String,
    pub rule_description: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

/// Input for the rule explanation endpoint. Missing fields read as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExplainRuleInput {
    pub rule_title: String,
    pub rule_text: String,
}

/// Response of the rule explanation endpoint. `explanation` is empty when the
/// model could not produce one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExplainRuleResponse {
    pub explanation: String,
}
