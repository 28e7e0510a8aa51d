//! Domain rule checks applied to structurally valid model output.
//!
//! Violations are reported, never repaired: an estimate of 8 days is not
//! clamped to 5, because the Split Rule says such a task must be split and
//! the caller needs to see that.

use serde::Serialize;
use thiserror::Error;

use crate::models::{GeneratedTask, Priority, Risk, TaskCandidate, MAX_ESTIMATE, MIN_ESTIMATE};

/// A single broken domain rule.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    /// Split Rule: estimate outside `[min, max]` work-days.
    EstimateOutOfRange { estimate: i64, min: i64, max: i64 },
    UnknownRisk { value: String },
    UnknownPriority { value: String },
}

impl Violation {
    pub fn estimate_out_of_range(estimate: i64) -> Self {
        Self::EstimateOutOfRange {
            estimate,
            min: MIN_ESTIMATE,
            max: MAX_ESTIMATE,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EstimateOutOfRange { estimate, min, max } => write!(
                f,
                "estimate {estimate} is outside {min}..={max} work-days (Split Rule: split the task)"
            ),
            Self::UnknownRisk { value } => write!(f, "risk {value:?} is not one of Low, Medium, High"),
            Self::UnknownPriority { value } => {
                write!(f, "priority {value:?} is not one of P0, P1, P2, P3")
            }
        }
    }
}

/// Output parsed correctly but breaks one or more domain rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("task rejected: {}", summarize(.violations))]
pub struct RuleViolation {
    pub violations: Vec<Violation>,
}

impl RuleViolation {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks task candidates against the Split Rule and the closed risk and
/// priority sets.
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine {
    min_estimate: i64,
    max_estimate: i64,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self {
            min_estimate: MIN_ESTIMATE,
            max_estimate: MAX_ESTIMATE,
        }
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the candidate iff every rule holds. All violations are
    /// collected, not just the first.
    pub fn validate_task(&self, candidate: &TaskCandidate) -> Result<GeneratedTask, RuleViolation> {
        let mut violations = Vec::new();

        if !(self.min_estimate..=self.max_estimate).contains(&candidate.estimate) {
            violations.push(Violation::EstimateOutOfRange {
                estimate: candidate.estimate,
                min: self.min_estimate,
                max: self.max_estimate,
            });
        }

        let risk = Risk::from_str(&candidate.risk);
        if risk.is_none() {
            violations.push(Violation::UnknownRisk {
                value: candidate.risk.clone(),
            });
        }

        let priority = Priority::from_str(&candidate.priority);
        if priority.is_none() {
            violations.push(Violation::UnknownPriority {
                value: candidate.priority.clone(),
            });
        }

        match (risk, priority) {
            (Some(risk), Some(priority)) if violations.is_empty() => Ok(GeneratedTask {
                title: candidate.title.clone(),
                description: candidate.description.clone(),
                estimate: candidate.estimate,
                risk,
                priority,
            }),
            _ => Err(RuleViolation::new(violations)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(estimate: i64, risk: &str, priority: &str) -> TaskCandidate {
        TaskCandidate {
            title: "x".to_string(),
            description: "y".to_string(),
            estimate,
            risk: risk.to_string(),
            priority: priority.to_string(),
        }
    }

    #[test]
    fn accepts_every_in_range_combination() {
        let engine = RuleEngine::new();
        for estimate in 1..=5 {
            for risk in Risk::ALL {
                for priority in Priority::ALL {
                    let task = engine
                        .validate_task(&candidate(estimate, risk.as_str(), priority.as_str()))
                        .unwrap();
                    assert_eq!(task.estimate, estimate);
                    assert_eq!(task.risk, risk);
                    assert_eq!(task.priority, priority);
                }
            }
        }
    }

    #[test]
    fn rejects_estimate_zero_and_six() {
        let engine = RuleEngine::new();
        for estimate in [0, 6, -1, 40] {
            let err = engine.validate_task(&candidate(estimate, "Low", "P1")).unwrap_err();
            assert_eq!(err.violations, vec![Violation::estimate_out_of_range(estimate)]);
        }
    }

    #[test]
    fn rejects_unknown_risk_and_priority() {
        let engine = RuleEngine::new();

        let err = engine.validate_task(&candidate(3, "Critical", "P1")).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::UnknownRisk {
                value: "Critical".to_string()
            }]
        );

        let err = engine.validate_task(&candidate(3, "Low", "P4")).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::UnknownPriority {
                value: "P4".to_string()
            }]
        );
    }

    #[test]
    fn reports_all_violations_together() {
        let err = RuleEngine::new()
            .validate_task(&candidate(9, "Critical", "P4"))
            .unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert!(err.to_string().contains("Split Rule"));
    }

    #[test]
    fn violation_serializes_with_rule_tag() {
        let value = serde_json::to_value(Violation::estimate_out_of_range(7)).unwrap();
        assert_eq!(value["rule"], "estimate_out_of_range");
        assert_eq!(value["estimate"], 7);
        assert_eq!(value["max"], 5);
    }
}
