use serde::Serialize;

/// An adaptive methodology rule. Titles are unique across [`RULES`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Rule {
    pub title: &'static str,
    pub description: &'static str,
    /// What happens once the rule triggers.
    pub enforcement: &'static str,
}

/// A guiding principle. Display data only.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Principle {
    pub title: &'static str,
    pub description: &'static str,
}

pub const SPLIT_RULE_TITLE: &str = "Split Rule (Task > 5 days)";

pub static RULES: [Rule; 3] = [
    Rule {
        title: SPLIT_RULE_TITLE,
        description: "If a task exceeds 5 work-days remaining, the owner must split it into subtasks. This ensures work remains granular and completable.",
        enforcement: "Generated tasks with an estimate above 5 days are rejected.",
    },
    Rule {
        title: "Escalation Rule (P0 Blocked > 24h)",
        description: "If a P0 (critical) task is blocked for more than 24 hours, it automatically notifies leadership to ensure the blocker is removed.",
        enforcement: "Leadership is notified once a P0 task stays blocked for 24 hours.",
    },
    Rule {
        title: "SLO Breach Rule",
        description: "If an SLO alert fires twice in 7 days, an incident RCA epic is automatically created and prioritized to P0 to fix the root cause.",
        enforcement: "A P0 root-cause epic is opened on the second alert within 7 days.",
    },
];

pub static PRINCIPLES: [Principle; 8] = [
    Principle {
        title: "1. Research -> Implement -> Verify",
        description: "Keep an evidence-driven loop: discover, build, and confirm.",
    },
    Principle {
        title: "2. Config-over-Code",
        description: "Environment, thresholds, and feature flags must be externalized.",
    },
    Principle {
        title: "3. Design for Observability",
        description: "Instrument early: logs, metrics, traces, and health checks.",
    },
    Principle {
        title: "4. Security & Privacy by Design",
        description: "Include threat models, secrets handling, and federated options.",
    },
    Principle {
        title: "5. Modularity & Single Responsibility",
        description: "Small, testable components with clear interfaces.",
    },
    Principle {
        title: "6. Fail-fast, Recover-gracefully",
        description: "Define error types and recovery strategies; prefer explicit failures.",
    },
    Principle {
        title: "7. Empirical & Measurable",
        description: "Every claim should be testable and measurable through benchmarks.",
    },
    Principle {
        title: "8. Continuous Improvement",
        description: "Retrospectives and experiment registries to capture learnings.",
    },
];

/// Look up a rule by its exact title.
pub fn find(title: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.title == title)
}
