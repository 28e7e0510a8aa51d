use serde::Serialize;

use crate::models::Stage;

/// Canonical description of a lifecycle stage.
///
/// `goal` is part of the prompt contract; `activities` and `tasks` are
/// display data for the catalog endpoints.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StageInfo {
    pub stage: Stage,
    pub title: &'static str,
    pub goal: &'static str,
    pub activities: &'static [&'static str],
    pub tasks: &'static [&'static str],
}

/// Stage table in lifecycle order. Indexed by `Stage as usize`.
pub static STAGES: [StageInfo; 6] = [
    StageInfo {
        stage: Stage::Discover,
        title: "1. Discover",
        goal: "Establish problem context, constraints, risks, and candidate solutions grounded in authoritative sources.",
        activities: &[
            "Literature & ecosystem review (papers, vendor docs, standards)",
            "Stakeholder interviews and success criteria definition (SLOs & business metrics)",
            "Pattern & anti-pattern identification",
            "Tooling and library evaluation (maintenance, license, maturity)",
            "High-level threat model & privacy assessment",
            "Initial risk register and mitigation proposals",
        ],
        tasks: &[
            "Task: Literature scan - compile 6-10 authoritative sources",
            "Spike: Prototype feasibility (PoC) - minimal prototype validating assumptions",
            "Task: Risk register creation - list top 8 technical/legal risks",
            "Task: Tooling evaluation matrix - compare 3 candidate tools",
        ],
    },
    StageInfo {
        stage: Stage::Plan,
        title: "2. Plan",
        goal: "Convert discovery outcomes into an actionable plan with architecture, milestones, and acceptance criteria.",
        activities: &[
            "Architecture sketches (component diagrams + data/control flows)",
            "API contracts and integration points",
            "Config spec (centralized schema for env variables and feature flags)",
            "Test strategy: unit/integration/e2e/performance/privacy tests",
            "CI/CD pipeline design and rollback strategy",
            "Runbook & on-call responsibilities defined",
        ],
        tasks: &[
            "Task: Architecture sketch creation (diagram + data flow)",
            "Feature: API contract definition - OpenAPI schema + example payloads",
            "Task: Config schema & feature flags - central config file",
            "Task: CI/CD pipeline spec - stages and rollback policy",
            "Task: Acceptance criteria & SLO definitions",
        ],
    },
    StageInfo {
        stage: Stage::Implement,
        title: "3. Implement",
        goal: "Deliver clean, modular, production-ready code and infrastructure that meets acceptance criteria.",
        activities: &[
            "Readability first: clear names, small functions, and API docs",
            "Modular packaging with clear versioning",
            "Structured logging and error hierarchy",
            "Config-over-code and feature flags for non-breaking releases",
            "Secure defaults: least privilege, encrypted secrets, input validation",
        ],
        tasks: &[
            "Feature: Core library/module implementation",
            "Task: Structured logging integration - logging wrappers + examples",
            "Task: Error type definitions & docs",
            "Task: Secrets management integration (Vault/KMS onboarding)",
            "Task: Linting + pre-commit hooks setup",
        ],
    },
    StageInfo {
        stage: Stage::Verify,
        title: "4. Verify",
        goal: "Provide high confidence that the implementation is correct, performant, resilient, and compliant.",
        activities: &[
            "Unit Tests: Isolate logic with meaningful coverage",
            "Integration Tests: Exercise interactions between components",
            "End-to-End Tests: Validate critical user flows in a production-like environment",
            "Performance Benchmarks: Regression and baseline for throughput",
            "Security & Privacy Reviews: Vulnerability scans, secrets exposure tests",
        ],
        tasks: &[
            "Task: Unit test coverage for module X (list critical edge cases)",
            "Task: Integration tests for external API contracts with mock servers",
            "Task: Performance benchmark and baseline record",
            "Task: Security scan & dependencies audit",
            "Task: Accessibility/UX spot-check (if customer-facing)",
        ],
    },
    StageInfo {
        stage: Stage::Operate,
        title: "5. Operate",
        goal: "Run the system reliably in production and keep stakeholders informed.",
        activities: &[
            "Deployment pipelines with canary/blue-green strategies",
            "Observability: metrics (SLOs), structured logs, distributed traces",
            "Alerting tied to actionable playbooks (runbooks)",
            "Incident management & blameless postmortems",
            "Secrets rotation policy and automated credential expiry",
        ],
        tasks: &[
            "Task: Canary deployment pipeline stage and runbook",
            "Task: Dashboard creation (latency, error rate, throughput, cost)",
            "Task: Backup and recovery test (restore from backup in staging)",
            "Task: Secrets rotation implementation and test",
        ],
    },
    StageInfo {
        stage: Stage::Improve,
        title: "6. Improve",
        goal: "Institutionalize learning and evolve the product/process.",
        activities: &[
            "Postmortems with action items tracked to closure",
            "Experiment registry for A/B experiments and model runs",
            "Quarterly architecture & dependency review (technical debt log)",
            "Retrospectives on process and tooling",
        ],
        tasks: &[
            "Task: Postmortem write-up template + action items",
            "Task: Quarterly dependency & architecture review",
            "Task: Experiment registry entry for experiment #X",
        ],
    },
];

impl Stage {
    /// Catalog entry for this stage.
    pub fn info(&self) -> &'static StageInfo {
        &STAGES[*self as usize]
    }

    /// The stage's canonical goal statement.
    pub fn goal(&self) -> &'static str {
        self.info().goal
    }

    /// Display title, e.g. `"3. Implement"`.
    pub fn title(&self) -> &'static str {
        self.info().title
    }
}
