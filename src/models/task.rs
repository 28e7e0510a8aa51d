use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Stage;

/// Smallest estimate (in work-days) a generated task may carry.
pub const MIN_ESTIMATE: i64 = 1;

/// Largest estimate a generated task may carry. Anything bigger falls under
/// the Split Rule and has to be broken into subtasks.
pub const MAX_ESTIMATE: i64 = 5;

/// Delivery risk attached to a generated task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl Risk {
    pub const ALL: [Risk; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

/// Scheduling priority of a generated task. `P0` is the most urgent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::P0, Self::P1, Self::P2, Self::P3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "P0" => Some(Self::P0),
            "P1" => Some(Self::P1),
            "P2" => Some(Self::P2),
            "P3" => Some(Self::P3),
            _ => None,
        }
    }

    /// Human label used when describing the scale to the model.
    pub fn label(&self) -> &'static str {
        match self {
            Self::P0 => "Critical",
            Self::P1 => "High",
            Self::P2 => "Medium",
            Self::P3 => "Low",
        }
    }
}

/// A validated, schema-conformant task produced by the generation flow.
///
/// Instances only exist once both the output schema and the domain rules
/// have accepted the model's answer, so `estimate` is always within
/// [`MIN_ESTIMATE`]..=[`MAX_ESTIMATE`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeneratedTask {
    pub title: String,
    pub description: String,
    /// Estimated work-days.
    pub estimate: i64,
    pub risk: Risk,
    pub priority: Priority,
}

/// Structurally valid model output that has not been checked against the
/// domain rules yet.
///
/// Enumerated fields stay as raw strings so the rule engine can report the
/// exact value it rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskCandidate {
    pub title: String,
    pub description: String,
    pub estimate: i64,
    pub risk: String,
    pub priority: String,
}

impl From<GeneratedTask> for TaskCandidate {
    fn from(task: GeneratedTask) -> Self {
        Self {
            title: task.title,
            description: task.description,
            estimate: task.estimate,
            risk: task.risk.as_str().to_string(),
            priority: task.priority.as_str().to_string(),
        }
    }
}

/// Raw input for the task generation endpoint.
///
/// `stage` is kept as a string so an unknown stage surfaces as a validation
/// error instead of a deserialization failure. Missing fields read as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateTaskInput {
    pub goal: String,
    pub stage: String,
}

/// A checked request for one generated task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub goal: String,
    pub stage: Stage,
}

/// A generated task as recorded in the task history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTaskRecord {
    pub id: Uuid,
    pub stage: Stage,
    /// The goal the user asked for, verbatim.
    pub user_goal: String,
    #[serde(flatten)]
    pub task: GeneratedTask,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing the task history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskHistoryQuery {
    pub stage: Option<String>,
    pub limit: Option<u32>,
}
