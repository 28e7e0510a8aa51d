//! Output contract for generated tasks.
//!
//! [`TASK_FIELDS`] is the single description of the task shape. It is
//! rendered into the JSON Schema sent with every generation call
//! ([`task_response_format`]) and used again to check whatever comes back
//! ([`validate_task_output`]), since the provider may ignore the schema.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::gateway::ResponseFormat;
use crate::models::{GeneratedTask, Priority, Risk, TaskCandidate};

/// Name of the structured-output schema sent to the provider.
pub const TASK_SCHEMA_NAME: &str = "task_generation";

/// Model output that does not match the task contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("output is not valid JSON: {0}")]
    Malformed(String),

    #[error("output is not a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` has value {value:?}, expected one of {allowed:?}")]
    OutOfEnum {
        field: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("unexpected field `{0}`")]
    UnexpectedField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string.
    Text,
    Integer,
    /// String drawn from a closed set.
    Enum(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

const RISK_VALUES: &[&str] = &["Low", "Medium", "High"];
const PRIORITY_VALUES: &[&str] = &["P0", "P1", "P2", "P3"];

/// Required fields of a generated task, in output order. No other fields
/// are permitted.
pub const TASK_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        kind: FieldKind::Text,
        description: "A concise, actionable task title.",
    },
    FieldSpec {
        name: "description",
        kind: FieldKind::Text,
        description: "A detailed description of what needs to be done.",
    },
    FieldSpec {
        name: "estimate",
        kind: FieldKind::Integer,
        description: "Estimated work days (1-5).",
    },
    FieldSpec {
        name: "risk",
        kind: FieldKind::Enum(RISK_VALUES),
        description: "Delivery risk.",
    },
    FieldSpec {
        name: "priority",
        kind: FieldKind::Enum(PRIORITY_VALUES),
        description: "Priority, P0 (Critical) to P3 (Low).",
    },
];

/// Render [`TASK_FIELDS`] as a strict JSON Schema object.
pub fn task_json_schema() -> Value {
    let mut properties = Map::new();
    for field in TASK_FIELDS {
        let property = match field.kind {
            FieldKind::Text => json!({ "type": "string", "description": field.description }),
            FieldKind::Integer => json!({ "type": "integer", "description": field.description }),
            FieldKind::Enum(values) => {
                json!({ "type": "string", "enum": values, "description": field.description })
            }
        };
        properties.insert(field.name.to_string(), property);
    }

    let required: Vec<&str> = TASK_FIELDS.iter().map(|f| f.name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// The generation-time contract attached to task generation calls.
pub fn task_response_format() -> ResponseFormat {
    ResponseFormat::json_schema(TASK_SCHEMA_NAME, true, task_json_schema())
}

/// Decode raw model output and check it against [`TASK_FIELDS`].
pub fn validate_task_output(raw: &str) -> Result<TaskCandidate, SchemaViolation> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| SchemaViolation::Malformed(e.to_string()))?;
    validate_task_value(&value)
}

/// Check an already-decoded value against [`TASK_FIELDS`].
///
/// Reports the first problem found: missing fields and type errors in
/// field order, then any field outside the contract.
pub fn validate_task_value(value: &Value) -> Result<TaskCandidate, SchemaViolation> {
    let object = value.as_object().ok_or(SchemaViolation::NotAnObject)?;

    for field in TASK_FIELDS {
        let v = object
            .get(field.name)
            .ok_or(SchemaViolation::MissingField(field.name))?;
        check_field(field, v)?;
    }

    if let Some(extra) = object
        .keys()
        .find(|k| !TASK_FIELDS.iter().any(|f| f.name == k.as_str()))
    {
        return Err(SchemaViolation::UnexpectedField(extra.clone()));
    }

    // Every field was checked above.
    let text = |name: &str| object[name].as_str().unwrap_or_default().to_string();
    Ok(TaskCandidate {
        title: text("title"),
        description: text("description"),
        estimate: object["estimate"].as_i64().unwrap_or_default(),
        risk: text("risk"),
        priority: text("priority"),
    })
}

fn check_field(field: &FieldSpec, value: &Value) -> Result<(), SchemaViolation> {
    match field.kind {
        FieldKind::Text => {
            let s = value.as_str().ok_or(SchemaViolation::WrongType {
                field: field.name,
                expected: "a string",
            })?;
            if s.trim().is_empty() {
                return Err(SchemaViolation::EmptyField(field.name));
            }
        }
        FieldKind::Integer => {
            if value.as_i64().is_none() {
                return Err(SchemaViolation::WrongType {
                    field: field.name,
                    expected: "an integer",
                });
            }
        }
        FieldKind::Enum(allowed) => {
            let s = value.as_str().ok_or(SchemaViolation::WrongType {
                field: field.name,
                expected: "a string",
            })?;
            if !allowed.contains(&s) {
                return Err(SchemaViolation::OutOfEnum {
                    field: field.name,
                    value: s.to_string(),
                    allowed: allowed.to_vec(),
                });
            }
        }
    }
    Ok(())
}

/// Encode a validated task the way a conforming model would.
pub fn encode_task(task: &GeneratedTask) -> String {
    json!({
        "title": task.title,
        "description": task.description,
        "estimate": task.estimate,
        "risk": task.risk.as_str(),
        "priority": task.priority.as_str(),
    })
    .to_string()
}

// The contract's closed sets must stay in step with the model enums.
const _: () = {
    assert!(RISK_VALUES.len() == Risk::ALL.len());
    assert!(PRIORITY_VALUES.len() == Priority::ALL.len());
};

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Value {
        json!({
            "title": "Add bcrypt hashing",
            "description": "Replace SHA-1 password digests with bcrypt.",
            "estimate": 3,
            "risk": "Medium",
            "priority": "P1"
        })
    }

    #[test]
    fn schema_is_strict_and_requires_every_field() {
        let schema = task_json_schema();

        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["required"],
            json!(["title", "description", "estimate", "risk", "priority"])
        );
        assert_eq!(schema["properties"]["estimate"]["type"], "integer");
        assert_eq!(schema["properties"]["risk"]["enum"], json!(["Low", "Medium", "High"]));
        assert_eq!(
            schema["properties"]["priority"]["enum"],
            json!(["P0", "P1", "P2", "P3"])
        );
    }

    #[test]
    fn response_format_is_named_and_strict() {
        let format = task_response_format();
        assert_eq!(format.kind, "json_schema");
        assert_eq!(format.json_schema.name, TASK_SCHEMA_NAME);
        assert!(format.json_schema.strict);
    }

    #[test]
    fn accepts_conforming_output() {
        let candidate = validate_task_value(&valid()).unwrap();
        assert_eq!(candidate.title, "Add bcrypt hashing");
        assert_eq!(candidate.estimate, 3);
        assert_eq!(candidate.risk, "Medium");
        assert_eq!(candidate.priority, "P1");
    }

    #[test]
    fn leaves_estimate_range_to_the_rule_engine() {
        let mut value = valid();
        value["estimate"] = json!(7);
        assert_eq!(validate_task_value(&value).unwrap().estimate, 7);
    }

    #[test]
    fn rejects_unparseable_output() {
        let err = validate_task_output("Sure! Here is your task: {").unwrap_err();
        assert!(matches!(err, SchemaViolation::Malformed(_)));
    }

    #[test]
    fn rejects_non_object() {
        assert_eq!(
            validate_task_output("[1, 2]").unwrap_err(),
            SchemaViolation::NotAnObject
        );
    }

    #[test]
    fn rejects_missing_field() {
        let mut value = valid();
        value.as_object_mut().unwrap().remove("risk");
        assert_eq!(
            validate_task_value(&value).unwrap_err(),
            SchemaViolation::MissingField("risk")
        );
    }

    #[test]
    fn rejects_wrong_types() {
        let mut value = valid();
        value["estimate"] = json!("3");
        assert_eq!(
            validate_task_value(&value).unwrap_err(),
            SchemaViolation::WrongType {
                field: "estimate",
                expected: "an integer"
            }
        );

        let mut value = valid();
        value["estimate"] = json!(2.5);
        assert!(matches!(
            validate_task_value(&value).unwrap_err(),
            SchemaViolation::WrongType { field: "estimate", .. }
        ));

        let mut value = valid();
        value["title"] = json!(42);
        assert!(matches!(
            validate_task_value(&value).unwrap_err(),
            SchemaViolation::WrongType { field: "title", .. }
        ));
    }

    #[test]
    fn rejects_out_of_enum_values() {
        let mut value = valid();
        value["risk"] = json!("Critical");
        assert!(matches!(
            validate_task_value(&value).unwrap_err(),
            SchemaViolation::OutOfEnum { field: "risk", .. }
        ));

        let mut value = valid();
        value["priority"] = json!("P1 (High)");
        assert!(matches!(
            validate_task_value(&value).unwrap_err(),
            SchemaViolation::OutOfEnum { field: "priority", .. }
        ));
    }

    #[test]
    fn rejects_blank_text() {
        let mut value = valid();
        value["description"] = json!("  ");
        assert_eq!(
            validate_task_value(&value).unwrap_err(),
            SchemaViolation::EmptyField("description")
        );
    }

    #[test]
    fn rejects_additional_fields() {
        let mut value = valid();
        value["assignee"] = json!("alice");
        assert_eq!(
            validate_task_value(&value).unwrap_err(),
            SchemaViolation::UnexpectedField("assignee".to_string())
        );
    }

    #[test]
    fn encoded_task_parses_back_identically() {
        let task = GeneratedTask {
            title: "Write runbook".to_string(),
            description: "Document the \"restore\" procedure.\nInclude rollback.".to_string(),
            estimate: 2,
            risk: Risk::Low,
            priority: Priority::P2,
        };

        let candidate = validate_task_output(&encode_task(&task)).unwrap();
        assert_eq!(candidate, TaskCandidate::from(task));
    }

    #[test]
    fn serialized_task_passes_validation_unchanged() {
        for (risk, priority) in Risk::ALL.into_iter().zip(Priority::ALL) {
            let task = GeneratedTask {
                title: "Add canary deploy".to_string(),
                description: "Route 5% of traffic to the new build, \u{e9}tape 1.".to_string(),
                estimate: 5,
                risk,
                priority,
            };

            let raw = serde_json::to_string(&task).unwrap();
            let candidate = validate_task_output(&raw).unwrap();

            assert_eq!(candidate, TaskCandidate::from(task));
        }
    }
}
