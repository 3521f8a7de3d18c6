use serde_json::Value;
use thiserror::Error;

/// A nested field a schema document must define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField {
    pub path: &'static [&'static str],
    pub description: &'static str,
}

impl RequiredField {
    /// Dotted form of the path, e.g. `properties.detail`.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Fields every platform event schema must declare.
pub const EVENT_SCHEMA_REQUIREMENTS: &[RequiredField] = &[
    RequiredField {
        path: &["type"],
        description: "root schema type",
    },
    RequiredField {
        path: &["properties"],
        description: "event envelope properties",
    },
    RequiredField {
        path: &["properties", "source"],
        description: "emitting application",
    },
    RequiredField {
        path: &["properties", "detail-type"],
        description: "event name",
    },
    RequiredField {
        path: &["properties", "detail"],
        description: "event payload",
    },
    RequiredField {
        path: &["properties", "detail", "properties"],
        description: "payload properties",
    },
];

/// A problem found while walking a schema document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("schema document must be a JSON object")]
    NotADocument,
    #[error("missing required field '{path}'")]
    MissingField { path: String },
    #[error("field '{path}' must be an object")]
    NotAnObject { path: String },
}

/// Checks that every required nested field is present.
///
/// All violations are returned, not only the first one. Paths sharing a
/// missing parent report the parent once.
pub fn validate_schema_document(
    document: &Value,
    requirements: &[RequiredField],
) -> Result<(), Vec<SchemaViolation>> {
    let Some(root) = document.as_object() else {
        return Err(vec![SchemaViolation::NotADocument]);
    };

    let mut violations: Vec<SchemaViolation> = Vec::new();

    for requirement in requirements {
        let mut current = root;
        for (depth, segment) in requirement.path.iter().enumerate() {
            let path = requirement.path[..=depth].join(".");
            let is_last = depth + 1 == requirement.path.len();

            let violation = match current.get(*segment) {
                None => SchemaViolation::MissingField { path },
                Some(_) if is_last => break,
                Some(Value::Object(next)) => {
                    current = next;
                    continue;
                }
                Some(_) => SchemaViolation::NotAnObject { path },
            };

            if !violations.contains(&violation) {
                violations.push(violation);
            }
            break;
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validates a document against [`EVENT_SCHEMA_REQUIREMENTS`].
pub fn validate_event_schema(document: &Value) -> Result<(), Vec<SchemaViolation>> {
    validate_schema_document(document, EVENT_SCHEMA_REQUIREMENTS)
}
