//! Structural checks for event schema documents.

mod validation;

pub use validation::{
    validate_event_schema, validate_schema_document, RequiredField, SchemaViolation,
    EVENT_SCHEMA_REQUIREMENTS,
};
