//! Schema registry for the two contracts the pipeline checks: the oracle
//! payload envelope on the way in and the report draft on the way out.
//!
//! Schemas are built at construction time using [`schemars::schema_for!`]
//! and checked with `jsonschema`.

use std::collections::HashMap;

use est_core::entities::ReportDraft;
use schemars::schema_for;

use crate::envelope::{PayloadEnvelope, RECORD_COLLECTIONS};
use crate::error::SchemaError;

pub const PAYLOAD_ENVELOPE: &str = "payload_envelope";
pub const REPORT_DRAFT: &str = "report_draft";

/// Named JSON Schemas for the checked contracts.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`.
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert(
            $name,
            serde_json::to_value(schema_for!($ty)).unwrap_or_default(),
        );
    };
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        register!(schemas, PAYLOAD_ENVELOPE, PayloadEnvelope);
        register!(schemas, REPORT_DRAFT, ReportDraft);

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Check that a raw payload is an object whose record collections are
    /// arrays.
    ///
    /// The registered envelope schema only knows the canonical key of each
    /// collection, so aliased keys are type-checked here as well.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` describing every offending key.
    pub fn check_envelope(&self, payload: &serde_json::Value) -> Result<(), SchemaError> {
        let Some(object) = payload.as_object() else {
            return Err(SchemaError::ValidationFailed {
                errors: vec![format!("payload is {}, expected an object", json_type(payload))],
            });
        };
        self.validate(PAYLOAD_ENVELOPE, payload)?;

        let errors: Vec<String> = RECORD_COLLECTIONS
            .iter()
            .flat_map(|keys| keys.iter().skip(1))
            .filter_map(|key| {
                object
                    .get(*key)
                    .filter(|v| !v.is_null() && !v.is_array())
                    .map(|v| format!("'{key}' is {}, expected an array", json_type(v)))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Check an assembled report against the persisted report shape.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` if the serialized draft does
    /// not match its schema.
    pub fn check_report_draft(&self, draft: &ReportDraft) -> Result<(), SchemaError> {
        let instance = serde_json::to_value(draft).map_err(|e| SchemaError::ValidationFailed {
            errors: vec![format!("report draft does not serialize: {e}")],
        })?;
        self.validate(REPORT_DRAFT, &instance)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
