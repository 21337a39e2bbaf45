//! Shapes a submitted form into the confirmation API request body

use serde_json::{Map, Value as JsonValue};

use crate::domain::entities::FormPayload;
use crate::errors::{DomainResult, ValidationError};

pub const REQUIRED_FIELDS: &[&str] = &["firstName", "lastName"];

pub const OPTIONAL_FIELDS: &[&str] = &[
    "middleName",
    "birthDate",
    "gender",
    "streetAddressLine1",
    "streetAddressLine2",
    "city",
    "state",
    "zipCode",
    "country",
];

/// Values the sandbox needs when the form leaves them blank
const SANDBOX_DEFAULTS: &[(&str, &str)] = &[
    ("streetAddressLine1", "123 MAIN ST"),
    ("city", "ANNISTON"),
    ("state", "AL"),
    ("country", "USA"),
];

fn field<'a>(payload: &'a FormPayload, name: &str) -> Option<&'a str> {
    payload
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// Build the JSON body. Unknown form keys are dropped.
pub fn build_request_body(payload: &FormPayload) -> DomainResult<JsonValue> {
    let mut body = Map::new();

    for name in REQUIRED_FIELDS {
        let value = field(payload, name).ok_or_else(|| ValidationError::required(*name))?;
        body.insert(name.to_string(), JsonValue::String(value.to_string()));
    }

    for name in OPTIONAL_FIELDS {
        if let Some(value) = field(payload, name) {
            body.insert(name.to_string(), JsonValue::String(value.to_string()));
        }
    }

    for (name, default) in SANDBOX_DEFAULTS {
        body.entry(name.to_string())
            .or_insert_with(|| JsonValue::String(default.to_string()));
    }

    Ok(JsonValue::Object(body))
}
