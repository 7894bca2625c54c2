//! Request input validation.
//!
//! Validation is a separate stage that runs before any coordinator flow:
//! handlers call [`validate_input`] and only pass inputs that produced no
//! report to [`AuthCoordinator`](crate::coordinator::AuthCoordinator).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for the registration flow.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpInput {
    #[validate(email(message = "Incorrect email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: String,
}

/// Input for the authentication flow.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInInput {
    #[validate(email(message = "Incorrect email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Structured validation result: field name to the messages it failed with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<validator::ValidationErrors> for ValidationReport {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        Self { fields }
    }
}

/// Run the declarative rules on `input`.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ValidationReport> {
    input.validate().map_err(ValidationReport::from)
}
