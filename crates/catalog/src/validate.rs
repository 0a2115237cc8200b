//! Field-level validation accumulator.

use std::collections::BTreeMap;

/// Collects validation failures keyed by field name.
///
/// Only the first failure recorded for a field is kept; later checks
/// against the same field do not overwrite it. The map is rendered
/// verbatim as the 422 response body, so messages must stay client-safe.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no failure has been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a failure for `field` unless one is already present.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record a failure for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Consume the validator, yielding the field-to-message map.
    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}
