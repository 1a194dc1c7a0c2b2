//! Signature: the named, typed interface a [`crate::Module`] implements.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single named field of a [`Signature`], with an optional JSON-Schema-like
/// validator describing the shape of values bound to it.
///
/// `validator` is deliberately a plain [`serde_json::Value`] rather than a
/// function: signatures must be `Clone`/`Serialize` so they can be carried
/// inside a persisted [`crate::Module`] and across the archive boundary.
/// `None` means "accept any JSON value".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name. Must be a valid JSON object key (any non-empty string is
    /// accepted; Rust's `serde_json` has no further key restriction).
    pub name: String,
    /// Optional JSON-Schema fragment describing acceptable values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<serde_json::Value>,
    /// Whether this field must be present for a parsed response to count
    /// as `ok` (§4.1). Output fields default to required; a missing
    /// non-required field is filled with `null` instead of failing the
    /// parse.
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl Field {
    /// Construct a required field with no validator.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validator: None,
            required: true,
        }
    }

    /// Construct a required field with a JSON-Schema-shaped validator.
    pub fn with_validator(name: impl Into<String>, validator: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            validator: Some(validator),
            required: true,
        }
    }

    /// Return a clone of this field marked optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Check `value` against the validator's `"type"` key, if present.
    /// Fields with no validator, or a validator with no `"type"`, accept
    /// anything.
    #[must_use]
    pub fn validate(&self, value: &serde_json::Value) -> bool {
        let Some(schema) = &self.validator else {
            return true;
        };
        let Some(ty) = schema.get("type").and_then(|v| v.as_str()) else {
            return true;
        };
        match ty {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            "null" => value.is_null(),
            _ => true,
        }
    }
}

/// Error raised when constructing a [`Signature`] with invalid fields.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Two fields on the same side share a name.
    #[error("duplicate field name on {side}: {name}")]
    DuplicateField {
        /// Which side the duplicate occurred on ("inputs" or "outputs").
        side: &'static str,
        /// The duplicated field name.
        name: String,
    },
    /// The same field name appears on both sides.
    #[error("field name present in both inputs and outputs: {0}")]
    NotDisjoint(String),
}

/// Named interface describing a module's inputs and outputs.
///
/// Invariant: input and output field names are each unique, and the two
/// sets are disjoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Signature name, used for display and archive task-type tagging.
    pub name: String,
    /// Input fields, in declaration order.
    pub inputs: Vec<Field>,
    /// Output fields, in declaration order.
    pub outputs: Vec<Field>,
}

impl Signature {
    /// Construct a signature, validating field-name uniqueness and
    /// input/output disjointness.
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Field>,
        outputs: Vec<Field>,
    ) -> Result<Self, SignatureError> {
        Self::check_unique("inputs", &inputs)?;
        Self::check_unique("outputs", &outputs)?;

        let input_names: HashSet<&str> = inputs.iter().map(|f| f.name.as_str()).collect();
        for f in &outputs {
            if input_names.contains(f.name.as_str()) {
                return Err(SignatureError::NotDisjoint(f.name.clone()));
            }
        }

        Ok(Self {
            name: name.into(),
            inputs,
            outputs,
        })
    }

    fn check_unique(side: &'static str, fields: &[Field]) -> Result<(), SignatureError> {
        let mut seen = HashSet::new();
        for f in fields {
            if !seen.insert(f.name.as_str()) {
                return Err(SignatureError::DuplicateField {
                    side,
                    name: f.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Output field names, in declaration order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|f| f.name.as_str())
    }

    /// Input field names, in declaration order.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|f| f.name.as_str())
    }
}

/// A user-expressed preference, either a recognized symbolic tag or an
/// arbitrary natural-language string.
///
/// `Ctx::priority` is this type internally; it resolves the wire-level
/// "symbolic value or arbitrary string" distinction from the external
/// interface at the parse boundary, so downstream code (the selector) can
/// match on a closed set of variants instead of re-parsing strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Highest accuracy regardless of cost or latency.
    Best,
    /// Lowest latency.
    Fast,
    /// Lowest cost.
    Cheap,
    /// Most thorough output.
    Verbose,
    /// Arbitrary natural-language priority text.
    #[serde(untagged)]
    Text(String),
}

impl Priority {
    /// Parse a priority string, recognizing the four symbolic spellings
    /// case-insensitively and falling back to [`Priority::Text`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Priority::Best,
            "fast" => Priority::Fast,
            "cheap" => Priority::Cheap,
            "verbose" => Priority::Verbose,
            _ => Priority::Text(s.to_string()),
        }
    }

    /// The raw text of this priority, whether symbolic or free-form.
    pub fn as_str(&self) -> &str {
        match self {
            Priority::Best => "best",
            Priority::Fast => "fast",
            Priority::Cheap => "cheap",
            Priority::Verbose => "verbose",
            Priority::Text(s) => s.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signature_rejects_duplicate_inputs() {
        let err = Signature::new(
            "sig",
            vec![Field::new("a"), Field::new("a")],
            vec![Field::new("b")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SignatureError::DuplicateField {
                side: "inputs",
                name: "a".into()
            }
        );
    }

    #[test]
    fn signature_rejects_overlapping_sides() {
        let err = Signature::new("sig", vec![Field::new("a")], vec![Field::new("a")]).unwrap_err();
        assert_eq!(err, SignatureError::NotDisjoint("a".into()));
    }

    #[test]
    fn signature_accepts_disjoint_unique_fields() {
        let sig = Signature::new("sig", vec![Field::new("a")], vec![Field::new("b")]).unwrap();
        assert_eq!(sig.input_names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(sig.output_names().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn field_validates_declared_type() {
        let f = Field::with_validator("n", json!({"type": "number"}));
        assert!(f.validate(&json!(3.0)));
        assert!(!f.validate(&json!("nope")));
    }

    #[test]
    fn field_with_no_validator_accepts_anything() {
        let f = Field::new("x");
        assert!(f.validate(&json!(null)));
        assert!(f.validate(&json!({"a": 1})));
    }

    #[test]
    fn priority_parses_symbolic_case_insensitive() {
        assert_eq!(Priority::parse("Fast"), Priority::Fast);
        assert_eq!(Priority::parse("CHEAP"), Priority::Cheap);
        assert_eq!(Priority::parse("best"), Priority::Best);
        assert_eq!(Priority::parse("Verbose"), Priority::Verbose);
    }

    #[test]
    fn priority_falls_back_to_text() {
        assert_eq!(
            Priority::parse("cheap and fast"),
            Priority::Text("cheap and fast".into())
        );
    }
}
