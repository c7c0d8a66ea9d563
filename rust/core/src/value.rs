// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged scalar values and ordered attribute maps.
//!
//! Property and quantity sets have no fixed schema, so their contents are
//! kept as a string-keyed map of tagged scalars.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Attribute name → value, iterated in key order.
pub type AttributeMap = BTreeMap<String, Value>;

impl Value {
    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of integer and real values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// String view of text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" on whole numbers
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// One attribute-level difference between two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum FieldChange {
    Changed { field: String, from: Value, to: Value },
    Added { field: String, value: Value },
    Removed { field: String, value: Value },
}

impl FieldChange {
    pub fn field(&self) -> &str {
        match self {
            FieldChange::Changed { field, .. }
            | FieldChange::Added { field, .. }
            | FieldChange::Removed { field, .. } => field,
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldChange::Changed { field, from, to } => write!(f, "{field}: {from} \u{2192} {to}"),
            FieldChange::Added { field, value } => write!(f, "{field}: added {value}"),
            FieldChange::Removed { field, value } => write!(f, "{field}: removed {value}"),
        }
    }
}

/// Key-by-key comparison of two attribute maps, in key order.
pub fn diff_attributes(before: &AttributeMap, after: &AttributeMap) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    for (field, from) in before {
        match after.get(field) {
            Some(to) if to != from => changes.push(FieldChange::Changed {
                field: field.clone(),
                from: from.clone(),
                to: to.clone(),
            }),
            Some(_) => {}
            None => changes.push(FieldChange::Removed {
                field: field.clone(),
                value: from.clone(),
            }),
        }
    }
    for (field, value) in after {
        if !before.contains_key(field) {
            changes.push(FieldChange::Added {
                field: field.clone(),
                value: value.clone(),
            });
        }
    }
    changes.sort_by(|a, b| a.field().cmp(b.field()));
    changes
}

/// Round to a fixed number of decimal places.
///
/// Negative zero is normalized to zero so rounded values compare equal.
#[inline]
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn display_keeps_real_formatting() {
        assert_eq!(Value::Real(10.0).to_string(), "10.0");
        assert_eq!(Value::Real(12.5).to_string(), "12.5");
        assert_eq!(Value::Integer(3).to_string(), "3");
        assert_eq!(Value::from("Concrete").to_string(), "Concrete");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some(1.5)), Value::Real(1.5));
    }

    #[test]
    fn untagged_json_values() {
        let parsed: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 3.5, 10.0, "EI60"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Integer(3),
                Value::Real(3.5),
                Value::Real(10.0),
                Value::Text("EI60".to_string()),
            ]
        );
    }

    #[test]
    fn diff_attributes_reports_each_kind() {
        let before: AttributeMap = [
            ("FireRating".to_string(), Value::from("EI30")),
            ("IsExternal".to_string(), Value::Bool(true)),
            ("Reference".to_string(), Value::from("W-01")),
        ]
        .into_iter()
        .collect();
        let after: AttributeMap = [
            ("FireRating".to_string(), Value::from("EI60")),
            ("IsExternal".to_string(), Value::Bool(true)),
            ("LoadBearing".to_string(), Value::Bool(false)),
        ]
        .into_iter()
        .collect();

        let changes = diff_attributes(&before, &after);
        let rendered: Vec<String> = changes.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "FireRating: EI30 \u{2192} EI60",
                "LoadBearing: added false",
                "Reference: removed W-01",
            ]
        );
        assert!(diff_attributes(&before, &before).is_empty());
    }

    #[test]
    fn round_decimals_normalizes() {
        assert_relative_eq!(round_decimals(1.23456, 3), 1.235, epsilon = 1e-12);
        assert_relative_eq!(round_decimals(0.123456, 4), 0.1235, epsilon = 1e-12);
        assert_relative_eq!(round_decimals(12.49996, 4), 12.5, epsilon = 1e-12);
        assert_eq!(round_decimals(-0.0001, 3).to_bits(), 0.0f64.to_bits());
    }
}
