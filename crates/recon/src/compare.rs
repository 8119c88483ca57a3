use crate::model::{FieldValue, Record};

/// Null-safe equality: both null, or both non-null with equal string forms.
pub fn values_equal(left: &FieldValue, right: &FieldValue) -> bool {
    match (left.as_text(), right.as_text()) {
        (None, None) => true,
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Names of `fields` whose values differ between the two records, in order.
pub fn differing_fields(left: &Record, right: &Record, fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .filter(|name| !values_equal(left.get(name), right.get(name)))
        .cloned()
        .collect()
}
