use crate::value::Value;
use std::cmp::Ordering;

/// Equality with numeric widening.
///
/// Int, Uint and Float64 compare by numeric value; every other pairing
/// requires the same variant.
#[must_use]
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    if left.is_numeric() && right.is_numeric() {
        return numeric_cmp(left, right) == Some(Ordering::Equal);
    }

    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| loose_eq(a, b))
        }
        _ => left == right,
    }
}

/// Partial ordering for orderable pairs.
///
/// Returns `None` for mismatched or non-orderable variants, which makes
/// every ordering predicate evaluate to false.
#[must_use]
pub fn loose_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    if left.is_numeric() && right.is_numeric() {
        return numeric_cmp(left, right);
    }

    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// True when `haystack` includes `needle`.
///
/// Lists test membership; text tests for a substring.
#[must_use]
pub fn includes(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::List(items), needle) => items.iter().any(|item| loose_eq(item, needle)),
        (Value::Text(text), Value::Text(sub)) => text.contains(sub.as_str()),
        _ => false,
    }
}

// Integers compare exactly; anything involving a float goes through f64.
fn numeric_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Uint(a), Value::Uint(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Uint(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
        (Value::Uint(a), Value::Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
        _ => left.as_f64()?.partial_cmp(&right.as_f64()?),
    }
}
