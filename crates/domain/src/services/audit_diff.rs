//! Field-level diff of audit snapshots.
//!
//! Values are compared structurally: two nested objects or arrays with the
//! same content are equal regardless of where they came from. A key missing
//! from one side never equals a present value, including `null`. Numbers
//! compare by value, so `1` and `1.0` are equal.

use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

use crate::models::{FieldDiff, Snapshot};

/// Diff two optional snapshots.
///
/// Returns one entry per key in either snapshot, ordered by key. Both
/// snapshots absent yields an empty vector.
pub fn diff(old_values: Option<&Snapshot>, new_values: Option<&Snapshot>) -> Vec<FieldDiff> {
    let keys: BTreeSet<&String> = old_values
        .into_iter()
        .flat_map(|m| m.keys())
        .chain(new_values.into_iter().flat_map(|m| m.keys()))
        .collect();

    keys.into_iter()
        .map(|key| {
            let old = old_values.and_then(|m| m.get(key));
            let new = new_values.and_then(|m| m.get(key));
            FieldDiff {
                key: key.clone(),
                old_value: old.cloned(),
                new_value: new.cloned(),
                changed: !present_values_equal(old, new),
            }
        })
        .collect()
}

fn present_values_equal(old: Option<&JsonValue>, new: Option<&JsonValue>) -> bool {
    match (old, new) {
        (Some(a), Some(b)) => values_equal(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn values_equal(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(l), Some(r)) if l == r)
        }
        (JsonValue::Array(xs), JsonValue::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (JsonValue::Object(xs), JsonValue::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Diff two raw JSON columns.
///
/// Anything other than a JSON object (including `null`) is treated as an
/// absent snapshot.
pub fn diff_from_json(
    old_values: Option<&JsonValue>,
    new_values: Option<&JsonValue>,
) -> Vec<FieldDiff> {
    diff(
        old_values.and_then(JsonValue::as_object),
        new_values.and_then(JsonValue::as_object),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: JsonValue) -> Snapshot {
        value.as_object().cloned().unwrap()
    }

    fn keys(diffs: &[FieldDiff]) -> Vec<&str> {
        diffs.iter().map(|d| d.key.as_str()).collect()
    }

    #[test]
    fn test_diff_both_absent_is_empty() {
        assert!(diff(None, None).is_empty());
    }

    #[test]
    fn test_diff_scalar_change() {
        let old = snapshot(json!({"a": 1, "b": 2}));
        let new = snapshot(json!({"a": 1, "b": 3}));

        let result = diff(Some(&old), Some(&new));
        assert_eq!(keys(&result), vec!["a", "b"]);
        assert!(!result[0].changed);
        assert!(result[1].changed);
        assert_eq!(result[1].old_value, Some(json!(2)));
        assert_eq!(result[1].new_value, Some(json!(3)));
    }

    #[test]
    fn test_diff_nested_values_compared_structurally() {
        let old = snapshot(json!({"a": {"x": 1, "tags": ["gst", "q1"]}}));
        let new = snapshot(json!({"a": {"tags": ["gst", "q1"], "x": 1}}));

        let result = diff(Some(&old), Some(&new));
        assert_eq!(result.len(), 1);
        assert!(!result[0].changed);
    }

    #[test]
    fn test_diff_numbers_compare_by_value() {
        let old = snapshot(json!({"amount": 1, "meta": {"rate": [2, 0.5]}, "code": 1}));
        let new = snapshot(json!({"amount": 1.0, "meta": {"rate": [2.0, 0.5]}, "code": "1"}));

        let result = diff(Some(&old), Some(&new));
        assert_eq!(keys(&result), vec!["amount", "code", "meta"]);
        assert!(!result[0].changed);
        assert!(result[1].changed);
        assert!(!result[2].changed);
    }

    #[test]
    fn test_diff_array_order_matters() {
        let old = snapshot(json!({"tags": ["a", "b"]}));
        let new = snapshot(json!({"tags": ["b", "a"]}));
        assert!(diff(Some(&old), Some(&new))[0].changed);
    }

    #[test]
    fn test_diff_creation_event() {
        let new = snapshot(json!({"status": "Not Started", "title": "GSTR-1"}));

        let result = diff(None, Some(&new));
        assert_eq!(keys(&result), vec!["status", "title"]);
        for field in &result {
            assert!(field.changed);
            assert!(field.old_value.is_none());
            assert!(field.new_value.is_some());
        }
    }

    #[test]
    fn test_diff_deletion_event() {
        let old = snapshot(json!({"status": "Filed"}));

        let result = diff(Some(&old), None);
        assert_eq!(result.len(), 1);
        assert!(result[0].changed);
        assert!(result[0].new_value.is_none());
    }

    #[test]
    fn test_diff_absent_differs_from_null() {
        let old = snapshot(json!({}));
        let new = snapshot(json!({"assignee": null}));

        let result = diff(Some(&old), Some(&new));
        assert_eq!(result.len(), 1);
        assert!(result[0].changed);
        assert_eq!(result[0].old_value, None);
        assert_eq!(result[0].new_value, Some(JsonValue::Null));
    }

    #[test]
    fn test_diff_null_on_both_sides_unchanged() {
        let old = snapshot(json!({"assignee": null}));
        let new = snapshot(json!({"assignee": null}));
        assert!(!diff(Some(&old), Some(&new))[0].changed);
    }

    #[test]
    fn test_diff_type_change_detected() {
        let old = snapshot(json!({"amount": 1}));
        let new = snapshot(json!({"amount": "1"}));
        assert!(diff(Some(&old), Some(&new))[0].changed);
    }

    #[test]
    fn test_diff_one_entry_per_key_in_union() {
        let old = snapshot(json!({"a": 1, "b": 2, "c": 3}));
        let new = snapshot(json!({"b": 2, "c": 4, "d": 5}));

        let result = diff(Some(&old), Some(&new));
        assert_eq!(keys(&result), vec!["a", "b", "c", "d"]);
        let changed: Vec<bool> = result.iter().map(|d| d.changed).collect();
        assert_eq!(changed, vec![true, false, true, true]);
    }

    #[test]
    fn test_diff_is_idempotent() {
        let old = snapshot(json!({"a": [1, 2, {"z": true}], "b": "x"}));
        let new = snapshot(json!({"a": [1, 2, {"z": false}], "c": null}));

        let first = diff(Some(&old), Some(&new));
        let second = diff(Some(&old), Some(&new));
        assert_eq!(first, second);
    }

    #[test]
    fn test_diff_from_json_treats_non_objects_as_absent() {
        let new = json!({"status": "Filed"});
        let result = diff_from_json(Some(&JsonValue::Null), Some(&new));
        assert_eq!(result.len(), 1);
        assert!(result[0].old_value.is_none());

        assert!(diff_from_json(Some(&json!([1, 2])), None).is_empty());
        assert!(diff_from_json(None, None).is_empty());
    }
}
