//! Structural shape matching between a decoded candidate and a target schema.
//!
//! Two values match when they are the same JSON kind and, for objects, carry
//! the same key set. Only values that are objects *in the target* are walked
//! further. Everything else is compared by kind alone:
//!
//! - Arrays are not walked element-wise, so `{"a": [1, 2]}` matches
//!   `{"a": ["x"]}`.
//! - Scalars under a matching key are not type-checked, so `{"a": 1}`
//!   matches `{"a": "str"}`.
//!
//! This is a known precision gap of the shape policy, not something to
//! tighten here.
//!
//! The walk uses an explicit stack so arbitrarily deep documents cannot
//! exhaust the call stack. Decoded JSON is always a tree, so no cycle
//! tracking is needed.

use serde_json::Value;
use std::fmt;

/// The six JSON value kinds, each distinct for matching purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => JsonKind::Object,
            Value::Array(_) => JsonKind::Array,
            Value::String(_) => JsonKind::String,
            Value::Number(_) => JsonKind::Number,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Null => JsonKind::Null,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Object => "object",
            JsonKind::Array => "array",
            JsonKind::String => "string",
            JsonKind::Number => "number",
            JsonKind::Boolean => "boolean",
            JsonKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// Check whether `output` has the shape described by `target`.
pub fn matches(output: &Value, target: &Value) -> bool {
    let mut pending: Vec<(&Value, &Value)> = vec![(output, target)];

    while let Some((out, tgt)) = pending.pop() {
        if JsonKind::of(out) != JsonKind::of(tgt) {
            return false;
        }

        let (Value::Object(out_map), Value::Object(tgt_map)) = (out, tgt) else {
            continue;
        };

        if out_map.len() != tgt_map.len() || !out_map.keys().all(|k| tgt_map.contains_key(k)) {
            return false;
        }

        for (key, tgt_child) in tgt_map {
            if !tgt_child.is_object() {
                continue;
            }
            match out_map.get(key) {
                Some(out_child) => pending.push((out_child, tgt_child)),
                None => return false,
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_key_set_sensitivity() {
        assert!(!matches(&json!({"a": 1}), &json!({"b": 1})));
        assert!(!matches(&json!({"a": 1, "b": 2}), &json!({"a": 1})));
        assert!(!matches(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }

    #[test]
    fn test_key_order_irrelevant() {
        assert!(matches(&json!({"b": 1, "a": 2}), &json!({"a": "x", "b": "y"})));
    }

    #[test]
    fn test_arrays_are_not_walked() {
        assert!(matches(&json!({"a": [1, 2, 3]}), &json!({"a": ["x"]})));
        assert!(matches(&json!([{"x": 1}]), &json!([])));
    }

    #[test]
    fn test_scalars_under_matching_keys_not_type_checked() {
        assert!(matches(&json!({"name": 42}), &json!({"name": "str"})));
        assert!(matches(&json!({"name": null}), &json!({"name": [1]})));
    }

    #[test]
    fn test_nested_object_recursion() {
        assert!(matches(&json!({"a": {"x": 1}}), &json!({"a": {"x": 2}})));
        assert!(!matches(&json!({"a": {"x": 1}}), &json!({"a": {"y": 2}})));
    }

    #[test]
    fn test_nested_object_required_where_target_has_one() {
        assert!(!matches(&json!({"a": "flat"}), &json!({"a": {"x": 1}})));
    }

    #[test]
    fn test_candidate_object_under_scalar_target_matches() {
        assert!(matches(&json!({"a": {"x": 1}}), &json!({"a": "str"})));
    }

    #[test]
    fn test_top_level_kind_mismatch() {
        assert!(!matches(&json!([]), &json!({})));
        assert!(!matches(&json!("1"), &json!(1)));
        assert!(!matches(&json!(null), &json!(false)));
    }

    #[test]
    fn test_same_kind_scalars_match() {
        assert!(matches(&json!(1), &json!(2.5)));
        assert!(matches(&json!("a"), &json!("b")));
        assert!(matches(&json!(null), &json!(null)));
    }

    #[test]
    fn test_empty_objects_match() {
        assert!(matches(&json!({}), &json!({})));
        assert!(matches(&json!({"a": {}}), &json!({"a": {}})));
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut output = json!({});
        let mut target = json!({});
        for _ in 0..10_000 {
            output = json!({ "k": output });
            target = json!({ "k": target });
        }
        assert!(matches(&output, &target));

        // serde_json drops nested values recursively; leak them so the test
        // only exercises the matcher.
        std::mem::forget(output);
        std::mem::forget(target);
    }

    #[test]
    fn test_kind_of() {
        assert_eq!(JsonKind::of(&json!({})), JsonKind::Object);
        assert_eq!(JsonKind::of(&json!(true)), JsonKind::Boolean);
        assert_eq!(JsonKind::of(&json!(1)).to_string(), "number");
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z ]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_matches_is_reflexive(value in arb_json()) {
            prop_assert!(matches(&value, &value));
        }

        #[test]
        fn prop_extra_key_breaks_match(value in arb_json()) {
            if let Value::Object(mut map) = value.clone() {
                map.insert("__extra__".to_string(), Value::Null);
                prop_assert!(!matches(&Value::Object(map), &value));
            }
        }
    }
}
