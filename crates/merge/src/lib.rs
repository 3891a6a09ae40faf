//! Deep-merge of JSON objects with override semantics.
//!
//! `merge(src, dest)` is right-biased: `dest` is preserved except where
//! `src` overrides it. Lists merge through `merge_lists`, which supports a
//! tagged `{"override": key, ...}` element that edits an existing
//! dest-element's `"value"` in place instead of appending a duplicate.

use model::{Error, JsonObject, JsonValue};

/// Deep-merges `src` into a copy of `dest`. `dest` wins for keys `src`
/// doesn't mention; `src` wins on scalar collisions; objects recurse;
/// arrays go through `merge_lists`.
pub fn merge(src: &JsonObject, dest: &JsonObject) -> Result<JsonObject, Error> {
    let mut out = dest.clone();
    for (key, src_value) in src {
        let merged = match (src_value, dest.get(key)) {
            (JsonValue::Object(s), Some(JsonValue::Object(d))) => JsonValue::Object(merge(s, d)?),
            (JsonValue::Array(s), Some(JsonValue::Array(d))) => JsonValue::Array(merge_lists(s, d)?),
            _ => src_value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    Ok(out)
}

/// Value-level entry point for callers that don't yet know both sides are
/// objects (e.g. property tests). Mirrors `merge` but operates on
/// `JsonValue` and requires both arguments to already be objects.
pub fn merge_values(src: &JsonValue, dest: &JsonValue) -> Result<JsonValue, Error> {
    match (src, dest) {
        (JsonValue::Object(s), JsonValue::Object(d)) => Ok(JsonValue::Object(merge(s, d)?)),
        _ => Err(Error::Config("merge requires both arguments to be objects".into())),
    }
}

/// Merges two JSON arrays. Starts from a copy of `dest`; each element of
/// `src` either edits a matched dest-element's `"value"` (when tagged
/// `{"override": key, ...}`) or is appended if structurally absent.
pub fn merge_lists(src: &[JsonValue], dest: &[JsonValue]) -> Result<Vec<JsonValue>, Error> {
    let mut out = dest.to_vec();
    for element in src {
        if let Some(key) = element.get("override").and_then(JsonValue::as_str) {
            apply_override(&mut out, key, element)?;
        } else if !out.iter().any(|d| d == element) {
            out.push(element.clone());
        }
    }
    Ok(out)
}

/// Value-level entry point requiring both arguments to be arrays; a fatal
/// `ConfigError` otherwise.
pub fn merge_lists_values(src: &JsonValue, dest: &JsonValue) -> Result<JsonValue, Error> {
    match (src, dest) {
        (JsonValue::Array(s), JsonValue::Array(d)) => Ok(JsonValue::Array(merge_lists(s, d)?)),
        _ => Err(Error::Config(
            "merge_lists requires both arguments to be arrays".into(),
        )),
    }
}

fn apply_override(dest: &mut [JsonValue], key: &str, element: &JsonValue) -> Result<(), Error> {
    let match_value = element.get(key);

    let Some(target) = dest
        .iter_mut()
        .find(|d| d.get(key).is_some() && d.get(key) == match_value)
    else {
        tracing::warn!(
            override_key = key,
            value = ?element.get("value"),
            "override entry matched no destination element; discarding"
        );
        return Ok(());
    };

    let new_value = element
        .get("value")
        .ok_or_else(|| Error::Config(format!("override entry for \"{key}\" is missing \"value\"")))?;

    let target_obj = target
        .as_object_mut()
        .ok_or_else(|| Error::Config("override target must be an object".into()))?;

    if !target_obj.contains_key("value") {
        return Err(Error::Config(format!(
            "override target for \"{key}\" has no existing \"value\" to replace"
        )));
    }
    target_obj.insert("value".to_string(), new_value.clone());
    Ok(())
}

/// Folds an extend stack (deepest ancestor last) into a single object.
/// Each element contributes either its `"changes"` sub-object (if present)
/// or itself with the reserved `"extends"` key stripped.
pub fn fold_stack(stack: &[JsonObject]) -> Result<JsonObject, Error> {
    let mut acc = JsonObject::new();
    for element in stack.iter().rev() {
        let layer = match element.get("changes") {
            Some(JsonValue::Object(changes)) => changes.clone(),
            Some(_) => return Err(Error::Config("\"changes\" must be an object".into())),
            None => {
                let mut copy = element.clone();
                copy.remove("extends");
                copy
            }
        };
        acc = merge(&layer, &acc)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: JsonValue) -> JsonObject {
        match v {
            JsonValue::Object(o) => o,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn merge_identity_laws() {
        let a = obj(json!({"x": 1, "y": [1, 2]}));
        assert_eq!(merge(&a, &JsonObject::new()).unwrap(), a);
        assert_eq!(merge(&JsonObject::new(), &a).unwrap(), a);
    }

    #[test]
    fn s1_simple_merge() {
        let src = obj(json!({"a": 1, "b": 3, "c": 3}));
        let dest = obj(json!({"a": 1, "b": 2, "d": 4}));
        let got = merge(&src, &dest).unwrap();
        assert_eq!(JsonValue::Object(got), json!({"a": 1, "b": 3, "c": 3, "d": 4}));
    }

    #[test]
    fn s2_changes_layering() {
        let stack = vec![
            obj(json!({"changes": {"b": {"c": 4}}})),
            obj(json!({"a": 1, "b": {"c": 2, "d": 3}})),
        ];
        let got = fold_stack(&stack).unwrap();
        assert_eq!(JsonValue::Object(got), json!({"a": 1, "b": {"c": 4, "d": 3}}));
    }

    #[test]
    fn s4_list_override() {
        let src = obj(json!({"a": [
            {"key": "key1", "value": "blah", "override": "key"},
            {"key": "key3", "value": "value3"},
        ]}));
        let dest = obj(json!({"a": [
            {"key": "key1", "value": "value1"},
            {"key": "key2", "value": "value2"},
        ]}));
        let got = merge(&src, &dest).unwrap();
        assert_eq!(
            JsonValue::Object(got),
            json!({"a": [
                {"key": "key1", "value": "blah"},
                {"key": "key2", "value": "value2"},
                {"key": "key3", "value": "value3"},
            ]})
        );
    }

    #[test]
    fn merge_lists_never_shortens_dest() {
        let dest = vec![json!(1), json!(2), json!(3)];
        let src = vec![json!(1)];
        let got = merge_lists(&src, &dest).unwrap();
        assert!(got.len() >= dest.len());
    }

    #[test]
    fn override_without_value_is_fatal() {
        let src = obj(json!({"a": [{"key": "k1", "override": "key"}]}));
        let dest = obj(json!({"a": [{"key": "k1", "value": "v1"}]}));
        assert!(merge(&src, &dest).is_err());
    }

    #[test]
    fn override_with_no_match_is_discarded_not_fatal() {
        let src = obj(json!({"a": [{"key": "nope", "value": "v", "override": "key"}]}));
        let dest = obj(json!({"a": [{"key": "k1", "value": "v1"}]}));
        let got = merge(&src, &dest).unwrap();
        assert_eq!(JsonValue::Object(got), json!({"a": [{"key": "k1", "value": "v1"}]}));
    }

    #[test]
    fn fold_stack_leaf_only_is_identity_sans_reserved_keys() {
        let leaf = obj(json!({"a": 1, "b": 2}));
        let got = fold_stack(std::slice::from_ref(&leaf)).unwrap();
        assert_eq!(got, leaf);
    }
}
