use model::{JsonObject, JsonValue};

/// True iff `desired` and `observed` differ in their port surface, with
/// the special rule that a `0` in `desired.ports` ("assign dynamically")
/// never counts as a diff.
pub fn is_port_update(desired: &JsonObject, observed: &JsonObject) -> bool {
    ports_differ(desired.get("ports"), observed.get("ports"))
        || port_definitions_differ(desired.get("portDefinitions"), observed.get("portDefinitions"))
}

fn ports_differ(desired: Option<&JsonValue>, observed: Option<&JsonValue>) -> bool {
    let (desired, observed) = match (
        desired.and_then(JsonValue::as_array),
        observed.and_then(JsonValue::as_array),
    ) {
        (Some(d), Some(o)) => (d, o),
        (None, None) => return false,
        _ => return true,
    };

    if desired.len() != observed.len() {
        return true;
    }

    desired.iter().zip(observed.iter()).any(|(d, o)| {
        let is_dynamic = d.as_i64() == Some(0);
        !is_dynamic && d != o
    })
}

fn port_definitions_differ(desired: Option<&JsonValue>, observed: Option<&JsonValue>) -> bool {
    let (desired, observed) = match (
        desired.and_then(JsonValue::as_array),
        observed.and_then(JsonValue::as_array),
    ) {
        (Some(d), Some(o)) => (d, o),
        (None, None) => return false,
        _ => return true,
    };

    if desired.len() != observed.len() {
        return true;
    }

    desired.iter().zip(observed.iter()).any(|(d, o)| {
        let mut d = d.clone();
        if d.get("port").and_then(JsonValue::as_i64) == Some(0) {
            if let (Some(o_port), Some(obj)) = (o.get("port").cloned(), d.as_object_mut()) {
                obj.insert("port".to_string(), o_port);
            }
        }
        &combine(o, &d) != o
    })
}

/// Deeply overlays `src` onto a copy of `dst`: objects recurse key-by-key,
/// arrays of equal length combine pairwise (a length mismatch takes `src`
/// wholesale), scalars take `src`.
pub fn combine(dst: &JsonValue, src: &JsonValue) -> JsonValue {
    match (dst, src) {
        (JsonValue::Object(d), JsonValue::Object(s)) => {
            let mut out = d.clone();
            for (key, src_value) in s {
                let combined = match d.get(key) {
                    Some(dst_value) => combine(dst_value, src_value),
                    None => src_value.clone(),
                };
                out.insert(key.clone(), combined);
            }
            JsonValue::Object(out)
        }
        (JsonValue::Array(d), JsonValue::Array(s)) if d.len() == s.len() => {
            JsonValue::Array(d.iter().zip(s.iter()).map(|(d, s)| combine(d, s)).collect())
        }
        (_, src) => src.clone(),
    }
}

/// True iff a non-port field differs between `desired` and `observed`.
pub fn is_update(desired: &JsonObject, observed: &JsonObject) -> bool {
    if is_port_update(desired, observed) {
        return true;
    }

    let mut stripped = desired.clone();
    stripped.remove("ports");
    stripped.remove("portDefinitions");

    let observed_value = JsonValue::Object(observed.clone());
    let combined = combine(&observed_value, &JsonValue::Object(stripped));
    combined != observed_value
}

/// True iff `desired.instances` is present, differs from
/// `observed.instances`, and substituting the observed value makes
/// `is_update` false -- i.e. the only real difference is instance count.
pub fn is_scale_only_update(desired: &JsonObject, observed: &JsonObject) -> bool {
    let (Some(desired_instances), Some(observed_instances)) = (
        desired.get("instances").and_then(coerce_i64),
        observed.get("instances").and_then(coerce_i64),
    ) else {
        return false;
    };

    if desired_instances == observed_instances {
        return false;
    }

    let mut adjusted = desired.clone();
    adjusted.insert(
        "instances".to_string(),
        JsonValue::Number(observed_instances.into()),
    );
    !is_update(&adjusted, observed)
}

fn coerce_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
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
    fn is_update_reflexive_false() {
        let x = obj(json!({"id": "a", "cpus": 1, "ports": [8080]}));
        assert!(!is_update(&x, &x));
    }

    #[test]
    fn s7_port_zero_invariance() {
        let desired = obj(json!({"ports": [1, 0, 3]}));
        let observed = obj(json!({"ports": [1, 2, 3]}));
        assert!(!is_port_update(&desired, &observed));
    }

    #[test]
    fn port_change_is_detected() {
        let desired = obj(json!({"ports": [1, 5, 3]}));
        let observed = obj(json!({"ports": [1, 2, 3]}));
        assert!(is_port_update(&desired, &observed));
    }

    #[test]
    fn s8_scale_only_update() {
        let desired = obj(json!({"id": "x", "instances": 42, "cpus": 1}));
        let observed = obj(json!({"id": "x", "instances": 3, "cpus": 1}));
        assert!(is_scale_only_update(&desired, &observed));
        assert!(is_update(&desired, &observed));
    }

    #[test]
    fn scale_and_other_field_change_is_not_scale_only() {
        let desired = obj(json!({"id": "x", "instances": 42, "cpus": 2}));
        let observed = obj(json!({"id": "x", "instances": 3, "cpus": 1}));
        assert!(!is_scale_only_update(&desired, &observed));
        assert!(is_update(&desired, &observed));
    }

    #[test]
    fn combine_takes_src_on_length_mismatch() {
        let dst = json!({"a": [1, 2, 3]});
        let src = json!({"a": [9, 9]});
        assert_eq!(combine(&dst, &src), json!({"a": [9, 9]}));
    }
}
