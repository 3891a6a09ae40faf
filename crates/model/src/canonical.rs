use crate::JsonValue;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Serializes `value` as the toolchain's canonical JSON form: object keys
/// sorted, 4-space indentation. This is applied only at the final CLI
/// emission boundary -- every intermediate merge, extend, and
/// template-substitution step preserves insertion order instead.
pub fn to_canonical_string(value: &JsonValue) -> Result<String, crate::Error> {
    let sorted = sort_keys(value);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(&sorted, &mut ser)?;
    Ok(String::from_utf8(buf).expect("serde_json only emits valid UTF-8"))
}

fn sort_keys(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = serde_json::Map::new();
            for k in keys {
                out.insert(k.clone(), sort_keys(&map[k]));
            }
            JsonValue::Object(out)
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_keys_and_indents_by_four_spaces() {
        let value = serde_json::json!({"b": 1, "a": {"d": 2, "c": 3}});
        let out = to_canonical_string(&value).unwrap();
        assert_eq!(out, "{\n    \"a\": {\n        \"c\": 3,\n        \"d\": 2\n    },\n    \"b\": 1\n}");
    }
}
