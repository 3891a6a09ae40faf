/// Replaces literal `${key}` occurrences in a serialized document with
/// `values[key]`, in the iteration order of `values`.
/// Substitution happens on the already-serialized text, so callers that
/// need JSON-safe values must pre-escape them.
pub fn substitute<'a, I>(serialized: &str, values: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = serialized.to_string();
    for (key, value) in values {
        let pattern = format!("${{{key}}}");
        out = out.replace(&pattern, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_template_fill() {
        let template = r#"{"a": "${key1}", "b": "${key2}"}"#;
        let values = [("key1", "value1"), ("key2", "value2")];
        let out = substitute(template, values);
        assert_eq!(out, r#"{"a": "value1", "b": "value2"}"#);
    }

    #[test]
    fn unmatched_keys_are_left_untouched() {
        let out = substitute("${missing}", [("present", "x")]);
        assert_eq!(out, "${missing}");
    }
}
