//! Value normalization for the matrix specification.
//!
//! Every field value becomes a sequence of strings, whatever its YAML shape:
//! - `python_version: "3.11"` → `["3.11"]`
//! - `java_version: [17, 21]` → `["17", "21"]`
//! - duplicates are dropped, first occurrence kept

use indexmap::IndexMap;
use okdp_core::CompatibilityGroup;
use serde_yaml::Value;

/// Raw field mapping as deserialized from the versions file
pub type RawFields = IndexMap<String, Value>;

/// Normalize a single field value into a deduplicated sequence of strings
pub fn normalize_value(value: &Value) -> Vec<String> {
    let rendered: Vec<String> = match value {
        Value::Sequence(items) => items.iter().map(scalar_to_string).collect(),
        other => vec![scalar_to_string(other)],
    };

    let mut unique = Vec::with_capacity(rendered.len());
    for item in rendered {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// Normalize every field of a raw mapping, keeping field order
pub fn normalize_fields(raw: &RawFields) -> CompatibilityGroup {
    raw.iter()
        .map(|(field, value)| (field.clone(), normalize_value(value)))
        .collect()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        // Nested structures have no meaning as a version; keep them readable.
        nested => serde_json::to_string(nested).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_scalar_becomes_sequence() {
        assert_eq!(normalize_value(&yaml("\"3.11\"")), vec!["3.11"]);
        assert_eq!(normalize_value(&yaml("17")), vec!["17"]);
        assert_eq!(normalize_value(&yaml("3.2")), vec!["3.2"]);
    }

    #[test]
    fn test_sequence_is_stringified() {
        assert_eq!(normalize_value(&yaml("[17, \"21\"]")), vec!["17", "21"]);
        assert_eq!(normalize_value(&yaml("[true]")), vec!["true"]);
    }

    #[test]
    fn test_duplicates_are_dropped_in_order() {
        assert_eq!(
            normalize_value(&yaml("[\"2.13\", \"2.12\", \"2.13\"]")),
            vec!["2.13", "2.12"]
        );
    }

    #[test]
    fn test_null_is_empty_string() {
        assert_eq!(normalize_value(&Value::Null), vec![""]);
    }

    #[test]
    fn test_normalize_fields_keeps_order() {
        let raw: RawFields = serde_yaml::from_str(
            "python_version: \"3.9\"\nspark_version: [\"3.2.1\", \"3.2.2\"]\njava_version: 11\n",
        )
        .unwrap();
        let group = normalize_fields(&raw);
        let keys: Vec<_> = group.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["python_version", "spark_version", "java_version"]);
        assert_eq!(group.get("java_version"), Some(&["11".to_string()][..]));
    }
}
