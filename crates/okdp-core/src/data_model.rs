//! Data Model: CompatibilityGroup, BuildFilter, MatrixRow
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One declared cluster of mutually compatible component versions.
///
/// Field order is the order of the source document and is carried through
/// to the expanded rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityGroup {
    fields: IndexMap<String, Vec<String>>,
}

impl CompatibilityGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert, used heavily by tests and fixtures
    pub fn with<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(field, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn insert(&mut self, field: &str, values: Vec<String>) {
        self.fields.insert(field.to_string(), values);
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of rows the expansion of this group produces.
    pub fn combinations(&self) -> usize {
        self.fields.values().map(Vec::len).product()
    }
}

impl FromIterator<(String, Vec<String>)> for CompatibilityGroup {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Caller supplied per-field narrowing. Empty means "accept everything".
pub type BuildFilter = CompatibilityGroup;

/// One fully resolved build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatrixRow {
    fields: IndexMap<String, String>,
}

impl MatrixRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a field, keeping its position when it already exists.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for MatrixRow {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Anything the validator can check for mandatory fields.
pub trait FieldPresence {
    /// True when the field exists and carries at least one value
    fn has_value(&self, field: &str) -> bool;
}

impl FieldPresence for CompatibilityGroup {
    fn has_value(&self, field: &str) -> bool {
        self.get(field)
            .is_some_and(|values| values.iter().any(|v| !v.is_empty()))
    }
}

impl FieldPresence for MatrixRow {
    fn has_value(&self, field: &str) -> bool {
        self.get(field).is_some_and(|value| !value.is_empty())
    }
}

/// Payload flowing between pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageData {
    Groups(Vec<CompatibilityGroup>),
    Rows(Vec<MatrixRow>),
}

impl StageData {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Groups(_) => "groups",
            Self::Rows(_) => "rows",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Groups(groups) => groups.len(),
            Self::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_is_product_of_cardinalities() {
        let group = CompatibilityGroup::new()
            .with("spark_version", ["3.3.1", "3.3.2"])
            .with("scala_version", ["2.12", "2.13"])
            .with("java_version", ["17"]);
        assert_eq!(group.combinations(), 4);

        let empty_field = group.clone().with("python_version", Vec::<String>::new());
        assert_eq!(empty_field.combinations(), 0);
    }

    #[test]
    fn test_row_set_keeps_position() {
        let mut row = MatrixRow::new().with("a", "1").with("b", "2");
        row.set("a", "3");
        let keys: Vec<_> = row.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(row.get("a"), Some("3"));
    }

    #[test]
    fn test_row_serializes_in_field_order() {
        let row = MatrixRow::new()
            .with("python_version", "3.9")
            .with("python_dev_tag", "python3.9-main-latest");
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"python_version":"3.9","python_dev_tag":"python3.9-main-latest"}"#
        );
    }

    #[test]
    fn test_field_presence() {
        let group = CompatibilityGroup::new()
            .with("spark_version", ["3.5.0"])
            .with("scala_version", Vec::<String>::new());
        assert!(group.has_value("spark_version"));
        assert!(!group.has_value("scala_version"));
        assert!(!group.has_value("java_version"));

        let blank = CompatibilityGroup::new().with("spark_version", [""]);
        assert!(!blank.has_value("spark_version"));

        let row = MatrixRow::new().with("scala_version", "");
        assert!(!row.has_value("scala_version"));
    }
}
