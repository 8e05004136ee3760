use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Column holding the crew member's name / 名称列
pub const NAME_COLUMN: &str = "name";

/// A single column value, typed by its SQLite storage class / 列值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Real(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One row of the `crew` table, columns kept in table order / 船员记录
///
/// Nothing about the schema is assumed beyond an optional text `name` column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrewRecord {
    fields: Vec<(String, FieldValue)>,
}

impl CrewRecord {
    pub fn new(fields: Vec<(String, FieldValue)>) -> Self {
        Self { fields }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a field by column name (first match wins on duplicate names)
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME_COLUMN).and_then(FieldValue::as_str)
    }

    /// Display label for suggestion lists / 下拉建议的显示文本
    pub fn label(&self) -> String {
        self.name()
            .or_else(|| self.fields.iter().find_map(|(_, v)| v.as_str()))
            .unwrap_or("<unnamed>")
            .to_string()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for CrewRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Serialized as a JSON object whose keys keep column order
impl Serialize for CrewRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
