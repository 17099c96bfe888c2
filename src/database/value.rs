//! Typed cells, field maps and tabular results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Arguments, Column, Row, TypeInfo, ValueRef};

/// A single cell value as stored in SQLite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the cell; integers are widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(i) => Some(*i as f64),
            SqlValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            SqlValue::Null => JsonValue::Null,
            SqlValue::Integer(i) => JsonValue::from(*i),
            SqlValue::Real(r) => Number::from_f64(*r)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            SqlValue::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", r),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v.into())
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::Integer(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// Positional arguments for a statement, in placeholder order
pub(crate) fn to_arguments<'q>(params: &[&'q SqlValue]) -> Result<SqliteArguments<'q>, sqlx::Error> {
    let mut args = SqliteArguments::default();
    for value in params.iter().copied() {
        let added = match value {
            SqlValue::Null => args.add(Option::<i64>::None),
            SqlValue::Integer(i) => args.add(*i),
            SqlValue::Real(r) => args.add(*r),
            SqlValue::Text(s) => args.add(s.as_str()),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

/// Ordered column → value map used for inserts and updates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValues(Vec<(String, SqlValue)>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing an earlier entry for the same column
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self
            .0
            .iter_mut()
            .find(|(c, _)| c.eq_ignore_ascii_case(&column))
        {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.0
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FieldValues::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// Ordered columns plus ordered rows of typed cells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl TabularResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Cell at `row` for the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&SqlValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of one column, top to bottom
    pub fn column_values(&self, column: &str) -> Option<Vec<&SqlValue>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().filter_map(|r| r.get(idx)).collect())
    }

    /// Rows as an array of JSON objects keyed by column name
    pub fn to_json_records(&self) -> JsonValue {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, JsonValue> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), v.to_json()))
                    .collect();
                JsonValue::Object(object)
            })
            .collect();
        JsonValue::Array(records)
    }

    pub(crate) fn from_rows(columns: Vec<String>, rows: &[SqliteRow]) -> Result<Self, sqlx::Error> {
        let decoded = rows.iter().map(decode_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(columns, decoded))
    }
}

pub(crate) fn column_names(row: &SqliteRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn decode_row(row: &SqliteRow) -> Result<Vec<SqlValue>, sqlx::Error> {
    (0..row.len()).map(|idx| decode_cell(row, idx)).collect()
}

/// Decode by the value's runtime storage class, not the declared column type.
///
/// Aggregates such as `COUNT(*)` or `AVG(x)` have no declared type.
fn decode_cell(row: &SqliteRow, idx: usize) -> Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_ascii_uppercase();

    let value = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get_unchecked::<i64, _>(idx)?),
        "REAL" | "NUMERIC" => SqlValue::Real(row.try_get_unchecked::<f64, _>(idx)?),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
            SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => SqlValue::Text(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}
