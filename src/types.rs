//! Core data model types.
//!
//! Workbook sheets are read into an in-memory [`DataSet`]: a [`Schema`] of column names plus
//! row-major [`Value`] storage. The cleaning pipeline never mutates a dataset in place; every
//! stage produces a new one. The final output is a [`Report`], an ordered list of named sheets.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty cell.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Convenience constructor for text cells.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Utf8(s.into())
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for null cells and whitespace-only strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Utf8(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Borrow the string payload, if this is a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Text as it would appear in a rendered cell.
    ///
    /// Null renders as an empty string and integral floats drop their fractional part, so a
    /// numeric `12345.0` cell renders as `12345`.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int64(i) => i.to_string(),
            Self::Float64(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Self::Bool(b) => b.to_string(),
            Self::Utf8(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Utf8(s)
    }
}

/// Ordered list of column names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Column names, in sheet order.
    pub fields: Vec<String>,
}

impl Schema {
    /// Create a new schema from column names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate column names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Union of several schemas: columns keep first-seen order.
    pub fn union<'a>(schemas: impl IntoIterator<Item = &'a Schema>) -> Self {
        let mut fields: Vec<String> = Vec::new();
        for schema in schemas {
            for name in &schema.fields {
                if !fields.contains(name) {
                    fields.push(name.clone());
                }
            }
        }
        Self { fields }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Create a dataset with the given schema and no rows.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `row`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Iterate the values of one column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null)))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Like [`Self::filter_rows`], but the predicate also receives the row index.
    pub fn filter_indexed<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(usize, &[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, row)| predicate(*idx, row.as_slice()))
            .map(|(_, row)| row.clone())
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset by applying `mapper` to every row.
    ///
    /// The returned dataset preserves the original schema.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema field count.
    pub fn map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Value>,
    {
        let expected_len = self.schema.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();

        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset by expanding every row into zero or more rows.
    ///
    /// Output rows keep source-row order, and within one source row the order `mapper`
    /// returned them in.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema field count.
    pub fn flat_map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Vec<Value>>,
    {
        let expected_len = self.schema.len();
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            for out in mapper(row.as_slice()) {
                assert!(
                    out.len() == expected_len,
                    "flat-mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                rows.push(out);
            }
        }
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Reduce (fold) all rows into an accumulator value.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }

    /// Return a copy with `name` set to `values` (replacing the column or appending it).
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` differs from the row count.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Self {
        assert!(
            values.len() == self.rows.len(),
            "column length {} does not match row count {}",
            values.len(),
            self.rows.len()
        );
        let mut schema = self.schema.clone();
        let idx = match schema.index_of(name) {
            Some(idx) => idx,
            None => {
                schema.fields.push(name.to_string());
                schema.fields.len() - 1
            }
        };
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, v)| {
                let mut out = row.clone();
                out.resize(schema.len(), Value::Null);
                out[idx] = v;
                out
            })
            .collect();
        Self { schema, rows }
    }

    /// Concatenate datasets, aligning columns by name.
    ///
    /// The output schema is the union of the input schemas; cells a part does not have are
    /// null.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a DataSet>) -> Self {
        let parts: Vec<&DataSet> = parts.into_iter().collect();
        let schema = Schema::union(parts.iter().map(|p| &p.schema));

        let mut rows = Vec::with_capacity(parts.iter().map(|p| p.row_count()).sum());
        for part in parts {
            let projection: Vec<Option<usize>> = schema
                .field_names()
                .map(|name| part.schema.index_of(name))
                .collect();
            for row in &part.rows {
                rows.push(
                    projection
                        .iter()
                        .map(|idx| idx.and_then(|i| row.get(i)).cloned().unwrap_or(Value::Null))
                        .collect(),
                );
            }
        }
        Self { schema, rows }
    }

    /// Row indexes whose rendered value in `column` occurs more than once in that column.
    ///
    /// Blank cells are never reported.
    pub fn repeated_value_rows(&self, column: usize) -> BTreeSet<usize> {
        let rendered: Vec<Option<String>> = self
            .rows
            .iter()
            .map(|row| match row.get(column) {
                Some(v) if !v.is_blank() => Some(v.render()),
                _ => None,
            })
            .collect();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for text in rendered.iter().flatten() {
            *counts.entry(text.as_str()).or_default() += 1;
        }

        rendered
            .iter()
            .enumerate()
            .filter_map(|(idx, text)| match text {
                Some(t) if counts.get(t.as_str()).copied().unwrap_or(0) > 1 => Some(idx),
                _ => None,
            })
            .collect()
    }
}

/// A sheet read from an input workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSheet {
    /// Sheet (tab) name.
    pub name: String,
    /// Sheet contents.
    pub data: DataSet,
}

/// Cells of one column to highlight when a sheet is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Column index in the sheet's schema.
    pub column: usize,
    /// Row indexes (data rows, 0-based) to highlight.
    pub rows: BTreeSet<usize>,
}

/// One named output sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    /// Sheet (tab) name.
    pub name: String,
    /// Sheet contents.
    pub data: DataSet,
    /// Optional cell highlighting.
    pub highlight: Option<Highlight>,
}

/// The final output unit: named sheets in write order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    /// Sheets, in the order they are written.
    pub sheets: Vec<ReportSheet>,
}

impl Report {
    /// Append a sheet.
    pub fn push(&mut self, name: impl Into<String>, data: DataSet) {
        self.sheets.push(ReportSheet {
            name: name.into(),
            data,
            highlight: None,
        });
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&ReportSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names in write order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSet, Schema, Value};

    fn sample_dataset() -> DataSet {
        DataSet::new(
            Schema::new(["code", "owner"]),
            vec![
                vec![Value::text("100"), Value::text("a")],
                vec![Value::text("200"), Value::text("b")],
                vec![Value::text("100"), Value::Null],
            ],
        )
    }

    #[test]
    fn render_drops_fraction_of_integral_floats() {
        assert_eq!(Value::Float64(12345.0).render(), "12345");
        assert_eq!(Value::Float64(1.5).render(), "1.5");
        assert_eq!(Value::Null.render(), "");
        assert_eq!(Value::Int64(7).render(), "7");
    }

    #[test]
    fn blank_covers_null_and_whitespace() {
        assert!(Value::Null.is_blank());
        assert!(Value::text("  \t").is_blank());
        assert!(!Value::text("x").is_blank());
        assert!(!Value::Int64(0).is_blank());
    }

    #[test]
    fn flat_map_rows_preserves_order_and_can_drop() {
        let ds = sample_dataset();
        let out = ds.flat_map_rows(|row| match row[0].as_str() {
            Some("100") => vec![row.to_vec(), row.to_vec()],
            _ => Vec::new(),
        });
        assert_eq!(out.row_count(), 4);
        assert_eq!(out.rows[2][1], Value::Null);
        // Original unchanged
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn concat_unions_schemas_by_name() {
        let a = DataSet::new(Schema::new(["code", "owner"]), vec![vec![Value::text("1"), Value::text("x")]]);
        let b = DataSet::new(Schema::new(["email", "code"]), vec![vec![Value::text("e@x.com"), Value::text("2")]]);

        let out = DataSet::concat([&a, &b]);
        assert_eq!(out.schema, Schema::new(["code", "owner", "email"]));
        assert_eq!(
            out.rows,
            vec![
                vec![Value::text("1"), Value::text("x"), Value::Null],
                vec![Value::text("2"), Value::Null, Value::text("e@x.com")],
            ]
        );
    }

    #[test]
    fn with_column_appends_or_replaces() {
        let ds = sample_dataset();
        let flagged = ds.with_column("flag", vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]);
        assert_eq!(flagged.schema.index_of("flag"), Some(2));
        assert_eq!(flagged.rows[1][2], Value::Bool(false));

        let replaced = flagged.with_column("code", vec![Value::Null, Value::Null, Value::Null]);
        assert_eq!(replaced.schema.len(), 3);
        assert!(replaced.rows.iter().all(|r| r[0].is_null()));
    }

    #[test]
    fn repeated_value_rows_ignores_blanks() {
        let ds = DataSet::new(
            Schema::new(["code"]),
            vec![
                vec![Value::text("100")],
                vec![Value::Null],
                vec![Value::Float64(100.0)],
                vec![Value::text("")],
                vec![Value::text("300")],
            ],
        );
        let rows: Vec<usize> = ds.repeated_value_rows(0).into_iter().collect();
        assert_eq!(rows, vec![0, 2]);
    }

    #[test]
    fn reduce_rows_folds_in_order() {
        let ds = sample_dataset();
        let owners = ds.reduce_rows(String::new(), |mut acc, row| {
            acc.push_str(&row[1].render());
            acc
        });
        assert_eq!(owners, "ab");
    }

    #[test]
    fn column_returns_none_for_missing() {
        let ds = sample_dataset();
        assert!(ds.column("missing").is_none());
        assert_eq!(ds.column("owner").map(|c| c.count()), Some(3));
    }
}
