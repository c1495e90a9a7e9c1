//! Splitting of multi-code cells into one row per code.

use crate::types::{DataSet, Value};

use super::normalize::digits_only;

/// Splits asset-code cells on a delimiter class.
#[derive(Debug, Clone)]
pub struct Splitter {
    delimiters: Vec<char>,
}

impl Splitter {
    /// Create a splitter. A `' '` delimiter matches any whitespace (tabs, line breaks).
    pub fn new(delimiters: impl IntoIterator<Item = char>) -> Self {
        Self {
            delimiters: delimiters.into_iter().collect(),
        }
    }

    fn is_delimiter(&self, c: char) -> bool {
        self.delimiters
            .iter()
            .any(|&d| d == c || (d == ' ' && c.is_whitespace()))
    }

    /// Non-empty trimmed tokens of `text`, in order. Runs of delimiters count as one.
    pub fn tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(|c| self.is_delimiter(c))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Normalized codes of `text`: tokens reduced to their digits, empty results dropped.
    pub fn codes(&self, text: &str) -> Vec<String> {
        self.tokens(text)
            .into_iter()
            .map(digits_only)
            .filter(|code| !code.is_empty())
            .collect()
    }

    /// One copy of `row` per code found in its `code_idx` cell.
    ///
    /// Every other field is copied unchanged. A cell without codes yields no rows.
    pub fn split_row(&self, row: &[Value], code_idx: usize) -> Vec<Vec<Value>> {
        let text = row.get(code_idx).map(Value::render).unwrap_or_default();
        self.codes(&text)
            .into_iter()
            .map(|code| {
                let mut out = row.to_vec();
                out[code_idx] = Value::Utf8(code);
                out
            })
            .collect()
    }

    /// Split every row of `dataset` on the `code_idx` cell.
    pub fn split_dataset(&self, dataset: &DataSet, code_idx: usize) -> DataSet {
        dataset.flat_map_rows(|row| self.split_row(row, code_idx))
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DELIMITERS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::Splitter;
    use crate::types::{DataSet, Schema, Value};

    #[test]
    fn splits_on_mixed_delimiters_and_drops_junk() {
        let s = Splitter::default();
        assert_eq!(s.codes("123, 456/Computer"), vec!["123", "456"]);
        assert_eq!(s.codes("12345, 67890 / Computer"), vec!["12345", "67890"]);
        assert_eq!(s.codes(r"1\2*3"), vec!["1", "2", "3"]);
    }

    #[test]
    fn whitespace_of_any_kind_separates_codes() {
        let s = Splitter::default();
        assert_eq!(s.codes("111\n222\t333"), vec!["111", "222", "333"]);
    }

    #[test]
    fn tokens_keep_non_digit_tokens() {
        let s = Splitter::default();
        assert_eq!(s.tokens(" ,123,, Computer/ "), vec!["123", "Computer"]);
    }

    #[test]
    fn split_row_copies_other_fields() {
        let s = Splitter::default();
        let row = vec![Value::text("a"), Value::text("222, 333"), Value::Int64(9)];
        let out = s.split_row(&row, 1);
        assert_eq!(
            out,
            vec![
                vec![Value::text("a"), Value::text("222"), Value::Int64(9)],
                vec![Value::text("a"), Value::text("333"), Value::Int64(9)],
            ]
        );
    }

    #[test]
    fn rows_without_codes_are_dropped() {
        let s = Splitter::default();
        let ds = DataSet::new(
            Schema::new(["code"]),
            vec![
                vec![Value::text("Notebook")],
                vec![Value::Null],
                vec![Value::text("0000")],
            ],
        );
        let out = s.split_dataset(&ds, 0);
        assert_eq!(out.rows, vec![vec![Value::text("0000")]]);
    }

    #[test]
    fn numeric_cells_split_on_their_rendered_text() {
        let s = Splitter::default();
        let out = s.split_row(&[Value::Float64(12345.0)], 0);
        assert_eq!(out, vec![vec![Value::text("12345")]]);
    }
}
