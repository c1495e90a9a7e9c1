//! Email-domain frequency summary.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{DataSet, Schema, Value};

/// Header of the domain column in the summary table.
pub const DOMAIN_COLUMN: &str = "Domain";
/// Header of the count column in the summary table.
pub const COUNT_COLUMN: &str = "Count";
/// Domain reported for values that are present but not email-like.
pub const UNKNOWN_DOMAIN: &str = "unknown";

static EMAIL_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@([A-Za-z0-9.\-]+\.[A-Za-z]{2,})")
        .expect("email domain pattern is valid")
});

/// Tabulates email domains, counting blank cells under a default domain.
#[derive(Debug, Clone)]
pub struct DomainSummarizer {
    default_domain: String,
}

impl DomainSummarizer {
    /// Create a summarizer that counts blank cells as `default_domain`.
    pub fn new(default_domain: impl Into<String>) -> Self {
        Self {
            default_domain: default_domain.into(),
        }
    }

    /// Lower-cased domain of one email cell.
    pub fn domain_of(&self, value: &Value) -> String {
        if value.is_blank() {
            return self.default_domain.clone();
        }
        let text = value.render();
        match EMAIL_DOMAIN.captures(&text).and_then(|c| c.get(1)) {
            Some(m) => m.as_str().to_lowercase(),
            None => UNKNOWN_DOMAIN.to_string(),
        }
    }

    /// Frequency table of domains in `field`, highest count first.
    ///
    /// Ties keep the order in which domains were first seen. If `field` is not a column of
    /// `dataset` the table is empty (headers only).
    pub fn summarize(&self, dataset: &DataSet, field: &str) -> DataSet {
        let schema = Schema::new([DOMAIN_COLUMN, COUNT_COLUMN]);
        let Some(values) = dataset.column(field) else {
            return DataSet::empty(schema);
        };

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, i64> = HashMap::new();
        for value in values {
            let domain = self.domain_of(value);
            match counts.get_mut(&domain) {
                Some(n) => *n += 1,
                None => {
                    counts.insert(domain.clone(), 1);
                    order.push(domain);
                }
            }
        }

        let mut table: Vec<(String, i64)> = order
            .into_iter()
            .map(|d| {
                let n = counts.get(&d).copied().unwrap_or(0);
                (d, n)
            })
            .collect();
        // Stable sort keeps first-seen order among equal counts.
        table.sort_by(|a, b| b.1.cmp(&a.1));

        let rows = table
            .into_iter()
            .map(|(domain, count)| vec![Value::Utf8(domain), Value::Int64(count)])
            .collect();
        DataSet::new(schema, rows)
    }
}
