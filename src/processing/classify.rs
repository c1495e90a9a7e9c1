//! Validity classification of raw asset-code cells.

use crate::types::Value;

/// Outcome of [`Classifier::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The cell is a non-zero, digit-only code and can be used as-is.
    Valid,
    /// The cell is empty, malformed, junk or holds several codes; it goes to splitting.
    Invalid,
}

impl Classification {
    /// Returns `true` for [`Classification::Valid`].
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Decides whether an asset-code cell is trusted as already correct.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    junk_tokens: Vec<String>,
}

impl Classifier {
    /// Create a classifier with a block-list of junk substrings.
    ///
    /// Empty tokens are ignored, since they would be contained in every value.
    pub fn new<I, S>(junk_tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            junk_tokens: junk_tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    /// Classify a raw asset-code value.
    ///
    /// A value is [`Classification::Valid`] only if it is text that, once trimmed, is
    /// non-empty, made only of ASCII digits, not all zeros, and contains none of the junk
    /// tokens. Everything else is [`Classification::Invalid`].
    pub fn classify(&self, value: &Value) -> Classification {
        let Value::Utf8(raw) = value else {
            return Classification::Invalid;
        };

        let trimmed = raw.trim();
        let digits_only = !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit());
        let all_zero = trimmed.chars().all(|c| c == '0');
        let junk = self.junk_tokens.iter().any(|t| raw.contains(t.as_str()));

        if digits_only && !all_zero && !junk {
            Classification::Valid
        } else {
            Classification::Invalid
        }
    }

    /// Convenience wrapper returning `true` for invalid cells.
    pub fn is_invalid(&self, value: &Value) -> bool {
        !self.classify(value).is_valid()
    }
}
