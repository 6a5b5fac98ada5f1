use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::Cell;

static DEFAULT_ANY_OF: Lazy<Vec<String>> = Lazy::new(|| {
    ["car", "bus", "cycle", "motorbike", "induction"]
        .iter()
        .map(|k| k.to_string())
        .collect()
});

/// Commodity description predicate: the text must mention `required` and at
/// least one of `any_of`. Matching is a plain substring test on the lowercased
/// text, without trimming or punctuation handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFilter", into = "RawFilter")]
pub struct KeywordFilter {
    required: String,
    any_of: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct RawFilter {
    required: String,
    any_of: Vec<String>,
}

impl From<RawFilter> for KeywordFilter {
    fn from(raw: RawFilter) -> Self {
        KeywordFilter::new(raw.required, raw.any_of)
    }
}

impl From<KeywordFilter> for RawFilter {
    fn from(f: KeywordFilter) -> Self {
        RawFilter {
            required: f.required,
            any_of: f.any_of,
        }
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new("electric", DEFAULT_ANY_OF.clone())
    }
}

impl KeywordFilter {
    pub fn new<I, S>(required: impl Into<String>, any_of: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into().to_lowercase(),
            any_of: any_of
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    pub fn required(&self) -> &str {
        &self.required
    }

    pub fn any_of(&self) -> &[String] {
        &self.any_of
    }

    /// Only text cells can match; numbers, blanks and dates never do.
    pub fn matches(&self, cell: &Cell) -> bool {
        cell.as_text().is_some_and(|s| self.matches_text(s))
    }

    pub fn matches_text(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        text.contains(&self.required) && self.any_of.iter().any(|k| text.contains(k.as_str()))
    }
}
