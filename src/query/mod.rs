//! Query preprocessing
//!
//! Normalize → strip disallowed characters → spell-correct, always in that
//! order.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

pub mod normalize;
pub mod spell;

pub use normalize::{DEFAULT_KEEP_CHARS, normalize, strip_disallowed_characters};
pub use spell::{FrequencyDictionary, NoopDictionary, SpellDictionary, spell_correct};

/// Query text after preprocessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedQuery {
    pub text: String,
    /// True only when spell correction replaced at least one token.
    pub was_corrected: bool,
}

/// Cleans raw user queries before retrieval.
pub struct QueryProcessor {
    dictionary: Arc<dyn SpellDictionary>,
    keep_chars: Vec<char>,
}

impl Default for QueryProcessor {
    fn default() -> Self {
        Self::new(Arc::new(NoopDictionary))
    }
}

impl QueryProcessor {
    pub fn new(dictionary: Arc<dyn SpellDictionary>) -> Self {
        Self {
            dictionary,
            keep_chars: DEFAULT_KEEP_CHARS.to_vec(),
        }
    }

    /// Override the punctuation preserved by character stripping.
    #[must_use]
    pub fn with_keep_chars(mut self, keep: impl IntoIterator<Item = char>) -> Self {
        self.keep_chars = keep.into_iter().collect();
        self
    }

    /// Run the full pipeline.
    ///
    /// Blank input is returned verbatim with `was_corrected = false`.
    pub fn process(&self, raw: &str, apply_spell_check: bool) -> ProcessedQuery {
        if raw.trim().is_empty() {
            return ProcessedQuery {
                text: raw.to_string(),
                was_corrected: false,
            };
        }

        let normalized = normalize(raw);
        let stripped = strip_disallowed_characters(&normalized, &self.keep_chars);

        let (text, was_corrected) = if apply_spell_check {
            spell_correct(&stripped, self.dictionary.as_ref())
        } else {
            (stripped, false)
        };

        debug!(
            target: "query",
            raw,
            processed = %text,
            was_corrected,
            "query processed"
        );

        ProcessedQuery {
            text,
            was_corrected,
        }
    }
}
