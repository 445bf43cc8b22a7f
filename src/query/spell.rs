//! Dictionary-backed spelling correction
//!
//! Candidates are generated by edit distance against a word-frequency table
//! and ranked by frequency. The dictionary is built once at startup and
//! only read afterwards, so one instance is shared by every request.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::debug;

use crate::error::{SearchError, Result};

/// Tokens at or below this length are never corrected.
const MIN_CORRECTABLE_LEN: usize = 2;

/// Tokens longer than the longest known word by more than this are left alone.
const MAX_LENGTH_SLACK: usize = 3;

/// Source of single-word spelling corrections.
pub trait SpellDictionary: Send + Sync {
    /// Best correction for `word`, or `None` when nothing plausible is known.
    ///
    /// Returning the word itself means "already correct".
    fn correction(&self, word: &str) -> Option<String>;
}

/// Dictionary that never corrects anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDictionary;

impl SpellDictionary for NoopDictionary {
    fn correction(&self, _word: &str) -> Option<String> {
        None
    }
}

/// Word-frequency dictionary with edit-distance candidate generation.
#[derive(Debug, Clone)]
pub struct FrequencyDictionary {
    frequencies: HashMap<String, u64>,
    alphabet: Vec<char>,
    longest_word: usize,
    max_distance: u8,
}

impl FrequencyDictionary {
    /// Build from `(word, count)` pairs. Words are lowercased; duplicate
    /// entries accumulate their counts.
    pub fn from_counts<I, S>(counts: I, max_distance: u8) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut frequencies: HashMap<String, u64> = HashMap::new();
        for (word, count) in counts {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            *frequencies.entry(word).or_default() += count;
        }

        let alphabet: BTreeSet<char> = frequencies.keys().flat_map(|w| w.chars()).collect();
        let longest_word = frequencies.keys().map(|w| w.chars().count()).max().unwrap_or(0);

        Self {
            frequencies,
            alphabet: alphabet.into_iter().collect(),
            longest_word,
            max_distance: max_distance.clamp(1, 2),
        }
    }

    /// Load a frequency file.
    ///
    /// Accepts either a JSON object `{"word": count, ...}` or plain text
    /// with one `word count` pair per line (a bare word counts as 1).
    pub fn load(path: &Path, max_distance: u8) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SearchError::Config(format!("read dictionary {}: {err}", path.display()))
        })?;

        let dictionary = if raw.trim_start().starts_with('{') {
            let counts: HashMap<String, u64> = serde_json::from_str(&raw).map_err(|err| {
                SearchError::Config(format!("parse dictionary {}: {err}", path.display()))
            })?;
            Self::from_counts(counts, max_distance)
        } else {
            let mut counts = Vec::new();
            for (line_no, line) in raw.lines().enumerate() {
                let mut parts = line.split_whitespace();
                let Some(word) = parts.next() else {
                    continue;
                };
                let count = match parts.next() {
                    Some(value) => value.parse::<u64>().map_err(|err| {
                        SearchError::Config(format!(
                            "dictionary {} line {}: invalid count {value}: {err}",
                            path.display(),
                            line_no + 1
                        ))
                    })?,
                    None => 1,
                };
                counts.push((word.to_string(), count));
            }
            Self::from_counts(counts, max_distance)
        };

        debug!(
            target: "query",
            words = dictionary.len(),
            path = %path.display(),
            "spelling dictionary loaded"
        );
        Ok(dictionary)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.frequencies.contains_key(word)
    }

    fn most_frequent<'a>(&self, candidates: impl Iterator<Item = &'a String>) -> Option<String> {
        candidates
            .filter_map(|word| self.frequencies.get(word).map(|freq| (word, *freq)))
            .max_by(|(a_word, a_freq), (b_word, b_freq)| {
                a_freq.cmp(b_freq).then_with(|| b_word.cmp(a_word))
            })
            .map(|(word, _)| word.clone())
    }

    /// All strings one edit away: deletes, transposes, replaces, inserts.
    fn edits1(&self, word: &str) -> BTreeSet<String> {
        let chars: Vec<char> = word.chars().collect();
        let mut out = BTreeSet::new();

        for i in 0..=chars.len() {
            let (left, right) = chars.split_at(i);

            if !right.is_empty() {
                out.insert(left.iter().chain(&right[1..]).collect());
            }
            if right.len() > 1 {
                out.insert(
                    left.iter()
                        .chain([&right[1], &right[0]])
                        .chain(&right[2..])
                        .collect(),
                );
            }
            for &c in &self.alphabet {
                if !right.is_empty() {
                    out.insert(left.iter().chain([&c]).chain(&right[1..]).collect());
                }
                out.insert(left.iter().chain([&c]).chain(right).collect());
            }
        }

        out
    }
}

impl SpellDictionary for FrequencyDictionary {
    fn correction(&self, word: &str) -> Option<String> {
        let word = word.to_lowercase();
        if self.frequencies.contains_key(&word) {
            return Some(word);
        }
        // Candidate generation grows with token length; nothing this long is
        // within two edits of a known word anyway.
        if word.chars().count() > self.longest_word + MAX_LENGTH_SLACK {
            return None;
        }

        let first_ring = self.edits1(&word);
        if let Some(best) = self.most_frequent(first_ring.iter()) {
            return Some(best);
        }

        if self.max_distance < 2 {
            return None;
        }

        let second_ring: BTreeSet<String> = first_ring
            .iter()
            .flat_map(|edit| self.edits1(edit))
            .filter(|edit| self.frequencies.contains_key(edit))
            .collect();
        self.most_frequent(second_ring.iter())
    }
}

/// Correct each whitespace-separated token of `text`.
///
/// Tokens of length two or less, or containing a digit, pass through
/// untouched. The flag is true when at least one token was replaced.
pub fn spell_correct(text: &str, dictionary: &dyn SpellDictionary) -> (String, bool) {
    let mut was_corrected = false;

    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|token| {
            if token.chars().count() <= MIN_CORRECTABLE_LEN
                || token.chars().any(|c| c.is_ascii_digit())
            {
                return token.to_string();
            }
            match dictionary.correction(token) {
                Some(corrected) if corrected != token => {
                    debug!(target: "query", from = token, to = %corrected, "token corrected");
                    was_corrected = true;
                    corrected
                }
                _ => token.to_string(),
            }
        })
        .collect();

    (tokens.join(" "), was_corrected)
}
