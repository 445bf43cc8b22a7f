//! Secondary ordering applied after relevance ranking.
//!
//! A pure reordering: membership and count never change. Documents with no
//! usable date (or title) always trail the ones that have one.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};

use crate::search::types::{Document, SortOverride};

/// Stable re-sort of `results` in place. `Relevance` is a no-op.
pub fn apply_sort(results: &mut [Document], sort: SortOverride) {
    match sort {
        SortOverride::Relevance => {}
        SortOverride::DateDesc => {
            results.sort_by(|a, b| missing_last(publish_date(a), publish_date(b), |x, y| y.cmp(x)));
        }
        SortOverride::DateAsc => {
            results.sort_by(|a, b| missing_last(publish_date(a), publish_date(b), |x, y| x.cmp(y)));
        }
        SortOverride::TitleAsc => {
            results.sort_by(|a, b| missing_last(title_key(a), title_key(b), |x, y| x.cmp(y)));
        }
    }
}

/// Parse `published_at` as a calendar date. Accepts `YYYY-MM-DD`, RFC 3339,
/// or anything whose first ten characters are `YYYY-MM-DD`.
#[must_use]
pub fn publish_date(doc: &Document) -> Option<NaiveDate> {
    let raw = doc.published_at.as_deref()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn title_key(doc: &Document) -> Option<String> {
    doc.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
