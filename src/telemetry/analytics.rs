//! Offline aggregation over search logs and feedback.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::error::Result;
use crate::telemetry::TIMESTAMP_FORMAT;

const TOP_LIMIT: i64 = 10;
const RECENT_LIMIT: i64 = 20;

/// Everything the `analytics` command reports.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsReport {
    pub since: String,
    pub overview: Overview,
    pub top_queries: Vec<QueryCount>,
    pub zero_result_queries: Vec<QueryCount>,
    pub searches_by_mode: BTreeMap<String, u64>,
    pub feedback_by_mode: BTreeMap<String, ModeFeedback>,
    pub recent_searches: Vec<RecentSearch>,
    pub most_helpful: Vec<ArticleRating>,
    pub least_helpful: Vec<ArticleRating>,
    pub recent_feedback: Vec<RecentFeedback>,
    pub searches_per_day: Vec<DayCount>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Overview {
    pub total_searches: u64,
    pub unique_queries: u64,
    pub avg_total_matches: f64,
    pub avg_returned: f64,
    pub total_feedback: u64,
    pub positive_feedback: u64,
    pub negative_feedback: u64,
    /// Percentage of feedback that was positive, 0 when there is none.
    pub satisfaction_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCount {
    pub query: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModeFeedback {
    pub total: u64,
    pub positive: u64,
    pub negative: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentSearch {
    pub id: i64,
    pub query: String,
    pub mode: String,
    pub total_matches: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRating {
    pub doc_id: String,
    pub doc_title: String,
    pub net_rating: i64,
    pub feedback_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentFeedback {
    pub query: String,
    pub doc_title: Option<String>,
    pub rating: i64,
    pub position: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: u64,
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Build the report for every record at or after `since`.
pub fn collect(conn: &Connection, since: DateTime<Utc>) -> Result<AnalyticsReport> {
    let since = since.format(TIMESTAMP_FORMAT).to_string();

    Ok(AnalyticsReport {
        overview: overview(conn, &since)?,
        top_queries: query_counts(conn, &since, false)?,
        zero_result_queries: query_counts(conn, &since, true)?,
        searches_by_mode: searches_by_mode(conn, &since)?,
        feedback_by_mode: feedback_by_mode(conn, &since)?,
        recent_searches: recent_searches(conn, &since)?,
        most_helpful: article_ratings(conn, &since, true)?,
        least_helpful: article_ratings(conn, &since, false)?,
        recent_feedback: recent_feedback(conn, &since)?,
        searches_per_day: searches_per_day(conn, &since)?,
        since,
    })
}

fn overview(conn: &Connection, since: &str) -> Result<Overview> {
    let (total_searches, unique_queries, avg_total_matches, avg_returned) = conn.query_row(
        "SELECT COUNT(*), COUNT(DISTINCT query),
                COALESCE(AVG(total_results), 0.0), COALESCE(AVG(results_returned), 0.0)
         FROM search_logs WHERE timestamp >= ?1",
        [since],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
            ))
        },
    )?;

    let (total_feedback, positive, negative) = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN rating > 0 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN rating < 0 THEN 1 ELSE 0 END), 0)
         FROM feedback WHERE timestamp >= ?1",
        [since],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        },
    )?;

    let satisfaction_rate = if total_feedback > 0 {
        positive as f64 / total_feedback as f64 * 100.0
    } else {
        0.0
    };

    Ok(Overview {
        total_searches: to_u64(total_searches),
        unique_queries: to_u64(unique_queries),
        avg_total_matches,
        avg_returned,
        total_feedback: to_u64(total_feedback),
        positive_feedback: to_u64(positive),
        negative_feedback: to_u64(negative),
        satisfaction_rate,
    })
}

fn query_counts(conn: &Connection, since: &str, zero_only: bool) -> Result<Vec<QueryCount>> {
    let filter = if zero_only { "AND total_results = 0" } else { "" };
    let sql = format!(
        "SELECT query, COUNT(*) AS count FROM search_logs
         WHERE timestamp >= ?1 {filter}
         GROUP BY query ORDER BY count DESC, query ASC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![since, TOP_LIMIT], |row| {
        Ok(QueryCount {
            query: row.get(0)?,
            count: to_u64(row.get(1)?),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn searches_by_mode(conn: &Connection, since: &str) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare(
        "SELECT search_type, COUNT(*) FROM search_logs
         WHERE timestamp >= ?1 GROUP BY search_type",
    )?;
    let rows = stmt.query_map([since], |row| {
        Ok((row.get::<_, String>(0)?, to_u64(row.get(1)?)))
    })?;
    Ok(rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()?)
}

fn feedback_by_mode(conn: &Connection, since: &str) -> Result<BTreeMap<String, ModeFeedback>> {
    let mut stmt = conn.prepare(
        "SELECT search_type, COUNT(*),
                SUM(CASE WHEN rating > 0 THEN 1 ELSE 0 END),
                SUM(CASE WHEN rating < 0 THEN 1 ELSE 0 END)
         FROM feedback WHERE timestamp >= ?1 GROUP BY search_type",
    )?;
    let rows = stmt.query_map([since], |row| {
        Ok((
            row.get::<_, String>(0)?,
            ModeFeedback {
                total: to_u64(row.get(1)?),
                positive: to_u64(row.get(2)?),
                negative: to_u64(row.get(3)?),
            },
        ))
    })?;
    Ok(rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()?)
}

fn recent_searches(conn: &Connection, since: &str) -> Result<Vec<RecentSearch>> {
    let mut stmt = conn.prepare(
        "SELECT id, query, search_type, total_results, timestamp FROM search_logs
         WHERE timestamp >= ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![since, RECENT_LIMIT], |row| {
        Ok(RecentSearch {
            id: row.get(0)?,
            query: row.get(1)?,
            mode: row.get(2)?,
            total_matches: to_u64(row.get(3)?),
            timestamp: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn article_ratings(conn: &Connection, since: &str, helpful: bool) -> Result<Vec<ArticleRating>> {
    let (having, order) = if helpful {
        ("SUM(rating) > 0", "net_rating DESC")
    } else {
        ("SUM(rating) < 0", "net_rating ASC")
    };
    let sql = format!(
        "SELECT doc_id, MAX(doc_title), SUM(rating) AS net_rating, COUNT(*) AS feedback_count
         FROM feedback
         WHERE timestamp >= ?1 AND doc_title IS NOT NULL
         GROUP BY doc_id HAVING {having}
         ORDER BY {order}, feedback_count DESC, doc_id ASC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![since, TOP_LIMIT], |row| {
        Ok(ArticleRating {
            doc_id: row.get(0)?,
            doc_title: row.get(1)?,
            net_rating: row.get(2)?,
            feedback_count: to_u64(row.get(3)?),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn recent_feedback(conn: &Connection, since: &str) -> Result<Vec<RecentFeedback>> {
    let mut stmt = conn.prepare(
        "SELECT query, doc_title, rating, result_position, timestamp FROM feedback
         WHERE timestamp >= ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![since, RECENT_LIMIT], |row| {
        Ok(RecentFeedback {
            query: row.get(0)?,
            doc_title: row.get(1)?,
            rating: row.get(2)?,
            position: row.get(3)?,
            timestamp: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn searches_per_day(conn: &Connection, since: &str) -> Result<Vec<DayCount>> {
    let mut stmt = conn.prepare(
        "SELECT DATE(timestamp) AS day, COUNT(*) FROM search_logs
         WHERE timestamp >= ?1 GROUP BY day ORDER BY day ASC",
    )?;
    let rows = stmt.query_map([since], |row| {
        Ok(DayCount {
            date: row.get(0)?,
            count: to_u64(row.get(1)?),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
