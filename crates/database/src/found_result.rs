//! Deduplication store for search results.
//!
//! A result is admitted at most once per topic: a second result with the
//! same URL or the same content fingerprint is rejected. Fingerprints never
//! expire.

use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::FoundResult;

/// Deterministic digest over title, URL and summary.
pub fn fingerprint(title: &str, url: &str, summary: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(url.as_bytes());
    hasher.update(summary.unwrap_or_default().as_bytes());
    hex::encode(hasher.finalize())
}

/// Persist a result unless the topic already has one with the same URL or
/// fingerprint. Returns the new row id when admitted.
pub async fn admit(
    pool: &SqlitePool,
    topic_id: i64,
    title: &str,
    url: &str,
    summary: Option<&str>,
    found_at: NaiveDateTime,
) -> Result<Option<i64>> {
    let hash = fingerprint(title, url, summary);

    let result = sqlx::query(
        r#"
        INSERT INTO found_results (topic_id, title, url, summary, content_hash, found_at, is_sent)
        VALUES (?, ?, ?, ?, ?, ?, 0)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(topic_id)
    .bind(title)
    .bind(url)
    .bind(summary)
    .bind(&hash)
    .bind(found_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    Ok(Some(result.last_insert_rowid()))
}

/// Flag results as delivered to the user.
pub async fn mark_sent(pool: &SqlitePool, ids: &[i64]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "UPDATE found_results SET is_sent = 1 WHERE id IN ({})",
        placeholders
    );

    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(*id);
    }
    query.execute(pool).await?;

    Ok(())
}

/// All results admitted for a topic, oldest first.
pub async fn list_topic_results(pool: &SqlitePool, topic_id: i64) -> Result<Vec<FoundResult>> {
    let results = sqlx::query_as::<_, FoundResult>(
        r#"
        SELECT id, topic_id, title, url, summary, content_hash, found_at, is_sent
        FROM found_results
        WHERE topic_id = ?
        ORDER BY id
        "#,
    )
    .bind(topic_id)
    .fetch_all(pool)
    .await?;

    Ok(results)
}

/// Count results admitted for a topic.
pub async fn count_topic_results(pool: &SqlitePool, topic_id: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM found_results WHERE topic_id = ?
        "#,
    )
    .bind(topic_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
