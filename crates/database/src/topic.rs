//! Watch topic operations.
//!
//! Topics are never deleted; [`deactivate_topic`] is the soft delete.
//! Owner-scoped mutations take the `user_id` and report `NotFound` when the
//! topic belongs to someone else.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::debug;
use watch_core::{AdvancePlan, CheckInterval};

use crate::error::{DatabaseError, Result};
use crate::models::WatchTopic;
use crate::validation::validate_query;

const TOPIC_COLUMNS: &str = "t.id, t.user_id, t.query, t.interval_minutes, t.is_active, \
     t.created_at, t.last_checked, t.checks_remaining";

fn not_found(topic_id: i64) -> DatabaseError {
    DatabaseError::NotFound {
        entity: "WatchTopic",
        id: topic_id.to_string(),
    }
}

/// Create an active topic. Micro-interval topics start with a bounded
/// number of checks.
pub async fn create_topic(
    pool: &SqlitePool,
    user_id: i64,
    query: &str,
    interval: CheckInterval,
    now: NaiveDateTime,
) -> Result<WatchTopic> {
    let query = validate_query(query)?;

    let id = sqlx::query(
        r#"
        INSERT INTO watch_topics (user_id, query, interval_minutes, is_active, created_at, checks_remaining)
        VALUES (?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&query)
    .bind(interval.as_minutes())
    .bind(now)
    .bind(interval.initial_checks())
    .execute(pool)
    .await?
    .last_insert_rowid();

    debug!(topic_id = id, user_id, "Created watch topic");
    get_topic(pool, id).await
}

/// Get a topic by ID, active or not.
pub async fn get_topic(pool: &SqlitePool, topic_id: i64) -> Result<WatchTopic> {
    sqlx::query_as::<_, WatchTopic>(&format!(
        "SELECT {} FROM watch_topics t WHERE t.id = ?",
        TOPIC_COLUMNS
    ))
    .bind(topic_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(topic_id))
}

/// Active topics of one user, oldest first.
pub async fn list_user_topics(pool: &SqlitePool, user_id: i64) -> Result<Vec<WatchTopic>> {
    let topics = sqlx::query_as::<_, WatchTopic>(&format!(
        "SELECT {} FROM watch_topics t WHERE t.user_id = ? AND t.is_active = 1 ORDER BY t.id",
        TOPIC_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(topics)
}

/// Active topics whose owner has not paused monitoring.
pub async fn list_active_topics(pool: &SqlitePool) -> Result<Vec<WatchTopic>> {
    let topics = sqlx::query_as::<_, WatchTopic>(&format!(
        r#"
        SELECT {}
        FROM watch_topics t
        JOIN users u ON u.id = t.user_id
        WHERE t.is_active = 1 AND u.is_active = 1
        ORDER BY t.id
        "#,
        TOPIC_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(topics)
}

/// Active topics that are due at `now`.
pub async fn list_due_topics(pool: &SqlitePool, now: NaiveDateTime) -> Result<Vec<WatchTopic>> {
    let topics = list_active_topics(pool).await?;
    Ok(topics.into_iter().filter(|t| t.is_due(now)).collect())
}

/// Count active topics across all users.
pub async fn count_active_topics(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM watch_topics WHERE is_active = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Replace a topic's query text.
pub async fn update_topic_text(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
    query: &str,
) -> Result<()> {
    let query = validate_query(query)?;

    let result = sqlx::query(
        r#"
        UPDATE watch_topics
        SET query = ?
        WHERE id = ? AND user_id = ? AND is_active = 1
        "#,
    )
    .bind(&query)
    .bind(topic_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(topic_id));
    }

    Ok(())
}

/// Change a topic's interval. Moving to the micro-interval restarts the
/// check counter; moving away from it makes the topic unlimited again.
pub async fn update_topic_interval(
    pool: &SqlitePool,
    user_id: i64,
    topic_id: i64,
    interval: CheckInterval,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE watch_topics
        SET interval_minutes = ?, checks_remaining = ?
        WHERE id = ? AND user_id = ? AND is_active = 1
        "#,
    )
    .bind(interval.as_minutes())
    .bind(interval.initial_checks())
    .bind(topic_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(topic_id));
    }

    Ok(())
}

/// Soft-delete a topic.
pub async fn deactivate_topic(pool: &SqlitePool, user_id: i64, topic_id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE watch_topics
        SET is_active = 0
        WHERE id = ? AND user_id = ? AND is_active = 1
        "#,
    )
    .bind(topic_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(not_found(topic_id));
    }

    Ok(())
}

/// Record a completed due-check: stamp `last_checked` and apply the
/// remaining-checks bookkeeping. Returns the plan that was applied.
pub async fn advance_topic(
    pool: &SqlitePool,
    topic_id: i64,
    now: NaiveDateTime,
) -> Result<AdvancePlan> {
    let mut tx = pool.begin().await?;

    let remaining: Option<i64> = sqlx::query_scalar::<_, Option<i64>>(
        r#"
        SELECT checks_remaining FROM watch_topics WHERE id = ?
        "#,
    )
    .bind(topic_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| not_found(topic_id))?;

    let plan = AdvancePlan::for_remaining(remaining);

    sqlx::query(
        r#"
        UPDATE watch_topics
        SET last_checked = ?,
            checks_remaining = ?,
            is_active = CASE WHEN ? THEN 0 ELSE is_active END
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(plan.checks_remaining)
    .bind(plan.deactivate)
    .bind(topic_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    debug!(
        topic_id,
        checks_remaining = ?plan.checks_remaining,
        deactivated = plan.deactivate,
        "Advanced topic"
    );
    Ok(plan)
}
