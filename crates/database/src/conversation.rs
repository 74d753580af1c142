//! Per-user conversation state with expiry.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::debug;
use watch_core::ConversationState;

use crate::error::Result;

/// Load a user's conversation state. Missing or expired state reads as
/// [`ConversationState::Idle`]; an expired row is removed.
pub async fn get_state(
    pool: &SqlitePool,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<ConversationState> {
    let row = sqlx::query_as::<_, (String, NaiveDateTime)>(
        r#"
        SELECT state_json, expires_at
        FROM conversation_states
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some((json, expires_at)) = row else {
        return Ok(ConversationState::Idle);
    };

    if expires_at <= now {
        debug!(user_id, "Conversation state expired");
        clear_state(pool, user_id).await?;
        return Ok(ConversationState::Idle);
    }

    Ok(serde_json::from_str(&json)?)
}

/// Store a user's conversation state. Storing `Idle` clears the row.
pub async fn set_state(
    pool: &SqlitePool,
    user_id: i64,
    state: &ConversationState,
    expires_at: NaiveDateTime,
) -> Result<()> {
    if state.is_idle() {
        return clear_state(pool, user_id).await;
    }

    let json = serde_json::to_string(state)?;

    sqlx::query(
        r#"
        INSERT INTO conversation_states (user_id, state_json, expires_at)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            state_json = excluded.state_json,
            expires_at = excluded.expires_at
        "#,
    )
    .bind(user_id)
    .bind(&json)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Drop a user's conversation state.
pub async fn clear_state(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM conversation_states WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove every expired row. Returns how many were removed.
pub async fn purge_expired(pool: &SqlitePool, now: NaiveDateTime) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM conversation_states WHERE expires_at <= ?
        "#,
    )
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
