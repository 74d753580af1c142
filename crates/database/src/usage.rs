//! Usage counters backing the monthly search quota.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::UsageStat;

/// Searches used by a user in a period. Zero when no row exists yet.
pub async fn get_usage(pool: &SqlitePool, user_id: i64, period: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT usage_count FROM usage_stats WHERE user_id = ? AND period = ?
        "#,
    )
    .bind(user_id)
    .bind(period)
    .fetch_optional(pool)
    .await?;

    Ok(count.unwrap_or(0))
}

/// Fetch the full usage row, if any.
pub async fn get_usage_stat(
    pool: &SqlitePool,
    user_id: i64,
    period: &str,
) -> Result<Option<UsageStat>> {
    let stat = sqlx::query_as::<_, UsageStat>(
        r#"
        SELECT user_id, period, usage_count, limit_notified, updated_at
        FROM usage_stats
        WHERE user_id = ? AND period = ?
        "#,
    )
    .bind(user_id)
    .bind(period)
    .fetch_optional(pool)
    .await?;

    Ok(stat)
}

/// Add `amount` to the period counter, clamped to `limit`, and return the
/// stored count. The counter never decreases.
pub async fn charge(
    pool: &SqlitePool,
    user_id: i64,
    period: &str,
    amount: i64,
    limit: i64,
    now: NaiveDateTime,
) -> Result<i64> {
    let amount = amount.max(0);
    let limit = limit.max(0);

    let count = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO usage_stats (user_id, period, usage_count, limit_notified, updated_at)
        VALUES (?, ?, MIN(?, ?), 0, ?)
        ON CONFLICT(user_id, period) DO UPDATE SET
            usage_count = MAX(usage_stats.usage_count, MIN(usage_stats.usage_count + ?, ?)),
            updated_at = excluded.updated_at
        RETURNING usage_count
        "#,
    )
    .bind(user_id)
    .bind(period)
    .bind(amount)
    .bind(limit)
    .bind(now)
    .bind(amount)
    .bind(limit)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Set the period's limit-notified flag. Returns true only for the caller
/// that flipped it from unset to set.
pub async fn mark_limit_notified(
    pool: &SqlitePool,
    user_id: i64,
    period: &str,
    now: NaiveDateTime,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO usage_stats (user_id, period, usage_count, limit_notified, updated_at)
        VALUES (?, ?, 0, 1, ?)
        ON CONFLICT(user_id, period) DO UPDATE SET
            limit_notified = 1,
            updated_at = excluded.updated_at
        WHERE usage_stats.limit_notified = 0
        "#,
    )
    .bind(user_id)
    .bind(period)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Number of users whose usage in `period` reached `limit`.
pub async fn count_users_at_limit(pool: &SqlitePool, period: &str, limit: i64) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM usage_stats WHERE period = ? AND usage_count >= ?
        "#,
    )
    .bind(period)
    .bind(limit)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{user, Database};
    use chrono::NaiveDate;

    const LIMIT: i64 = 200;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    async fn setup() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        user::ensure_user(db.pool(), 1, None, t0()).await.unwrap();
        user::ensure_user(db.pool(), 2, None, t0()).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_charge_clamps_at_limit() {
        let db = setup().await;

        for _ in 0..LIMIT {
            charge(db.pool(), 1, "2025-05", 1, LIMIT, t0()).await.unwrap();
        }
        assert_eq!(get_usage(db.pool(), 1, "2025-05").await.unwrap(), LIMIT);

        let after = charge(db.pool(), 1, "2025-05", 1, LIMIT, t0()).await.unwrap();
        assert_eq!(after, LIMIT);
    }

    #[tokio::test]
    async fn test_new_period_starts_at_zero() {
        let db = setup().await;
        charge(db.pool(), 1, "2025-05", 3, LIMIT, t0()).await.unwrap();

        assert_eq!(get_usage(db.pool(), 1, "2025-05").await.unwrap(), 3);
        assert_eq!(get_usage(db.pool(), 1, "2025-06").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_first_charge_is_clamped_too() {
        let db = setup().await;
        assert_eq!(charge(db.pool(), 1, "2025-05", 500, LIMIT, t0()).await.unwrap(), LIMIT);
    }

    #[tokio::test]
    async fn test_limit_notified_flips_once() {
        let db = setup().await;
        charge(db.pool(), 1, "2025-05", LIMIT, LIMIT, t0()).await.unwrap();

        assert!(mark_limit_notified(db.pool(), 1, "2025-05", t0()).await.unwrap());
        assert!(!mark_limit_notified(db.pool(), 1, "2025-05", t0()).await.unwrap());
        assert!(mark_limit_notified(db.pool(), 1, "2025-06", t0()).await.unwrap());

        let stat = get_usage_stat(db.pool(), 1, "2025-05").await.unwrap().unwrap();
        assert!(stat.limit_notified);
        assert_eq!(stat.usage_count, LIMIT);
    }

    #[tokio::test]
    async fn test_count_users_at_limit() {
        let db = setup().await;
        charge(db.pool(), 1, "2025-05", LIMIT, LIMIT, t0()).await.unwrap();
        charge(db.pool(), 2, "2025-05", 10, LIMIT, t0()).await.unwrap();

        assert_eq!(count_users_at_limit(db.pool(), "2025-05", LIMIT).await.unwrap(), 1);
    }
}
