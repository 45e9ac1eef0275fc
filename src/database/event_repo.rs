use sqlx::SqliteExecutor;

use crate::models::EventsRow;

const SQL_LOAD_EVENT: &str = r#"
SELECT
  event_id,
  attendance_cap,
  attendance_count,
  starts_at,
  created_at,
  updated_at
FROM events
WHERE event_id = ?1
LIMIT 1
"#;

pub async fn load_event(
    ex: impl SqliteExecutor<'_>,
    event_id: &str,
) -> sqlx::Result<Option<EventsRow>> {
    sqlx::query_as::<_, EventsRow>(SQL_LOAD_EVENT)
        .bind(event_id)
        .fetch_optional(ex)
        .await
}

// First submission against an unknown event provisions its row; a cap sent
// for an event that already exists never overwrites the stored one.
const SQL_ENSURE_EVENT: &str = r#"
INSERT OR IGNORE INTO events (
  event_id,
  attendance_cap,
  attendance_count,
  starts_at,
  created_at,
  updated_at
) VALUES (?1, ?2, 0, NULL, ?3, ?3)
"#;

pub async fn ensure_event(
    ex: impl SqliteExecutor<'_>,
    event_id: &str,
    attendance_cap: i64,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_ENSURE_EVENT)
        .bind(event_id)
        .bind(attendance_cap)
        .bind(now)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

// Conditional write: the WHERE clause re-evaluates the cap against the
// then-current count, so the bump and the check are indivisible. Zero rows
// affected means the batch no longer fits.
const SQL_RESERVE_CAPACITY: &str = r#"
UPDATE events
SET attendance_count = attendance_count + ?1,
    updated_at = ?2
WHERE event_id = ?3
  AND attendance_count + ?1 <= attendance_cap
"#;

pub async fn try_reserve_capacity(
    ex: impl SqliteExecutor<'_>,
    event_id: &str,
    seats: i64,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_RESERVE_CAPACITY)
        .bind(seats)
        .bind(now)
        .bind(event_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_RELEASE_SEAT: &str = r#"
UPDATE events
SET attendance_count = MAX(attendance_count - 1, 0),
    updated_at = ?1
WHERE event_id = ?2
"#;

pub async fn release_seat(
    ex: impl SqliteExecutor<'_>,
    event_id: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_RELEASE_SEAT)
        .bind(now)
        .bind(event_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}
