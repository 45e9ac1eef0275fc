use sqlx::SqliteExecutor;

use crate::models::RegistrationsRow;

pub struct NewRegistration<'a> {
    pub event_id: &'a str,
    pub attendee_id: &'a str,
    pub attendee_type: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub owner_identity: &'a str,
    pub age_at_registration: Option<i64>,
    pub now: &'a str,
}

// Plain INSERT against the (event_id, attendee_id) primary key: a unique
// violation here is the per-record existence condition failing, i.e. a
// concurrent registration of the same attendee.
const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO registrations (
  event_id,
  attendee_id,
  attendee_type,
  first_name,
  last_name,
  owner_identity,
  age_at_registration,
  created_at,
  updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
"#;

pub async fn insert_registration(
    ex: impl SqliteExecutor<'_>,
    reg: NewRegistration<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REGISTRATION)
        .bind(reg.event_id)
        .bind(reg.attendee_id)
        .bind(reg.attendee_type)
        .bind(reg.first_name)
        .bind(reg.last_name)
        .bind(reg.owner_identity)
        .bind(reg.age_at_registration)
        .bind(reg.now)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_REGISTRATION: &str = r#"
SELECT
  event_id,
  attendee_id,
  attendee_type,
  first_name,
  last_name,
  owner_identity,
  age_at_registration,
  created_at,
  updated_at
FROM registrations
WHERE event_id = ?1
  AND attendee_id = ?2
LIMIT 1
"#;

pub async fn load_registration(
    ex: impl SqliteExecutor<'_>,
    event_id: &str,
    attendee_id: &str,
) -> sqlx::Result<Option<RegistrationsRow>> {
    sqlx::query_as::<_, RegistrationsRow>(SQL_LOAD_REGISTRATION)
        .bind(event_id)
        .bind(attendee_id)
        .fetch_optional(ex)
        .await
}

const SQL_LIST_LIVE_ATTENDEE_IDS: &str = r#"
SELECT attendee_id
FROM registrations
WHERE event_id = ?1
"#;

pub async fn list_live_attendee_ids(
    ex: impl SqliteExecutor<'_>,
    event_id: &str,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(SQL_LIST_LIVE_ATTENDEE_IDS)
        .bind(event_id)
        .fetch_all(ex)
        .await
}

// Owner-index range query backing the guardian aggregation. Legacy rows are
// always self-shaped, so filtering on attendee_type = 'dependent' is safe.
const SQL_LIST_DEPENDENT_REGISTRATIONS_BY_OWNER: &str = r#"
SELECT
  event_id,
  attendee_id,
  attendee_type,
  first_name,
  last_name,
  owner_identity,
  age_at_registration,
  created_at,
  updated_at
FROM registrations
WHERE event_id = ?1
  AND owner_identity = ?2
  AND attendee_type = 'dependent'
ORDER BY created_at ASC, attendee_id ASC
"#;

pub async fn list_dependent_registrations_by_owner(
    ex: impl SqliteExecutor<'_>,
    event_id: &str,
    owner_identity: &str,
) -> sqlx::Result<Vec<RegistrationsRow>> {
    sqlx::query_as::<_, RegistrationsRow>(SQL_LIST_DEPENDENT_REGISTRATIONS_BY_OWNER)
        .bind(event_id)
        .bind(owner_identity)
        .fetch_all(ex)
        .await
}

const SQL_DELETE_REGISTRATION: &str = r#"
DELETE FROM registrations
WHERE event_id = ?1
  AND attendee_id = ?2
"#;

pub async fn delete_registration(
    ex: impl SqliteExecutor<'_>,
    event_id: &str,
    attendee_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_REGISTRATION)
        .bind(event_id)
        .bind(attendee_id)
        .execute(ex)
        .await?;
    Ok(res.rows_affected())
}
