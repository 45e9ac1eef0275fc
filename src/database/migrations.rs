use sqlx::SqlitePool;

// Registrations deliberately carry no foreign keys: first_name/last_name and
// age_at_registration are snapshots that must outlive the dependents/users
// rows they were copied from.
const SQL_CREATE_EVENTS: &str = r#"
CREATE TABLE IF NOT EXISTS events (
  event_id TEXT PRIMARY KEY,
  attendance_cap INTEGER NOT NULL,
  attendance_count INTEGER NOT NULL DEFAULT 0,
  starts_at TEXT,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
)
"#;

// attendee_type is nullable on purpose: NULL marks a row written before the
// attendee columns existed. Those rows keep the owner's email in attendee_id.
const SQL_CREATE_REGISTRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS registrations (
  event_id TEXT NOT NULL,
  attendee_id TEXT NOT NULL,
  attendee_type TEXT,
  first_name TEXT NOT NULL,
  last_name TEXT NOT NULL,
  owner_identity TEXT NOT NULL,
  age_at_registration INTEGER,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL,
  PRIMARY KEY (event_id, attendee_id)
)
"#;

const SQL_CREATE_REGISTRATIONS_OWNER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_registrations_owner
ON registrations (event_id, owner_identity)
"#;

const SQL_CREATE_DEPENDENTS: &str = r#"
CREATE TABLE IF NOT EXISTS dependents (
  dependent_id TEXT PRIMARY KEY,
  guardian_email TEXT NOT NULL,
  first_name TEXT NOT NULL,
  last_name TEXT NOT NULL,
  age INTEGER NOT NULL,
  created_at TEXT NOT NULL
)
"#;

const SQL_CREATE_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
  token TEXT PRIMARY KEY,
  email TEXT NOT NULL,
  expires_at TEXT NOT NULL,
  created_at TEXT NOT NULL
)
"#;

pub async fn run(pool: &SqlitePool) -> sqlx::Result<()> {
    for sql in [
        SQL_CREATE_EVENTS,
        SQL_CREATE_REGISTRATIONS,
        SQL_CREATE_REGISTRATIONS_OWNER_INDEX,
        SQL_CREATE_DEPENDENTS,
        SQL_CREATE_SESSIONS,
    ] {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
