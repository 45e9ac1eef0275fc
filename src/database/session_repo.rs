use sqlx::SqliteExecutor;

use crate::models::SessionsRow;

const SQL_LOAD_SESSION: &str = r#"
SELECT
  token,
  email,
  expires_at,
  created_at
FROM sessions
WHERE token = ?1
LIMIT 1
"#;

pub async fn load_session(
    ex: impl SqliteExecutor<'_>,
    token: &str,
) -> sqlx::Result<Option<SessionsRow>> {
    sqlx::query_as::<_, SessionsRow>(SQL_LOAD_SESSION)
        .bind(token)
        .fetch_optional(ex)
        .await
}
