use sqlx::SqliteExecutor;

use crate::models::DependentsRow;

const SQL_LIST_DEPENDENTS_FOR_GUARDIAN: &str = r#"
SELECT
  dependent_id,
  guardian_email,
  first_name,
  last_name,
  age,
  created_at
FROM dependents
WHERE guardian_email = ?1
ORDER BY created_at ASC
"#;

pub async fn list_dependents_for_guardian(
    ex: impl SqliteExecutor<'_>,
    guardian_email: &str,
) -> sqlx::Result<Vec<DependentsRow>> {
    sqlx::query_as::<_, DependentsRow>(SQL_LIST_DEPENDENTS_FOR_GUARDIAN)
        .bind(guardian_email)
        .fetch_all(ex)
        .await
}
