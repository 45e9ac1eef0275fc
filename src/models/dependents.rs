// Dependents are owned by the account system; this service only reads them to
// resolve and trust attendee selections.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DependentsRow {
    pub dependent_id: String,
    pub guardian_email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub created_at: String,
}
