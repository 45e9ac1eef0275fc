// Sessions are issued by the external auth flow; this service only verifies
// token validity and expiry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionsRow {
    pub token: String,
    pub email: String,
    pub expires_at: String,
    pub created_at: String,
}
