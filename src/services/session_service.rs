use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::database::session_repo;
use crate::error::RsvpError;

/// Verified volunteer identity, resolved from the session token the external
/// auth flow issued. Everything downstream trusts this value.
#[derive(Clone, Debug)]
pub struct AuthenticatedVolunteer {
    pub email: String,
}

pub async fn resolve_session(
    pool: &SqlitePool,
    token: &str,
) -> Result<AuthenticatedVolunteer, RsvpError> {
    if token.trim().is_empty() {
        return Err(RsvpError::InvalidSession);
    }

    let Some(session) = session_repo::load_session(pool, token).await? else {
        return Err(RsvpError::InvalidSession);
    };

    // An unparseable expiry counts as expired.
    let expired = DateTime::parse_from_rfc3339(&session.expires_at)
        .map(|t| t.with_timezone(&Utc) <= Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(RsvpError::InvalidSession);
    }

    Ok(AuthenticatedVolunteer {
        email: session.email,
    })
}
