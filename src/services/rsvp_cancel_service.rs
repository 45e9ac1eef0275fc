use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::database::{event_repo, registration_repo};
use crate::error::RsvpError;
use crate::models::AttendeeType;
use crate::services::{now_rfc3339, session_service};

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub session_token: String,
    pub event_id: String,
    pub attendee_id: String,
    pub attendee_type: String, // self|dependent
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub success: bool,
    pub message: String,
    pub attendee_id: String,
    pub attendee_type: AttendeeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_before_event: Option<i64>,
}

/// Cancels exactly one registration: ownership check against the stored
/// owner_identity, then a hard delete paired with the attendance decrement in
/// the same transaction. A volunteer may cancel their own registration or any
/// of their dependents', never another volunteer's.
pub async fn cancel_rsvp(pool: &SqlitePool, req: CancelRequest) -> Result<CancelResponse, RsvpError> {
    let volunteer = session_service::resolve_session(pool, &req.session_token).await?;

    if AttendeeType::parse(&req.attendee_type).is_none() {
        return Err(RsvpError::Validation(format!(
            "unknown attendee type '{}'",
            req.attendee_type
        )));
    }

    let Some(record) =
        registration_repo::load_registration(pool, &req.event_id, &req.attendee_id).await?
    else {
        return Err(RsvpError::NotFound);
    };

    if record.owner_identity != volunteer.email {
        return Err(RsvpError::Unauthorized);
    }

    let now = now_rfc3339();
    let mut tx = pool.begin().await?;
    let deleted =
        registration_repo::delete_registration(&mut *tx, &req.event_id, &req.attendee_id).await?;
    if deleted != 1 {
        // Raced with another cancellation; nothing to decrement.
        return Err(RsvpError::NotFound);
    }
    event_repo::release_seat(&mut *tx, &req.event_id, &now).await?;
    tx.commit().await?;

    let hours_before_event = event_repo::load_event(pool, &req.event_id)
        .await?
        .and_then(|e| e.starts_at)
        .and_then(|starts_at| hours_until(&starts_at, Utc::now()));

    Ok(CancelResponse {
        success: true,
        message: format!(
            "Cancelled registration for {} {}",
            record.first_name, record.last_name
        ),
        attendee_id: req.attendee_id,
        attendee_type: record.effective_attendee_type(),
        hours_before_event,
    })
}

/// Whole hours between now and the event start, truncated toward zero.
/// Negative once the event has started; None when the stored start time does
/// not parse.
fn hours_until(starts_at: &str, now: DateTime<Utc>) -> Option<i64> {
    let start = DateTime::parse_from_rfc3339(starts_at).ok()?;
    Some((start.with_timezone(&Utc) - now).num_hours())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_until_truncates_toward_zero() {
        let now = DateTime::parse_from_rfc3339("2026-08-01T00:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(hours_until("2026-08-02T12:30:00+00:00", now), Some(36));
        assert_eq!(hours_until("2026-08-01T00:30:00+00:00", now), Some(0));
        assert_eq!(hours_until("2026-07-31T00:00:00+00:00", now), Some(-24));
    }

    #[test]
    fn hours_until_rejects_unparseable_start() {
        assert_eq!(hours_until("next tuesday", Utc::now()), None);
    }
}
