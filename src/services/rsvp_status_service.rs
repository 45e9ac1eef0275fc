use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::{event_repo, registration_repo};
use crate::error::RsvpError;
use crate::models::{AttendeeType, RegistrationsRow};

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub event_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserRsvpView {
    pub attendee_id: String,
    pub attendee_type: AttendeeType,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub rsvp_count: i64,
    pub user_registered: bool,
    /// Present only when an email was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rsvps: Option<Vec<UserRsvpView>>,
}

/// Returns the event's live attendance and, when an email is supplied, the
/// union of that volunteer's own registration and every dependent
/// registration they own.
pub async fn check_rsvps(pool: &SqlitePool, req: CheckRequest) -> Result<CheckResponse, RsvpError> {
    let rsvp_count = event_repo::load_event(pool, &req.event_id)
        .await?
        .map(|e| e.attendance_count)
        .unwrap_or(0);

    let Some(email) = req.email.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(CheckResponse {
            success: true,
            rsvp_count,
            user_registered: false,
            user_rsvps: None,
        });
    };

    let mut views: Vec<UserRsvpView> = Vec::new();

    // Own registration: a point read by (event_id, email). Legacy-shaped rows
    // keyed by email are found by the same read.
    if let Some(own) = registration_repo::load_registration(pool, &req.event_id, email).await? {
        views.push(to_view(&own));
    }

    // Dependent registrations come off the owner index. If that index is
    // unavailable we degrade to the own-registration answer instead of
    // failing the whole check; the gap is logged, not hidden.
    match registration_repo::list_dependent_registrations_by_owner(pool, &req.event_id, email).await
    {
        Ok(rows) => {
            views.extend(rows.iter().map(to_view));
        }
        Err(e) => {
            warn!(
                "Dependent lookup unavailable for event {}, returning own registration only: {}",
                req.event_id, e
            );
        }
    }

    Ok(CheckResponse {
        success: true,
        rsvp_count,
        user_registered: !views.is_empty(),
        user_rsvps: Some(views),
    })
}

fn to_view(row: &RegistrationsRow) -> UserRsvpView {
    let attendee_type = row.effective_attendee_type();
    UserRsvpView {
        attendee_id: row.effective_attendee_id().to_string(),
        attendee_type,
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        age: match attendee_type {
            AttendeeType::Dependent => row.age_at_registration,
            AttendeeType::Volunteer => None,
        },
        created_at: row.created_at.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_row_surfaces_as_self_with_owner_id() {
        let row = RegistrationsRow {
            event_id: "evt-1".into(),
            attendee_id: "ada@example.org".into(),
            attendee_type: None,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            owner_identity: "ada@example.org".into(),
            age_at_registration: None,
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let view = to_view(&row);
        assert_eq!(view.attendee_type, AttendeeType::Volunteer);
        assert_eq!(view.attendee_id, "ada@example.org");
        assert_eq!(view.age, None);
    }

    #[test]
    fn dependent_view_carries_age_snapshot() {
        let row = RegistrationsRow {
            event_id: "evt-1".into(),
            attendee_id: "dep-1".into(),
            attendee_type: Some("dependent".into()),
            first_name: "Kim".into(),
            last_name: "Vos".into(),
            owner_identity: "ada@example.org".into(),
            age_at_registration: Some(9),
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let view = to_view(&row);
        assert_eq!(view.attendee_type, AttendeeType::Dependent);
        assert_eq!(view.age, Some(9));
    }
}
