use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;

/// Failure modes of the RSVP engine. Every variant is recovered at the route
/// boundary and rendered as a structured JSON body; nothing propagates as an
/// opaque 500 except a store failure itself.
#[derive(Debug, thiserror::Error)]
pub enum RsvpError {
    #[error("invalid request: {0}")]
    Validation(String),

    /// Every requested attendee already holds a live registration.
    #[error("all selected attendees are already registered")]
    Duplicate { already_registered: Vec<String> },

    /// Pre-check rejection: the batch does not fit under the cap.
    #[error("event is at capacity ({remaining} spots remaining)")]
    CapacityExceeded { remaining: i64 },

    /// Commit-time rejection: a concurrent submission consumed the capacity
    /// between the pre-check and the write transaction.
    #[error("event filled up while processing this registration ({remaining} spots remaining)")]
    CapacityExceededAtCommit { remaining: i64 },

    /// An attendee was concurrently registered by another request between the
    /// duplicate-filter read and the commit. Retrying the whole submission
    /// re-derives the new-attendee set from fresh state.
    #[error("attendee {attendee_id} was registered by a concurrent request")]
    Conflict { attendee_id: String },

    #[error("invalid or expired session")]
    InvalidSession,

    #[error("not authorized to cancel this registration")]
    Unauthorized,

    #[error("registration not found")]
    NotFound,

    #[error("registration store unavailable")]
    Store(#[from] sqlx::Error),
}

impl RsvpError {
    fn kind(&self) -> &'static str {
        match self {
            RsvpError::Validation(_) => "validation",
            RsvpError::Duplicate { .. } => "duplicate",
            RsvpError::CapacityExceeded { .. } => "capacity",
            RsvpError::CapacityExceededAtCommit { .. } => "capacity_at_commit",
            RsvpError::Conflict { .. } => "conflict",
            RsvpError::InvalidSession => "invalid_session",
            RsvpError::Unauthorized => "unauthorized",
            RsvpError::NotFound => "not_found",
            RsvpError::Store(_) => "store_unavailable",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            RsvpError::Validation(_)
            | RsvpError::Duplicate { .. }
            | RsvpError::CapacityExceeded { .. }
            | RsvpError::CapacityExceededAtCommit { .. } => StatusCode::BAD_REQUEST,
            RsvpError::Conflict { .. } => StatusCode::CONFLICT,
            RsvpError::InvalidSession => StatusCode::UNAUTHORIZED,
            RsvpError::Unauthorized => StatusCode::FORBIDDEN,
            RsvpError::NotFound => StatusCode::NOT_FOUND,
            RsvpError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RsvpError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        });

        match &self {
            RsvpError::Duplicate { already_registered } => {
                body["duplicates"] = json!(already_registered);
            }
            RsvpError::CapacityExceeded { remaining }
            | RsvpError::CapacityExceededAtCommit { remaining } => {
                body["remaining"] = json!(remaining);
            }
            RsvpError::Conflict { attendee_id } => {
                body["attendee_id"] = json!(attendee_id);
            }
            _ => {}
        }

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_taxonomy() {
        assert_eq!(
            RsvpError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RsvpError::Duplicate {
                already_registered: vec![]
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RsvpError::CapacityExceededAtCommit { remaining: 0 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RsvpError::Conflict {
                attendee_id: "a".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(RsvpError::InvalidSession.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(RsvpError::Unauthorized.status(), StatusCode::FORBIDDEN);
        assert_eq!(RsvpError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RsvpError::Store(sqlx::Error::PoolClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
