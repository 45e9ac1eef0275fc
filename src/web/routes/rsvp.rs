use axum::{extract::State, response::IntoResponse, Json};
use sqlx::SqlitePool;
use tracing::{error, warn};

use crate::error::RsvpError;
use crate::services::rsvp_cancel_service::{self, CancelRequest};
use crate::services::rsvp_status_service::{self, CheckRequest};
use crate::services::rsvp_submit_service::{self, SubmitRequest};

pub async fn submit_handler(
    State(pool): State<SqlitePool>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    match rsvp_submit_service::submit_rsvp(&pool, req).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            log_failure("RSVP submit", &e);
            e.into_response()
        }
    }
}

pub async fn check_handler(
    State(pool): State<SqlitePool>,
    Json(req): Json<CheckRequest>,
) -> impl IntoResponse {
    match rsvp_status_service::check_rsvps(&pool, req).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            log_failure("RSVP check", &e);
            e.into_response()
        }
    }
}

pub async fn cancel_handler(
    State(pool): State<SqlitePool>,
    Json(req): Json<CancelRequest>,
) -> impl IntoResponse {
    match rsvp_cancel_service::cancel_rsvp(&pool, req).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            log_failure("RSVP cancel", &e);
            e.into_response()
        }
    }
}

fn log_failure(op: &str, e: &RsvpError) {
    match e {
        RsvpError::Store(_) => error!("{} failed: {}", op, e),
        _ => warn!("{} rejected: {}", op, e),
    }
}
