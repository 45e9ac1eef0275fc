pub mod rsvp_cancel_service;
pub mod rsvp_status_service;
pub mod rsvp_submit_service;
pub mod session_service;

use chrono::Utc;

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
