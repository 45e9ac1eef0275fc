use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::database::{dependent_repo, event_repo, registration_repo};
use crate::error::RsvpError;
use crate::models::{AttendeeType, DependentsRow};
use crate::services::{now_rfc3339, session_service};

/// Cap used when a submission provisions an event that doesn't carry one.
pub const DEFAULT_ATTENDANCE_CAP: i64 = 50;

/// Submit body. Either `attendees` (modern shape) or the bare
/// `first_name`/`last_name` pair (legacy single-person shape) must be present;
/// the branch is resolved once, in `normalize_attendees`, and never
/// re-inspected downstream.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub session_token: String,
    pub event_id: String,
    #[serde(default)]
    pub attendees: Option<Vec<AttendeeSelection>>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub attendance_cap: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AttendeeSelection {
    #[serde(rename = "type")]
    pub attendee_type: String, // self|dependent
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
}

/// Canonical attendee descriptor produced by the normalizer.
#[derive(Debug, Clone)]
pub struct AttendeeDraft {
    pub attendee_id: String,
    pub attendee_type: AttendeeType,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AttendeeResult {
    pub attendee_id: String,
    pub status: &'static str, // registered|already_registered
    pub attendee_type: AttendeeType,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<AttendeeResult>,
    pub current_attendance: i64,
    pub attendance_cap: i64,
    /// Echoed for legacy single-person callers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

pub async fn submit_rsvp(
    pool: &SqlitePool,
    req: SubmitRequest,
) -> Result<SubmitResponse, RsvpError> {
    let volunteer = session_service::resolve_session(pool, &req.session_token).await?;

    if let Some(cap) = req.attendance_cap {
        if cap < 1 {
            return Err(RsvpError::Validation(
                "attendance_cap must be at least 1".into(),
            ));
        }
    }

    let legacy_shape = req.attendees.is_none();
    let dependents = dependent_repo::list_dependents_for_guardian(pool, &volunteer.email).await?;
    let drafts = normalize_attendees(&volunteer.email, &req, &dependents)?;

    let existing: HashSet<String> = registration_repo::list_live_attendee_ids(pool, &req.event_id)
        .await?
        .into_iter()
        .collect();
    let canonical: Vec<(String, AttendeeType)> = drafts
        .iter()
        .map(|d| (d.attendee_id.clone(), d.attendee_type))
        .collect();
    let (to_register, already_registered) = partition_duplicates(drafts, &existing)?;

    // Fast-fail pre-check. Not authoritative: the write transaction below
    // re-validates against then-current state.
    let cap_if_new = req.attendance_cap.unwrap_or(DEFAULT_ATTENDANCE_CAP);
    let (current, cap) = match event_repo::load_event(pool, &req.event_id).await? {
        Some(event) => (event.attendance_count, event.attendance_cap),
        None => (0, cap_if_new),
    };
    check_capacity(current, cap, to_register.len() as i64)?;

    write_registrations(pool, &req.event_id, cap_if_new, &volunteer.email, &to_register).await?;

    let (current_attendance, attendance_cap) = match event_repo::load_event(pool, &req.event_id)
        .await?
    {
        Some(event) => (event.attendance_count, event.attendance_cap),
        None => (to_register.len() as i64, cap_if_new),
    };

    let message = if already_registered.is_empty() {
        format!("Registered {} attendee(s)", to_register.len())
    } else {
        format!(
            "Registered {} attendee(s); {} already registered",
            to_register.len(),
            already_registered.len()
        )
    };

    // One entry per originally-requested attendee, in request order.
    let results: Vec<AttendeeResult> = canonical
        .into_iter()
        .map(|(attendee_id, attendee_type)| {
            let status = if existing.contains(&attendee_id) {
                "already_registered"
            } else {
                "registered"
            };
            AttendeeResult {
                attendee_id,
                status,
                attendee_type,
            }
        })
        .collect();

    Ok(SubmitResponse {
        success: true,
        message,
        results,
        current_attendance,
        attendance_cap,
        email: legacy_shape.then(|| volunteer.email),
    })
}

/// Resolves the legacy-vs-modern request branch into a canonical, non-empty
/// attendee list. Dependent descriptors must reference a dependent of the
/// calling volunteer; their name and age snapshots come from the verified
/// dependent record, never from caller input.
pub fn normalize_attendees(
    volunteer_email: &str,
    req: &SubmitRequest,
    dependents: &[DependentsRow],
) -> Result<Vec<AttendeeDraft>, RsvpError> {
    let mut drafts: Vec<AttendeeDraft> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    match &req.attendees {
        None => {
            let first = req.first_name.as_deref().map(str::trim).unwrap_or("");
            let last = req.last_name.as_deref().map(str::trim).unwrap_or("");
            if first.is_empty() || last.is_empty() {
                return Err(RsvpError::Validation(
                    "first_name and last_name are required".into(),
                ));
            }
            drafts.push(AttendeeDraft {
                attendee_id: volunteer_email.to_string(),
                attendee_type: AttendeeType::Volunteer,
                first_name: first.to_string(),
                last_name: last.to_string(),
                age: None,
            });
        }
        Some(selections) => {
            for sel in selections {
                let draft = match sel.attendee_type.as_str() {
                    "self" => {
                        let first = sel.first_name.as_deref().map(str::trim).unwrap_or("");
                        let last = sel.last_name.as_deref().map(str::trim).unwrap_or("");
                        if first.is_empty() || last.is_empty() {
                            return Err(RsvpError::Validation(
                                "first_name and last_name are required for self".into(),
                            ));
                        }
                        AttendeeDraft {
                            attendee_id: volunteer_email.to_string(),
                            attendee_type: AttendeeType::Volunteer,
                            first_name: first.to_string(),
                            last_name: last.to_string(),
                            age: None,
                        }
                    }
                    "dependent" => {
                        let Some(id) = sel.id.as_deref().filter(|s| !s.trim().is_empty()) else {
                            return Err(RsvpError::Validation(
                                "dependent attendee is missing an id".into(),
                            ));
                        };
                        let Some(dep) = dependents.iter().find(|d| d.dependent_id == id) else {
                            return Err(RsvpError::Validation(format!(
                                "dependent {id} is not linked to this account"
                            )));
                        };
                        AttendeeDraft {
                            attendee_id: dep.dependent_id.clone(),
                            attendee_type: AttendeeType::Dependent,
                            first_name: dep.first_name.clone(),
                            last_name: dep.last_name.clone(),
                            age: Some(dep.age),
                        }
                    }
                    other => {
                        return Err(RsvpError::Validation(format!(
                            "unknown attendee type '{other}'"
                        )));
                    }
                };

                // Repeating the same person within one submission collapses to
                // a single descriptor.
                if seen.insert(draft.attendee_id.clone()) {
                    drafts.push(draft);
                }
            }
        }
    }

    if drafts.is_empty() {
        return Err(RsvpError::Validation("no attendees selected".into()));
    }
    Ok(drafts)
}

/// Splits the canonical list against the event's live registrations.
/// Exact-string id comparison; duplicates are excluded silently unless every
/// attendee is one.
pub fn partition_duplicates(
    drafts: Vec<AttendeeDraft>,
    existing: &HashSet<String>,
) -> Result<(Vec<AttendeeDraft>, Vec<AttendeeDraft>), RsvpError> {
    let (already, fresh): (Vec<AttendeeDraft>, Vec<AttendeeDraft>) = drafts
        .into_iter()
        .partition(|d| existing.contains(&d.attendee_id));

    if fresh.is_empty() {
        return Err(RsvpError::Duplicate {
            already_registered: already.into_iter().map(|d| d.attendee_id).collect(),
        });
    }
    Ok((fresh, already))
}

/// Pre-check only: all-or-nothing at the submission level, never admitting a
/// subset to fill remaining seats.
pub fn check_capacity(current: i64, cap: i64, requested: i64) -> Result<(), RsvpError> {
    if current + requested > cap {
        return Err(RsvpError::CapacityExceeded {
            remaining: (cap - current).max(0),
        });
    }
    Ok(())
}

/// Commits the whole batch in one transaction: a capacity-guarded counter
/// bump (zero rows affected = the batch no longer fits) followed by one
/// insert per attendee (unique violation = concurrent duplicate). Any failure
/// rolls the whole submission back.
async fn write_registrations(
    pool: &SqlitePool,
    event_id: &str,
    cap_if_new: i64,
    owner_identity: &str,
    drafts: &[AttendeeDraft],
) -> Result<(), RsvpError> {
    let now = now_rfc3339();
    let mut tx = pool.begin().await?;

    event_repo::ensure_event(&mut *tx, event_id, cap_if_new, &now).await?;

    let reserved =
        event_repo::try_reserve_capacity(&mut *tx, event_id, drafts.len() as i64, &now).await?;
    if reserved == 0 {
        let remaining = event_repo::load_event(&mut *tx, event_id)
            .await?
            .map(|e| e.remaining())
            .unwrap_or(0);
        return Err(RsvpError::CapacityExceededAtCommit { remaining });
    }

    for draft in drafts {
        let inserted = registration_repo::insert_registration(
            &mut *tx,
            registration_repo::NewRegistration {
                event_id,
                attendee_id: &draft.attendee_id,
                attendee_type: draft.attendee_type.as_str(),
                first_name: &draft.first_name,
                last_name: &draft.last_name,
                owner_identity,
                age_at_registration: draft.age,
                now: &now,
            },
        )
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(RsvpError::Conflict {
                    attendee_id: draft.attendee_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    tx.commit().await?;
    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dependent(id: &str, guardian: &str, age: i64) -> DependentsRow {
        DependentsRow {
            dependent_id: id.into(),
            guardian_email: guardian.into(),
            first_name: "Kim".into(),
            last_name: "Vos".into(),
            age,
            created_at: "2026-01-01T00:00:00+00:00".into(),
        }
    }

    fn modern_request(attendees: Vec<AttendeeSelection>) -> SubmitRequest {
        SubmitRequest {
            session_token: "t".into(),
            event_id: "evt-1".into(),
            attendees: Some(attendees),
            first_name: None,
            last_name: None,
            attendance_cap: None,
        }
    }

    fn selection(kind: &str, id: Option<&str>) -> AttendeeSelection {
        AttendeeSelection {
            attendee_type: kind.into(),
            id: id.map(|s| s.to_string()),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            age: None,
        }
    }

    #[test]
    fn legacy_shape_yields_one_self_draft() {
        let req = SubmitRequest {
            session_token: "t".into(),
            event_id: "evt-1".into(),
            attendees: None,
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            attendance_cap: None,
        };
        let drafts = normalize_attendees("ada@example.org", &req, &[]).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].attendee_id, "ada@example.org");
        assert_eq!(drafts[0].attendee_type, AttendeeType::Volunteer);
        assert_eq!(drafts[0].age, None);
    }

    #[test]
    fn empty_modern_selection_is_rejected() {
        let req = modern_request(vec![]);
        let err = normalize_attendees("ada@example.org", &req, &[]).unwrap_err();
        assert!(matches!(err, RsvpError::Validation(_)));
    }

    #[test]
    fn unknown_attendee_type_is_rejected() {
        let req = modern_request(vec![selection("guest", None)]);
        let err = normalize_attendees("ada@example.org", &req, &[]).unwrap_err();
        assert!(matches!(err, RsvpError::Validation(_)));
    }

    #[test]
    fn dependent_must_belong_to_caller() {
        let deps = vec![dependent("dep-1", "ada@example.org", 9)];
        let req = modern_request(vec![selection("dependent", Some("dep-2"))]);
        let err = normalize_attendees("ada@example.org", &req, &deps).unwrap_err();
        assert!(matches!(err, RsvpError::Validation(_)));
    }

    #[test]
    fn dependent_snapshot_comes_from_verified_record() {
        let deps = vec![dependent("dep-1", "ada@example.org", 9)];
        let mut sel = selection("dependent", Some("dep-1"));
        sel.first_name = Some("Spoofed".into());
        sel.age = Some(40);
        let req = modern_request(vec![sel]);
        let drafts = normalize_attendees("ada@example.org", &req, &deps).unwrap();
        assert_eq!(drafts[0].first_name, "Kim");
        assert_eq!(drafts[0].age, Some(9));
        assert_eq!(drafts[0].attendee_type, AttendeeType::Dependent);
    }

    #[test]
    fn repeated_attendee_collapses_to_one_draft() {
        let deps = vec![dependent("dep-1", "ada@example.org", 9)];
        let req = modern_request(vec![
            selection("dependent", Some("dep-1")),
            selection("dependent", Some("dep-1")),
        ]);
        let drafts = normalize_attendees("ada@example.org", &req, &deps).unwrap();
        assert_eq!(drafts.len(), 1);
    }

    fn draft(id: &str) -> AttendeeDraft {
        AttendeeDraft {
            attendee_id: id.into(),
            attendee_type: AttendeeType::Dependent,
            first_name: "Kim".into(),
            last_name: "Vos".into(),
            age: Some(9),
        }
    }

    #[test]
    fn mixed_duplicates_proceed_with_new_subset() {
        let existing: HashSet<String> = ["a".to_string()].into_iter().collect();
        let (fresh, already) =
            partition_duplicates(vec![draft("a"), draft("b")], &existing).unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].attendee_id, "b");
        assert_eq!(already.len(), 1);
        assert_eq!(already[0].attendee_id, "a");
    }

    #[test]
    fn all_duplicates_fail_with_the_full_list() {
        let existing: HashSet<String> = ["a".to_string(), "b".to_string()].into_iter().collect();
        let err = partition_duplicates(vec![draft("a"), draft("b")], &existing).unwrap_err();
        match err {
            RsvpError::Duplicate { already_registered } => {
                assert_eq!(already_registered.len(), 2);
            }
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[test]
    fn id_comparison_is_exact_string() {
        let existing: HashSet<String> = ["Ada@Example.org".to_string()].into_iter().collect();
        let (fresh, already) =
            partition_duplicates(vec![draft("ada@example.org")], &existing).unwrap();
        assert_eq!(fresh.len(), 1);
        assert!(already.is_empty());
    }

    #[test]
    fn capacity_precheck_math() {
        assert!(check_capacity(0, 2, 2).is_ok());
        assert!(check_capacity(1, 2, 1).is_ok());
        match check_capacity(1, 2, 2).unwrap_err() {
            RsvpError::CapacityExceeded { remaining } => assert_eq!(remaining, 1),
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
        match check_capacity(3, 2, 1).unwrap_err() {
            RsvpError::CapacityExceeded { remaining } => assert_eq!(remaining, 0),
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }
}
