use serde::{Deserialize, Serialize};

/// Who a registration row is for: the volunteer themselves or one of their
/// dependents. Serialized as `"self"` / `"dependent"` on the wire and in the
/// `attendee_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendeeType {
    #[serde(rename = "self")]
    Volunteer,
    #[serde(rename = "dependent")]
    Dependent,
}

impl AttendeeType {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendeeType::Volunteer => "self",
            AttendeeType::Dependent => "dependent",
        }
    }

    pub fn parse(value: &str) -> Option<AttendeeType> {
        match value {
            "self" => Some(AttendeeType::Volunteer),
            "dependent" => Some(AttendeeType::Dependent),
            _ => None,
        }
    }
}

// Registration rows come in two stored shapes. Modern rows carry
// attendee_type/attendee_id explicitly; rows written before those columns
// existed have attendee_type NULL and their attendee_id column holds what was
// then the row key, the owner's email. Both shapes coexist indefinitely; the
// effective_* accessors apply the read-time interpretation and nothing ever
// rewrites a legacy row in place.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationsRow {
    pub event_id: String,
    pub attendee_id: String,
    pub attendee_type: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub owner_identity: String,
    pub age_at_registration: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl RegistrationsRow {
    pub fn effective_attendee_type(&self) -> AttendeeType {
        self.attendee_type
            .as_deref()
            .and_then(AttendeeType::parse)
            .unwrap_or(AttendeeType::Volunteer)
    }

    pub fn effective_attendee_id(&self) -> &str {
        if self.attendee_type.is_none() {
            &self.owner_identity
        } else {
            &self.attendee_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(attendee_type: Option<&str>, attendee_id: &str, owner: &str) -> RegistrationsRow {
        RegistrationsRow {
            event_id: "evt-1".into(),
            attendee_id: attendee_id.into(),
            attendee_type: attendee_type.map(|s| s.to_string()),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            owner_identity: owner.into(),
            age_at_registration: None,
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn legacy_row_reads_as_self_owned() {
        let r = row(None, "ada@example.org", "ada@example.org");
        assert_eq!(r.effective_attendee_type(), AttendeeType::Volunteer);
        assert_eq!(r.effective_attendee_id(), "ada@example.org");
    }

    #[test]
    fn modern_dependent_row_keeps_its_own_id() {
        let r = row(Some("dependent"), "dep-42", "ada@example.org");
        assert_eq!(r.effective_attendee_type(), AttendeeType::Dependent);
        assert_eq!(r.effective_attendee_id(), "dep-42");
    }
}
