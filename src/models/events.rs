#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventsRow {
    pub event_id: String,
    pub attendance_cap: i64,
    pub attendance_count: i64,
    pub starts_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl EventsRow {
    pub fn remaining(&self) -> i64 {
        (self.attendance_cap - self.attendance_count).max(0)
    }
}
