pub mod dependents;
pub mod events;
pub mod registrations;
pub mod sessions;

pub use dependents::DependentsRow;
pub use events::EventsRow;
pub use registrations::{AttendeeType, RegistrationsRow};
pub use sessions::SessionsRow;
