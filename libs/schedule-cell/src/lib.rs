pub mod models;
pub mod services;
pub mod store;

pub use models::*;
pub use services::*;
pub use store::{
    AppointmentLookup, DetailedScheduleStore, InMemoryDetailedScheduleStore,
    InMemoryUnavailabilityStore, InMemoryWeeklyScheduleStore, UnavailabilityStore,
    WeeklyScheduleStore,
};
