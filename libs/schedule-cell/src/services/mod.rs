pub mod availability;
pub mod detailed;
pub mod unavailability;
pub mod weekly;

pub use availability::AvailabilityService;
pub use detailed::DetailedScheduleService;
pub use unavailability::UnavailabilityService;
pub use weekly::WeeklyScheduleService;
