pub mod models;
pub mod services;
pub mod store;

pub use models::*;
pub use services::*;
pub use store::{AppointmentStore, InMemoryAppointmentStore};
