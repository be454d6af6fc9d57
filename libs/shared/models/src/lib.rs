pub mod error;
pub mod ids;
pub mod registry;

pub use error::AppError;
pub use ids::{AppointmentId, DoctorId, PatientId, ScheduleEntryId, WindowId};
pub use registry::ProviderRegistry;
