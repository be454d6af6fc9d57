//! Identifier aliases. All ids are opaque positive integers owned by the
//! external patient/doctor registries; this subsystem only stores them.

pub type PatientId = i64;
pub type DoctorId = i64;
pub type AppointmentId = i64;
pub type ScheduleEntryId = i64;
pub type WindowId = i64;
