use async_trait::async_trait;

use crate::error::AppError;
use crate::ids::{DoctorId, PatientId};

/// Boundary to the external patient/doctor registries. The scheduling core
/// never owns these records; it only asks whether a referenced id resolves.
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    async fn doctor_exists(&self, doctor_id: DoctorId) -> Result<bool, AppError>;

    async fn patient_exists(&self, patient_id: PatientId) -> Result<bool, AppError>;
}
