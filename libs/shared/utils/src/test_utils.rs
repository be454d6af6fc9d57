//! Fixtures shared by the cells' integration tests.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use shared_models::{AppError, DoctorId, PatientId, ProviderRegistry};

use crate::clock::Clock;

/// Registry over fixed id sets, standing in for the external patient and
/// doctor directories.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    doctors: HashSet<DoctorId>,
    patients: HashSet<PatientId>,
}

impl StaticRegistry {
    pub fn new(doctors: &[DoctorId], patients: &[PatientId]) -> Self {
        Self {
            doctors: doctors.iter().copied().collect(),
            patients: patients.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl ProviderRegistry for StaticRegistry {
    async fn doctor_exists(&self, doctor_id: DoctorId) -> Result<bool, AppError> {
        Ok(self.doctors.contains(&doctor_id))
    }

    async fn patient_exists(&self, patient_id: PatientId) -> Result<bool, AppError> {
        Ok(self.patients.contains(&patient_id))
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn at(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// Midnight UTC on the given calendar day.
    pub fn on_date(date: NaiveDate) -> Self {
        let at = Utc
            .from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight exists"));
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
