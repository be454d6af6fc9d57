// libs/schedule-cell/src/services/unavailability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use shared_models::{AppError, DoctorId, ProviderRegistry, WindowId};
use shared_utils::clock::Clock;
use shared_utils::interval::date_ranges_overlap;
use shared_utils::validation;

use crate::models::{
    CreateUnavailabilityRequest, NewUnavailabilityWindow, ScheduleState,
    UnavailabilityKind, UnavailabilityPatch, UnavailabilityWindow,
    UpdateUnavailabilityRequest,
};
use crate::store::UnavailabilityStore;

/// Temporary unavailability (vacation, leave, training). An active window
/// blocks the doctor for every date it covers, regardless of schedule
/// entries.
pub struct UnavailabilityService {
    store: Arc<dyn UnavailabilityStore>,
    registry: Arc<dyn ProviderRegistry>,
    clock: Arc<dyn Clock>,
}

impl UnavailabilityService {
    pub fn new(
        store: Arc<dyn UnavailabilityStore>,
        registry: Arc<dyn ProviderRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
        }
    }

    pub async fn create_window(
        &self,
        request: CreateUnavailabilityRequest,
    ) -> Result<UnavailabilityWindow, AppError> {
        debug!(
            "Creating unavailability window for doctor {} from {} to {}",
            request.doctor_id, request.start_date, request.end_date
        );

        validation::positive_id(request.doctor_id, "doctor_id")?;
        validation::date_range(request.start_date, request.end_date)?;
        let kind = validation::state_tag::<UnavailabilityKind>(&request.kind, "kind")?;

        if !self.registry.doctor_exists(request.doctor_id).await? {
            warn!("Doctor {} not found in registry", request.doctor_id);
            return Err(AppError::not_found(format!("doctor {}", request.doctor_id)));
        }

        self.check_conflicts(
            request.doctor_id,
            request.start_date,
            request.end_date,
            None,
        )
        .await?;

        let window = self
            .store
            .create(NewUnavailabilityWindow {
                doctor_id: request.doctor_id,
                start_date: request.start_date,
                end_date: request.end_date,
                kind,
                reason: request.reason,
                state: ScheduleState::Active,
                created_at: self.clock.now(),
            })
            .await?;

        info!(
            "Unavailability window {} ({}) created for doctor {}",
            window.id, window.kind, window.doctor_id
        );
        Ok(window)
    }

    pub async fn update_window(
        &self,
        id: WindowId,
        request: UpdateUnavailabilityRequest,
    ) -> Result<UnavailabilityWindow, AppError> {
        let current = self.get_window(id).await?;

        let start_date = request.start_date.unwrap_or(current.start_date);
        let end_date = request.end_date.unwrap_or(current.end_date);
        validation::date_range(start_date, end_date)?;

        let state = request
            .state
            .as_deref()
            .map(|raw| validation::state_tag::<ScheduleState>(raw, "state"))
            .transpose()?;

        if state.unwrap_or(current.state) == ScheduleState::Active {
            self.check_conflicts(current.doctor_id, start_date, end_date, Some(id))
                .await?;
        }

        let patch = UnavailabilityPatch {
            start_date: request.start_date,
            end_date: request.end_date,
            state,
            reason: request.reason,
        };

        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("unavailability window {id}")))
    }

    pub async fn deactivate_window(&self, id: WindowId) -> Result<UnavailabilityWindow, AppError> {
        let patch = UnavailabilityPatch {
            state: Some(ScheduleState::Inactive),
            ..UnavailabilityPatch::default()
        };
        let window = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("unavailability window {id}")))?;
        info!("Unavailability window {} deactivated", id);
        Ok(window)
    }

    pub async fn delete_window(&self, id: WindowId) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::not_found(format!("unavailability window {id}")));
        }
        Ok(())
    }

    pub async fn get_window(&self, id: WindowId) -> Result<UnavailabilityWindow, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("unavailability window {id}")))
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<UnavailabilityWindow>, AppError> {
        validation::positive_id(doctor_id, "doctor_id")?;
        self.store.list_for_doctor(doctor_id).await
    }

    /// Range-overlap guard against other active windows for the same doctor.
    async fn check_conflicts(
        &self,
        doctor_id: DoctorId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<WindowId>,
    ) -> Result<(), AppError> {
        let existing = self
            .store
            .list_in_range(doctor_id, start_date, end_date)
            .await?;

        for other in existing {
            if exclude_id == Some(other.id) || other.state != ScheduleState::Active {
                continue;
            }
            if date_ranges_overlap(start_date, end_date, other.start_date, other.end_date) {
                warn!(
                    "Unavailability conflict for doctor {}: window {}",
                    doctor_id, other.id
                );
                return Err(AppError::conflict(format!(
                    "date range overlaps active unavailability window {}",
                    other.id
                )));
            }
        }
        Ok(())
    }
}
