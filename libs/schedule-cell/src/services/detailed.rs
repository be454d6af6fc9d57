// libs/schedule-cell/src/services/detailed.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use shared_models::{AppError, DoctorId, ProviderRegistry, ScheduleEntryId};
use shared_utils::clock::Clock;
use shared_utils::interval::overlaps;
use shared_utils::validation;

use crate::models::{
    CreateDetailedScheduleRequest, DetailedScheduleEntry, DetailedScheduleKind,
    DetailedSchedulePatch, DetailedScheduleState, NewDetailedScheduleEntry,
    UpdateDetailedScheduleRequest,
};
use crate::store::DetailedScheduleStore;

/// One-off schedule overrides for a specific calendar date, layered on top
/// of the recurring weekly pattern.
pub struct DetailedScheduleService {
    store: Arc<dyn DetailedScheduleStore>,
    registry: Arc<dyn ProviderRegistry>,
    clock: Arc<dyn Clock>,
}

impl DetailedScheduleService {
    pub fn new(
        store: Arc<dyn DetailedScheduleStore>,
        registry: Arc<dyn ProviderRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
        }
    }

    pub async fn create_entry(
        &self,
        request: CreateDetailedScheduleRequest,
    ) -> Result<DetailedScheduleEntry, AppError> {
        debug!(
            "Creating detailed schedule for doctor {} on {}",
            request.doctor_id, request.date
        );

        validation::positive_id(request.doctor_id, "doctor_id")?;
        let start_time = validation::time_of_day(&request.start_time)?;
        let end_time = validation::time_of_day(&request.end_time)?;
        validation::time_range(start_time, end_time)?;
        let kind = validation::state_tag::<DetailedScheduleKind>(&request.kind, "kind")?;
        if let Some(created_by) = request.created_by {
            validation::positive_id(created_by, "created_by")?;
        }

        if !self.registry.doctor_exists(request.doctor_id).await? {
            warn!("Doctor {} not found in registry", request.doctor_id);
            return Err(AppError::not_found(format!("doctor {}", request.doctor_id)));
        }

        self.check_conflicts(request.doctor_id, request.date, start_time, end_time, None)
            .await?;

        let entry = self
            .store
            .create(NewDetailedScheduleEntry {
                doctor_id: request.doctor_id,
                date: request.date,
                start_time,
                end_time,
                kind,
                state: DetailedScheduleState::Active,
                created_by: request.created_by,
                created_at: self.clock.now(),
            })
            .await?;

        info!(
            "Detailed schedule entry {} ({}) created for doctor {} on {}",
            entry.id, entry.kind, entry.doctor_id, entry.date
        );
        Ok(entry)
    }

    pub async fn update_entry(
        &self,
        id: ScheduleEntryId,
        request: UpdateDetailedScheduleRequest,
    ) -> Result<DetailedScheduleEntry, AppError> {
        let current = self.get_entry(id).await?;

        let start_time = match request.start_time.as_deref() {
            Some(raw) => validation::time_of_day(raw)?,
            None => current.start_time,
        };
        let end_time = match request.end_time.as_deref() {
            Some(raw) => validation::time_of_day(raw)?,
            None => current.end_time,
        };
        validation::time_range(start_time, end_time)?;

        let state = request
            .state
            .as_deref()
            .map(|raw| validation::state_tag::<DetailedScheduleState>(raw, "state"))
            .transpose()?;

        if state.unwrap_or(current.state) == DetailedScheduleState::Active {
            self.check_conflicts(
                current.doctor_id,
                current.date,
                start_time,
                end_time,
                Some(id),
            )
            .await?;
        }

        let patch = DetailedSchedulePatch {
            start_time: request.start_time.is_some().then_some(start_time),
            end_time: request.end_time.is_some().then_some(end_time),
            state,
        };

        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("detailed schedule entry {id}")))
    }

    /// Cancel the override for good; a cancelled entry never produces
    /// availability again.
    pub async fn cancel_entry(&self, id: ScheduleEntryId) -> Result<DetailedScheduleEntry, AppError> {
        let patch = DetailedSchedulePatch {
            state: Some(DetailedScheduleState::Cancelled),
            ..DetailedSchedulePatch::default()
        };
        let entry = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("detailed schedule entry {id}")))?;
        info!("Detailed schedule entry {} cancelled", id);
        Ok(entry)
    }

    pub async fn delete_entry(&self, id: ScheduleEntryId) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::not_found(format!("detailed schedule entry {id}")));
        }
        Ok(())
    }

    pub async fn get_entry(&self, id: ScheduleEntryId) -> Result<DetailedScheduleEntry, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("detailed schedule entry {id}")))
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<DetailedScheduleEntry>, AppError> {
        validation::positive_id(doctor_id, "doctor_id")?;
        self.store.list_for_doctor(doctor_id).await
    }

    async fn check_conflicts(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        exclude_id: Option<ScheduleEntryId>,
    ) -> Result<(), AppError> {
        let existing = self
            .store
            .list_for_doctor_on_date(doctor_id, date)
            .await?;

        for other in existing {
            if exclude_id == Some(other.id) || other.state != DetailedScheduleState::Active {
                continue;
            }
            if overlaps(start_time, end_time, other.start_time, other.end_time) {
                warn!(
                    "Detailed schedule conflict for doctor {} on {}: entry {}",
                    doctor_id, date, other.id
                );
                return Err(AppError::conflict(format!(
                    "time range overlaps active detailed schedule entry {}",
                    other.id
                )));
            }
        }
        Ok(())
    }
}
