// libs/schedule-cell/src/services/weekly.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use shared_models::{AppError, DoctorId, ProviderRegistry, ScheduleEntryId};
use shared_utils::clock::Clock;
use shared_utils::interval::{date_ranges_overlap, overlaps};
use shared_utils::validation;

use crate::models::{
    CreateWeeklyScheduleRequest, NewWeeklyScheduleEntry, ScheduleState,
    UpdateWeeklyScheduleRequest, WeeklySchedulePatch, WeeklyScheduleEntry,
};
use crate::store::WeeklyScheduleStore;

/// Recurring weekly availability for a doctor. Entries are soft-disabled via
/// `state`; hard delete exists as a store operation but nothing requires it.
pub struct WeeklyScheduleService {
    store: Arc<dyn WeeklyScheduleStore>,
    registry: Arc<dyn ProviderRegistry>,
    clock: Arc<dyn Clock>,
}

impl WeeklyScheduleService {
    pub fn new(
        store: Arc<dyn WeeklyScheduleStore>,
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
        request: CreateWeeklyScheduleRequest,
    ) -> Result<WeeklyScheduleEntry, AppError> {
        debug!(
            "Creating weekly schedule for doctor {} on day {}",
            request.doctor_id, request.day_of_week
        );

        validation::positive_id(request.doctor_id, "doctor_id")?;
        validation::day_of_week(request.day_of_week)?;
        let start_time = validation::time_of_day(&request.start_time)?;
        let end_time = validation::time_of_day(&request.end_time)?;
        validation::time_range(start_time, end_time)?;
        if let (Some(from), Some(to)) = (request.valid_from, request.valid_to) {
            if from > to {
                return Err(AppError::validation(format!(
                    "valid_from {from} must not be after valid_to {to}"
                )));
            }
        }

        if !self.registry.doctor_exists(request.doctor_id).await? {
            warn!("Doctor {} not found in registry", request.doctor_id);
            return Err(AppError::not_found(format!("doctor {}", request.doctor_id)));
        }

        self.check_conflicts(
            request.doctor_id,
            request.day_of_week,
            start_time,
            end_time,
            request.valid_from,
            request.valid_to,
            None,
        )
        .await?;

        let entry = self
            .store
            .create(NewWeeklyScheduleEntry {
                doctor_id: request.doctor_id,
                day_of_week: request.day_of_week,
                start_time,
                end_time,
                state: ScheduleState::Active,
                valid_from: request.valid_from,
                valid_to: request.valid_to,
                created_at: self.clock.now(),
            })
            .await?;

        info!(
            "Weekly schedule entry {} created for doctor {}",
            entry.id, entry.doctor_id
        );
        Ok(entry)
    }

    pub async fn update_entry(
        &self,
        id: ScheduleEntryId,
        request: UpdateWeeklyScheduleRequest,
    ) -> Result<WeeklyScheduleEntry, AppError> {
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
            .map(|raw| validation::state_tag::<ScheduleState>(raw, "state"))
            .transpose()?;

        let valid_from = request.valid_from.or(current.valid_from);
        let valid_to = request.valid_to.or(current.valid_to);

        // The guard only applies while the entry stays bookable.
        if state.unwrap_or(current.state) == ScheduleState::Active {
            self.check_conflicts(
                current.doctor_id,
                current.day_of_week,
                start_time,
                end_time,
                valid_from,
                valid_to,
                Some(id),
            )
            .await?;
        }

        let patch = WeeklySchedulePatch {
            start_time: request.start_time.is_some().then_some(start_time),
            end_time: request.end_time.is_some().then_some(end_time),
            state,
            valid_from: request.valid_from,
            valid_to: request.valid_to,
        };

        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("weekly schedule entry {id}")))
    }

    /// Soft-disable: the entry stops producing availability without losing
    /// its history.
    pub async fn deactivate_entry(&self, id: ScheduleEntryId) -> Result<WeeklyScheduleEntry, AppError> {
        let patch = WeeklySchedulePatch {
            state: Some(ScheduleState::Inactive),
            ..WeeklySchedulePatch::default()
        };
        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("weekly schedule entry {id}")))
    }

    pub async fn delete_entry(&self, id: ScheduleEntryId) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::not_found(format!("weekly schedule entry {id}")));
        }
        Ok(())
    }

    pub async fn get_entry(&self, id: ScheduleEntryId) -> Result<WeeklyScheduleEntry, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("weekly schedule entry {id}")))
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<WeeklyScheduleEntry>, AppError> {
        validation::positive_id(doctor_id, "doctor_id")?;
        self.store.list_for_doctor(doctor_id).await
    }

    /// Overlap guard against other active entries for the same doctor and
    /// weekday. Two entries only conflict when their validity periods can
    /// cover the same date.
    async fn check_conflicts(
        &self,
        doctor_id: DoctorId,
        day_of_week: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
        valid_from: Option<NaiveDate>,
        valid_to: Option<NaiveDate>,
        exclude_id: Option<ScheduleEntryId>,
    ) -> Result<(), AppError> {
        let from = valid_from.unwrap_or(NaiveDate::MIN);
        let to = valid_to.unwrap_or(NaiveDate::MAX);

        let existing = self
            .store
            .list_for_doctor_on_day(doctor_id, day_of_week)
            .await?;

        for other in existing {
            if exclude_id == Some(other.id) || other.state != ScheduleState::Active {
                continue;
            }
            let (other_from, other_to) = other.validity_bounds();
            if !date_ranges_overlap(from, to, other_from, other_to) {
                continue;
            }
            if overlaps(start_time, end_time, other.start_time, other.end_time) {
                warn!(
                    "Weekly schedule conflict for doctor {} on day {}: entry {}",
                    doctor_id, day_of_week, other.id
                );
                return Err(AppError::conflict(format!(
                    "time range overlaps active weekly schedule entry {}",
                    other.id
                )));
            }
        }
        Ok(())
    }
}
