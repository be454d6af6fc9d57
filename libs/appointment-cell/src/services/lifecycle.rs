// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_models::{AppError, AppointmentId};
use shared_utils::clock::Clock;
use shared_utils::validation;

use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, CancelAppointmentRequest};
use crate::store::AppointmentStore;

/// Lifecycle state machine:
/// scheduled -> confirmed -> in_progress -> completed;
/// scheduled|confirmed -> cancelled; scheduled|confirmed -> no_show.
/// completed, cancelled and no_show are terminal.
pub struct AppointmentLifecycleService {
    store: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
}

impl AppointmentLifecycleService {
    pub fn new(store: Arc<dyn AppointmentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// All legal next statuses for a given current status.
    pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current {
            AppointmentStatus::Scheduled => &[
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Confirmed => &[
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::InProgress => &[AppointmentStatus::Completed],
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => &[],
        }
    }

    pub fn validate_transition(
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), AppError> {
        if !Self::valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(AppError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        Ok(())
    }

    pub async fn confirm(&self, id: AppointmentId) -> Result<Appointment, AppError> {
        self.transition(id, AppointmentStatus::Confirmed, AppointmentPatch::default())
            .await
    }

    pub async fn start(&self, id: AppointmentId) -> Result<Appointment, AppError> {
        self.transition(id, AppointmentStatus::InProgress, AppointmentPatch::default())
            .await
    }

    pub async fn complete(
        &self,
        id: AppointmentId,
        notes: Option<String>,
    ) -> Result<Appointment, AppError> {
        let patch = AppointmentPatch {
            notes,
            ..AppointmentPatch::default()
        };
        self.transition(id, AppointmentStatus::Completed, patch).await
    }

    pub async fn cancel(
        &self,
        id: AppointmentId,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        validation::non_empty(&request.reason, "cancellation reason")?;
        let patch = AppointmentPatch {
            cancelled_by: Some(request.cancelled_by),
            cancellation_reason: Some(request.reason),
            ..AppointmentPatch::default()
        };
        self.transition(id, AppointmentStatus::Cancelled, patch).await
    }

    pub async fn mark_no_show(&self, id: AppointmentId) -> Result<Appointment, AppError> {
        self.transition(id, AppointmentStatus::NoShow, AppointmentPatch::default())
            .await
    }

    async fn transition(
        &self,
        id: AppointmentId,
        next: AppointmentStatus,
        mut patch: AppointmentPatch,
    ) -> Result<Appointment, AppError> {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("appointment {id}")))?;

        debug!(
            "Transitioning appointment {} from {} to {}",
            id, current.status, next
        );
        Self::validate_transition(current.status, next)?;

        patch.status = Some(next);
        patch.modified_at = Some(self.clock.now());

        let updated = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("appointment {id}")))?;

        info!("Appointment {} is now {}", id, updated.status);
        Ok(updated)
    }
}
