// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use shared_models::{AppError, AppointmentId, DoctorId, PatientId, ProviderRegistry};
use shared_utils::clock::Clock;
use shared_utils::interval::overlaps;
use shared_utils::validation;

use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, BookAppointmentRequest, BookingRules,
    NewAppointment, UpdateAppointmentRequest,
};
use crate::store::AppointmentStore;

/// Booking write path. The overlap guard here is authoritative: it runs at
/// commit time even when the caller already consulted the availability
/// resolver, closing the race between "shown as free" and "booked".
pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    registry: Arc<dyn ProviderRegistry>,
    clock: Arc<dyn Clock>,
    rules: BookingRules,
}

impl AppointmentBookingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        registry: Arc<dyn ProviderRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_rules(store, registry, clock, BookingRules::default())
    }

    pub fn with_rules(
        store: Arc<dyn AppointmentStore>,
        registry: Arc<dyn ProviderRegistry>,
        clock: Arc<dyn Clock>,
        rules: BookingRules,
    ) -> Self {
        Self {
            store,
            registry,
            clock,
            rules,
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        debug!(
            "Booking appointment for patient {} with doctor {} on {}",
            request.patient_id, request.doctor_id, request.date
        );

        validation::positive_id(request.patient_id, "patient_id")?;
        validation::positive_id(request.doctor_id, "doctor_id")?;
        let start_time = validation::time_of_day(&request.start_time)?;
        let end_time = validation::time_of_day(&request.end_time)?;
        validation::time_range(start_time, end_time)?;

        let status = match request.status.as_deref() {
            Some(raw) => validation::state_tag::<AppointmentStatus>(raw, "status")?,
            None => AppointmentStatus::Scheduled,
        };

        if !self.registry.patient_exists(request.patient_id).await? {
            warn!("Patient {} not found in registry", request.patient_id);
            return Err(AppError::not_found(format!(
                "patient {}",
                request.patient_id
            )));
        }
        if !self.registry.doctor_exists(request.doctor_id).await? {
            warn!("Doctor {} not found in registry", request.doctor_id);
            return Err(AppError::not_found(format!("doctor {}", request.doctor_id)));
        }

        self.validate_booking_date(request.date)?;

        self.check_conflicts(request.doctor_id, request.date, start_time, end_time, None)
            .await?;

        let now = self.clock.now();
        let appointment = self
            .store
            .create(NewAppointment {
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                date: request.date,
                start_time,
                end_time,
                status,
                reason: request.reason,
                notes: request.notes,
                created_at: now,
            })
            .await?;

        info!(
            "Appointment {} booked for patient {} with doctor {} on {}",
            appointment.id, appointment.patient_id, appointment.doctor_id, appointment.date
        );
        Ok(appointment)
    }

    pub async fn update_appointment(
        &self,
        id: AppointmentId,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        let current = self.get_appointment(id).await?;
        self.reject_active_clinical_work(&current, "modified")?;

        let date = request.date.unwrap_or(current.date);
        let start_time = match request.start_time.as_deref() {
            Some(raw) => validation::time_of_day(raw)?,
            None => current.start_time,
        };
        let end_time = match request.end_time.as_deref() {
            Some(raw) => validation::time_of_day(raw)?,
            None => current.end_time,
        };
        validation::time_range(start_time, end_time)?;

        let slot_moved = date != current.date
            || start_time != current.start_time
            || end_time != current.end_time;
        if slot_moved {
            self.validate_booking_date(date)?;
            if current.status.is_occupying() {
                self.check_conflicts(current.doctor_id, date, start_time, end_time, Some(id))
                    .await?;
            }
        }

        let patch = AppointmentPatch {
            date: request.date,
            start_time: request.start_time.is_some().then_some(start_time),
            end_time: request.end_time.is_some().then_some(end_time),
            reason: request.reason,
            notes: request.notes,
            modified_at: Some(self.clock.now()),
            ..AppointmentPatch::default()
        };

        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found(format!("appointment {id}")))
    }

    pub async fn delete_appointment(&self, id: AppointmentId) -> Result<(), AppError> {
        let current = self.get_appointment(id).await?;
        self.reject_active_clinical_work(&current, "deleted")?;

        if !self.store.delete(id).await? {
            return Err(AppError::not_found(format!("appointment {id}")));
        }
        info!("Appointment {} deleted", id);
        Ok(())
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("appointment {id}")))
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<Appointment>, AppError> {
        validation::positive_id(doctor_id, "doctor_id")?;
        self.store.list_for_doctor(doctor_id).await
    }

    pub async fn list_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Appointment>, AppError> {
        validation::positive_id(patient_id, "patient_id")?;
        self.store.list_for_patient(patient_id).await
    }

    pub async fn list_for_doctor_on_date(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppError> {
        validation::positive_id(doctor_id, "doctor_id")?;
        self.store.list_for_doctor_on_date(doctor_id, date).await
    }

    // ==========================================================================
    // PRIVATE HELPERS
    // ==========================================================================

    fn validate_booking_date(&self, date: NaiveDate) -> Result<(), AppError> {
        let today = self.clock.today();
        if date < today {
            return Err(AppError::validation(format!(
                "appointment date {date} is in the past (today is {today})"
            )));
        }
        if date > today + Duration::days(self.rules.max_advance_days) {
            return Err(AppError::validation(format!(
                "appointment date {date} is more than {} days ahead",
                self.rules.max_advance_days
            )));
        }
        Ok(())
    }

    /// Work that has started or finished cannot be rewritten or removed.
    fn reject_active_clinical_work(
        &self,
        appointment: &Appointment,
        action: &str,
    ) -> Result<(), AppError> {
        if matches!(
            appointment.status,
            AppointmentStatus::InProgress | AppointmentStatus::Completed
        ) {
            warn!(
                "Appointment {} cannot be {} in status {}",
                appointment.id, action, appointment.status
            );
            return Err(AppError::validation(format!(
                "appointment {} cannot be {} in status {}",
                appointment.id, action, appointment.status
            )));
        }
        Ok(())
    }

    /// Double-booking guard: any occupying appointment for the same doctor
    /// and date whose half-open range intersects the requested one rejects
    /// the write.
    async fn check_conflicts(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        exclude_id: Option<AppointmentId>,
    ) -> Result<(), AppError> {
        let existing = self.store.list_for_doctor_on_date(doctor_id, date).await?;

        for other in existing {
            if exclude_id == Some(other.id) || !other.status.is_occupying() {
                continue;
            }
            if overlaps(start_time, end_time, other.start_time, other.end_time) {
                warn!(
                    "Booking conflict for doctor {} on {}: appointment {}",
                    doctor_id, date, other.id
                );
                return Err(AppError::conflict(format!(
                    "time range overlaps appointment {} ({} - {})",
                    other.id, other.start_time, other.end_time
                )));
            }
        }
        Ok(())
    }
}
