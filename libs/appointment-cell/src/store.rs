// libs/appointment-cell/src/store.rs
use async_trait::async_trait;
use chrono::NaiveDate;

use schedule_cell::store::AppointmentLookup;
use schedule_cell::BookedRange;
use shared_database::MemoryTable;
use shared_models::{AppError, AppointmentId, DoctorId, PatientId};

use crate::models::{Appointment, AppointmentPatch, NewAppointment};

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, AppError>;

    async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>, AppError>;

    async fn list_for_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Appointment>, AppError>;

    async fn list_for_patient(&self, patient_id: PatientId) -> Result<Vec<Appointment>, AppError>;

    async fn list_for_doctor_on_date(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppError>;

    async fn list_in_date_range(
        &self,
        doctor_id: DoctorId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, AppError>;

    async fn update(
        &self,
        id: AppointmentId,
        patch: AppointmentPatch,
    ) -> Result<Option<Appointment>, AppError>;

    async fn delete(&self, id: AppointmentId) -> Result<bool, AppError>;

    async fn list_all(&self) -> Result<Vec<Appointment>, AppError>;
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    table: MemoryTable<Appointment>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, AppError> {
        Ok(self
            .table
            .insert_with(|id| Appointment {
                id,
                patient_id: appointment.patient_id,
                doctor_id: appointment.doctor_id,
                date: appointment.date,
                start_time: appointment.start_time,
                end_time: appointment.end_time,
                status: appointment.status,
                reason: appointment.reason,
                notes: appointment.notes,
                created_at: appointment.created_at,
                modified_at: appointment.created_at,
                cancelled_by: None,
                cancellation_reason: None,
            })
            .await)
    }

    async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>, AppError> {
        Ok(self.table.get(id).await)
    }

    async fn list_for_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Appointment>, AppError> {
        let mut appointments = self.table.filter(|a| a.doctor_id == doctor_id).await;
        appointments.sort_by_key(|a| (a.date, a.start_time));
        Ok(appointments)
    }

    async fn list_for_patient(&self, patient_id: PatientId) -> Result<Vec<Appointment>, AppError> {
        let mut appointments = self.table.filter(|a| a.patient_id == patient_id).await;
        appointments.sort_by_key(|a| (a.date, a.start_time));
        Ok(appointments)
    }

    async fn list_for_doctor_on_date(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppError> {
        let mut appointments = self
            .table
            .filter(|a| a.doctor_id == doctor_id && a.date == date)
            .await;
        appointments.sort_by_key(|a| a.start_time);
        Ok(appointments)
    }

    async fn list_in_date_range(
        &self,
        doctor_id: DoctorId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, AppError> {
        let mut appointments = self
            .table
            .filter(|a| a.doctor_id == doctor_id && a.date >= from && a.date <= to)
            .await;
        appointments.sort_by_key(|a| (a.date, a.start_time));
        Ok(appointments)
    }

    async fn update(
        &self,
        id: AppointmentId,
        patch: AppointmentPatch,
    ) -> Result<Option<Appointment>, AppError> {
        Ok(self
            .table
            .update(id, |appointment| {
                if let Some(date) = patch.date {
                    appointment.date = date;
                }
                if let Some(start_time) = patch.start_time {
                    appointment.start_time = start_time;
                }
                if let Some(end_time) = patch.end_time {
                    appointment.end_time = end_time;
                }
                if let Some(status) = patch.status {
                    appointment.status = status;
                }
                if let Some(reason) = patch.reason.clone() {
                    appointment.reason = Some(reason);
                }
                if let Some(notes) = patch.notes.clone() {
                    appointment.notes = Some(notes);
                }
                if let Some(cancelled_by) = patch.cancelled_by {
                    appointment.cancelled_by = Some(cancelled_by);
                }
                if let Some(cancellation_reason) = patch.cancellation_reason.clone() {
                    appointment.cancellation_reason = Some(cancellation_reason);
                }
                if let Some(modified_at) = patch.modified_at {
                    appointment.modified_at = modified_at;
                }
            })
            .await)
    }

    async fn delete(&self, id: AppointmentId) -> Result<bool, AppError> {
        Ok(self.table.remove(id).await.is_some())
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppError> {
        Ok(self.table.all().await)
    }
}

/// The availability resolver reads committed bookings through this seam;
/// only occupying statuses are handed across.
#[async_trait]
impl AppointmentLookup for InMemoryAppointmentStore {
    async fn booked_ranges(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<BookedRange>, AppError> {
        let mut ranges: Vec<BookedRange> = self
            .table
            .filter(|a| a.doctor_id == doctor_id && a.date == date && a.status.is_occupying())
            .await
            .into_iter()
            .map(|a| BookedRange {
                start_time: a.start_time,
                end_time: a.end_time,
            })
            .collect();
        ranges.sort_by_key(|r| r.start_time);
        Ok(ranges)
    }
}
