// libs/schedule-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use shared_models::{AppError, DoctorId};
use shared_utils::interval::overlaps;
use shared_utils::validation;

use crate::models::{AvailabilitySlot, DetailedScheduleState, ScheduleState};
use crate::store::{
    AppointmentLookup, DetailedScheduleStore, UnavailabilityStore, WeeklyScheduleStore,
};

/// Read-side composition of the four stores into the bookable slots for a
/// (doctor, date) pair. Owns no state and is recomputed on every call; the
/// result is a snapshot, not a lease — the booking-path conflict guard
/// closes the race with concurrent writes.
pub struct AvailabilityService {
    weekly: Arc<dyn WeeklyScheduleStore>,
    detailed: Arc<dyn DetailedScheduleStore>,
    unavailability: Arc<dyn UnavailabilityStore>,
    appointments: Arc<dyn AppointmentLookup>,
}

impl AvailabilityService {
    pub fn new(
        weekly: Arc<dyn WeeklyScheduleStore>,
        detailed: Arc<dyn DetailedScheduleStore>,
        unavailability: Arc<dyn UnavailabilityStore>,
        appointments: Arc<dyn AppointmentLookup>,
    ) -> Self {
        Self {
            weekly,
            detailed,
            unavailability,
            appointments,
        }
    }

    pub async fn get_availability(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, AppError> {
        validation::positive_id(doctor_id, "doctor_id")?;
        debug!("Resolving availability for doctor {} on {}", doctor_id, date);

        // Calendar convention: ISO-8601 weekday on the stored calendar date,
        // 1 = Monday .. 7 = Sunday. No time zone enters the derivation.
        let day_of_week = date.weekday().number_from_monday() as u8;

        // An active unavailability window blocks the whole day before any
        // candidate is considered.
        let windows = self
            .unavailability
            .list_in_range(doctor_id, date, date)
            .await?;
        if windows.iter().any(|w| w.blocks(date)) {
            debug!("Doctor {} is unavailable on {}", doctor_id, date);
            return Ok(vec![]);
        }

        // Candidates: recurring entries valid on this date, unioned with the
        // one-off entries for the date itself.
        let mut candidates: Vec<(chrono::NaiveTime, chrono::NaiveTime)> = Vec::new();

        for entry in self
            .weekly
            .list_for_doctor_on_day(doctor_id, day_of_week)
            .await?
        {
            if entry.state == ScheduleState::Active && entry.applies_on(date) {
                candidates.push((entry.start_time, entry.end_time));
            }
        }

        for entry in self
            .detailed
            .list_for_doctor_on_date(doctor_id, date)
            .await?
        {
            if entry.state == DetailedScheduleState::Active {
                candidates.push((entry.start_time, entry.end_time));
            }
        }

        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let booked = self.appointments.booked_ranges(doctor_id, date).await?;

        let mut slots: Vec<AvailabilitySlot> = candidates
            .into_iter()
            .map(|(start_time, end_time)| {
                let occupied = booked
                    .iter()
                    .any(|b| overlaps(start_time, end_time, b.start_time, b.end_time));
                AvailabilitySlot {
                    start_time,
                    end_time,
                    available: !occupied,
                }
            })
            .collect();

        slots.sort_by_key(|s| (s.start_time, s.end_time));
        slots.dedup_by_key(|s| (s.start_time, s.end_time));

        debug!(
            "Doctor {} has {} candidate slots on {}",
            doctor_id,
            slots.len(),
            date
        );
        Ok(slots)
    }
}
