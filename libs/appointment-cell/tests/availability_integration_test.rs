// libs/appointment-cell/tests/availability_integration_test.rs
//
// End-to-end loop across the two cells: the appointment store feeds the
// availability resolver through the AppointmentLookup seam.

use std::sync::Arc;

use chrono::NaiveDate;

use appointment_cell::services::{AppointmentBookingService, AppointmentLifecycleService};
use appointment_cell::store::InMemoryAppointmentStore;
use appointment_cell::{BookAppointmentRequest, CancelAppointmentRequest, CancelledBy};
use schedule_cell::services::{AvailabilityService, WeeklyScheduleService};
use schedule_cell::store::{
    InMemoryDetailedScheduleStore, InMemoryUnavailabilityStore, InMemoryWeeklyScheduleStore,
};
use schedule_cell::CreateWeeklyScheduleRequest;
use shared_utils::test_utils::{FixedClock, StaticRegistry};
use shared_utils::validation::time_of_day;

const DOCTOR: i64 = 1;
const PATIENT: i64 = 10;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn booked_slot_shows_occupied_until_cancelled() {
    let registry = Arc::new(StaticRegistry::new(&[DOCTOR], &[PATIENT]));
    let clock = Arc::new(FixedClock::on_date(date(2025, 6, 1)));

    let weekly_store = Arc::new(InMemoryWeeklyScheduleStore::new());
    let detailed_store = Arc::new(InMemoryDetailedScheduleStore::new());
    let unavailability_store = Arc::new(InMemoryUnavailabilityStore::new());
    let appointment_store = Arc::new(InMemoryAppointmentStore::new());

    let weekly = WeeklyScheduleService::new(
        weekly_store.clone(),
        registry.clone(),
        clock.clone(),
    );
    let availability = AvailabilityService::new(
        weekly_store,
        detailed_store,
        unavailability_store,
        appointment_store.clone(),
    );
    let booking =
        AppointmentBookingService::new(appointment_store.clone(), registry, clock.clone());
    let lifecycle = AppointmentLifecycleService::new(appointment_store, clock);

    // Wednesday mornings, 09:00-12:00.
    weekly
        .create_entry(CreateWeeklyScheduleRequest {
            doctor_id: DOCTOR,
            day_of_week: 3,
            start_time: "09:00".into(),
            end_time: "12:00".into(),
            valid_from: None,
            valid_to: None,
        })
        .await
        .unwrap();

    let wednesday = date(2025, 6, 4);
    let slots = availability.get_availability(DOCTOR, wednesday).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert!(slots[0].available);

    let appointment = booking
        .book_appointment(BookAppointmentRequest {
            patient_id: PATIENT,
            doctor_id: DOCTOR,
            date: wednesday,
            start_time: "09:00".into(),
            end_time: "09:30".into(),
            status: None,
            reason: Some("check-up".into()),
            notes: None,
        })
        .await
        .unwrap();

    // The working window now reads as occupied.
    let slots = availability.get_availability(DOCTOR, wednesday).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start_time, time_of_day("09:00").unwrap());
    assert_eq!(slots[0].end_time, time_of_day("12:00").unwrap());
    assert!(!slots[0].available);

    // Other days of the pattern are untouched.
    let next_wednesday = date(2025, 6, 11);
    let slots = availability
        .get_availability(DOCTOR, next_wednesday)
        .await
        .unwrap();
    assert!(slots[0].available);

    lifecycle
        .cancel(
            appointment.id,
            CancelAppointmentRequest {
                reason: "patient request".into(),
                cancelled_by: CancelledBy::Patient,
            },
        )
        .await
        .unwrap();

    // Cancellation frees the slot immediately.
    let slots = availability.get_availability(DOCTOR, wednesday).await.unwrap();
    assert!(slots[0].available);
}
