// libs/appointment-cell/tests/booking_test.rs
//
// Creation contract and the authoritative double-booking guard.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;

use appointment_cell::services::{AppointmentBookingService, AppointmentLifecycleService};
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore};
use appointment_cell::{
    AppointmentStatus, BookAppointmentRequest, CancelAppointmentRequest, CancelledBy,
    UpdateAppointmentRequest,
};
use schedule_cell::store::AppointmentLookup;
use shared_models::{AppError, DoctorId, PatientId};
use shared_utils::test_utils::{FixedClock, StaticRegistry};

const DOCTOR: DoctorId = 1;
const PATIENT: PatientId = 10;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2025, 6, 1)
}

struct Setup {
    store: Arc<InMemoryAppointmentStore>,
    booking: AppointmentBookingService,
    lifecycle: AppointmentLifecycleService,
}

impl Setup {
    fn new() -> Self {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let registry = Arc::new(StaticRegistry::new(&[DOCTOR], &[PATIENT]));
        let clock = Arc::new(FixedClock::on_date(today()));

        Self {
            booking: AppointmentBookingService::new(store.clone(), registry, clock.clone()),
            lifecycle: AppointmentLifecycleService::new(store.clone(), clock),
            store,
        }
    }
}

fn request(on: NaiveDate, start: &str, end: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id: PATIENT,
        doctor_id: DOCTOR,
        date: on,
        start_time: start.into(),
        end_time: end.into(),
        status: None,
        reason: None,
        notes: None,
    }
}

#[tokio::test]
async fn booking_defaults_to_scheduled() {
    let setup = Setup::new();
    let appointment = setup
        .booking
        .book_appointment(request(date(2025, 6, 4), "09:00", "09:30"))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.created_at, appointment.modified_at);
    assert!(appointment.id > 0);
}

#[tokio::test]
async fn overlapping_booking_is_rejected_and_touching_is_not() {
    let setup = Setup::new();
    let day = date(2025, 6, 4);
    setup.booking.book_appointment(request(day, "09:00", "09:30")).await.unwrap();

    assert_matches!(
        setup.booking.book_appointment(request(day, "09:15", "09:45")).await,
        Err(AppError::Conflict(_))
    );
    // Back-to-back is legal: half-open ranges.
    setup.booking.book_appointment(request(day, "09:30", "10:00")).await.unwrap();
}

#[tokio::test]
async fn cancelled_appointment_never_blocks_rebooking() {
    let setup = Setup::new();
    let day = date(2025, 6, 4);
    let appointment = setup
        .booking
        .book_appointment(request(day, "09:00", "09:30"))
        .await
        .unwrap();

    setup
        .lifecycle
        .cancel(
            appointment.id,
            CancelAppointmentRequest {
                reason: "patient request".into(),
                cancelled_by: CancelledBy::Patient,
            },
        )
        .await
        .unwrap();

    // The identical slot books again.
    setup.booking.book_appointment(request(day, "09:00", "09:30")).await.unwrap();
}

#[tokio::test]
async fn no_show_does_not_block_rebooking() {
    let setup = Setup::new();
    let day = date(2025, 6, 4);
    let appointment = setup
        .booking
        .book_appointment(request(day, "09:00", "09:30"))
        .await
        .unwrap();
    setup.lifecycle.mark_no_show(appointment.id).await.unwrap();

    setup.booking.book_appointment(request(day, "09:00", "09:30")).await.unwrap();
}

#[tokio::test]
async fn past_dates_are_rejected() {
    let setup = Setup::new();
    assert_matches!(
        setup.booking.book_appointment(request(date(2025, 5, 31), "09:00", "09:30")).await,
        Err(AppError::Validation(_))
    );
    // Same-day booking is allowed.
    setup.booking.book_appointment(request(today(), "09:00", "09:30")).await.unwrap();
}

#[tokio::test]
async fn bookings_beyond_the_advance_horizon_are_rejected() {
    let setup = Setup::new();
    // Default horizon is 90 days.
    assert_matches!(
        setup.booking.book_appointment(request(date(2025, 9, 1), "09:00", "09:30")).await,
        Err(AppError::Validation(_))
    );
    setup.booking.book_appointment(request(date(2025, 8, 29), "09:00", "09:30")).await.unwrap();
}

#[tokio::test]
async fn unknown_patient_or_doctor_is_not_found() {
    let setup = Setup::new();

    let mut missing_patient = request(date(2025, 6, 4), "09:00", "09:30");
    missing_patient.patient_id = 77;
    assert_matches!(
        setup.booking.book_appointment(missing_patient).await,
        Err(AppError::NotFound(_))
    );

    let mut missing_doctor = request(date(2025, 6, 4), "09:00", "09:30");
    missing_doctor.doctor_id = 77;
    assert_matches!(
        setup.booking.book_appointment(missing_doctor).await,
        Err(AppError::NotFound(_))
    );
}

#[tokio::test]
async fn malformed_fields_are_rejected() {
    let setup = Setup::new();
    let day = date(2025, 6, 4);

    assert_matches!(
        setup.booking.book_appointment(request(day, "9am", "10:00")).await,
        Err(AppError::Format(_))
    );
    assert_matches!(
        setup.booking.book_appointment(request(day, "10:00", "09:00")).await,
        Err(AppError::Validation(_))
    );
    assert_matches!(
        setup.booking.book_appointment(request(day, "10:00", "10:00")).await,
        Err(AppError::Validation(_))
    );

    let mut bad_status = request(day, "09:00", "09:30");
    bad_status.status = Some("booked".into());
    assert_matches!(
        setup.booking.book_appointment(bad_status).await,
        Err(AppError::Validation(_))
    );

    let mut bad_id = request(day, "09:00", "09:30");
    bad_id.patient_id = 0;
    assert_matches!(
        setup.booking.book_appointment(bad_id).await,
        Err(AppError::Validation(_))
    );
}

#[tokio::test]
async fn updates_reapply_the_conflict_guard_excluding_self() {
    let setup = Setup::new();
    let day = date(2025, 6, 4);
    setup.booking.book_appointment(request(day, "09:00", "09:30")).await.unwrap();
    let second = setup
        .booking
        .book_appointment(request(day, "10:00", "10:30"))
        .await
        .unwrap();

    // Moving onto the first appointment is rejected.
    let result = setup
        .booking
        .update_appointment(
            second.id,
            UpdateAppointmentRequest {
                start_time: Some("09:15".into()),
                end_time: Some("09:45".into()),
                ..UpdateAppointmentRequest::default()
            },
        )
        .await;
    assert_matches!(result, Err(AppError::Conflict(_)));

    // Stretching within free space is fine; self-overlap does not count.
    let updated = setup
        .booking
        .update_appointment(
            second.id,
            UpdateAppointmentRequest {
                end_time: Some("11:00".into()),
                ..UpdateAppointmentRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        updated.end_time,
        shared_utils::validation::time_of_day("11:00").unwrap()
    );
}

#[tokio::test]
async fn active_clinical_work_cannot_be_modified_or_deleted() {
    let setup = Setup::new();
    let appointment = setup
        .booking
        .book_appointment(request(date(2025, 6, 4), "09:00", "09:30"))
        .await
        .unwrap();
    setup.lifecycle.confirm(appointment.id).await.unwrap();
    setup.lifecycle.start(appointment.id).await.unwrap();

    let update = setup
        .booking
        .update_appointment(
            appointment.id,
            UpdateAppointmentRequest {
                notes: Some("late".into()),
                ..UpdateAppointmentRequest::default()
            },
        )
        .await;
    assert_matches!(update, Err(AppError::Validation(_)));
    assert_matches!(
        setup.booking.delete_appointment(appointment.id).await,
        Err(AppError::Validation(_))
    );

    setup.lifecycle.complete(appointment.id, None).await.unwrap();
    assert_matches!(
        setup.booking.delete_appointment(appointment.id).await,
        Err(AppError::Validation(_))
    );
}

#[tokio::test]
async fn scheduled_appointments_can_be_deleted() {
    let setup = Setup::new();
    let appointment = setup
        .booking
        .book_appointment(request(date(2025, 6, 4), "09:00", "09:30"))
        .await
        .unwrap();

    setup.booking.delete_appointment(appointment.id).await.unwrap();
    assert_matches!(
        setup.booking.get_appointment(appointment.id).await,
        Err(AppError::NotFound(_))
    );
    assert_matches!(
        setup.booking.delete_appointment(appointment.id).await,
        Err(AppError::NotFound(_))
    );
}

#[tokio::test]
async fn date_range_listing_is_inclusive_and_ordered() {
    let setup = Setup::new();
    setup.booking.book_appointment(request(date(2025, 6, 4), "09:00", "09:30")).await.unwrap();
    setup.booking.book_appointment(request(date(2025, 6, 6), "10:00", "10:30")).await.unwrap();
    setup.booking.book_appointment(request(date(2025, 6, 6), "08:00", "08:30")).await.unwrap();
    setup.booking.book_appointment(request(date(2025, 6, 9), "09:00", "09:30")).await.unwrap();

    let week = setup
        .store
        .list_in_date_range(DOCTOR, date(2025, 6, 4), date(2025, 6, 6))
        .await
        .unwrap();
    assert_eq!(week.len(), 3);
    // Ordered by date, then start time.
    assert_eq!(week[0].date, date(2025, 6, 4));
    assert_eq!(week[1].start_time, shared_utils::validation::time_of_day("08:00").unwrap());
    assert_eq!(week[2].start_time, shared_utils::validation::time_of_day("10:00").unwrap());

    let single_day = setup
        .store
        .list_in_date_range(DOCTOR, date(2025, 6, 9), date(2025, 6, 9))
        .await
        .unwrap();
    assert_eq!(single_day.len(), 1);
}

#[tokio::test]
async fn booked_ranges_expose_only_occupying_appointments() {
    let setup = Setup::new();
    let day = date(2025, 6, 4);
    let first = setup
        .booking
        .book_appointment(request(day, "09:00", "09:30"))
        .await
        .unwrap();
    setup.booking.book_appointment(request(day, "11:00", "11:30")).await.unwrap();

    setup
        .lifecycle
        .cancel(
            first.id,
            CancelAppointmentRequest {
                reason: "conflict".into(),
                cancelled_by: CancelledBy::Doctor,
            },
        )
        .await
        .unwrap();

    let ranges = setup.store.booked_ranges(DOCTOR, day).await.unwrap();
    assert_eq!(ranges.len(), 1);
    assert_eq!(
        ranges[0].start_time,
        shared_utils::validation::time_of_day("11:00").unwrap()
    );
}
