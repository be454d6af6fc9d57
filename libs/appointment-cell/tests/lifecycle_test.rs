// libs/appointment-cell/tests/lifecycle_test.rs
//
// Status transition rules: scheduled -> confirmed -> in_progress -> completed,
// with cancellation and no-show branches off the two pre-visit states.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;

use appointment_cell::services::{AppointmentBookingService, AppointmentLifecycleService};
use appointment_cell::store::InMemoryAppointmentStore;
use appointment_cell::{
    Appointment, AppointmentStatus, BookAppointmentRequest, CancelAppointmentRequest, CancelledBy,
};
use shared_models::AppError;
use shared_utils::test_utils::{FixedClock, StaticRegistry};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Setup {
    booking: AppointmentBookingService,
    lifecycle: AppointmentLifecycleService,
}

impl Setup {
    fn new() -> Self {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let registry = Arc::new(StaticRegistry::new(&[1], &[10]));
        let clock = Arc::new(FixedClock::on_date(date(2025, 6, 1)));

        Self {
            booking: AppointmentBookingService::new(store.clone(), registry, clock.clone()),
            lifecycle: AppointmentLifecycleService::new(store, clock),
        }
    }

    /// Books a fresh scheduled appointment in its own hour.
    async fn booked(&self, hour: u32) -> Appointment {
        self.booking
            .book_appointment(BookAppointmentRequest {
                patient_id: 10,
                doctor_id: 1,
                date: date(2025, 6, 4),
                start_time: format!("{hour:02}:00"),
                end_time: format!("{hour:02}:30"),
                status: None,
                reason: None,
                notes: None,
            })
            .await
            .unwrap()
    }
}

fn cancel_request() -> CancelAppointmentRequest {
    CancelAppointmentRequest {
        reason: "schedule change".into(),
        cancelled_by: CancelledBy::Patient,
    }
}

#[tokio::test]
async fn happy_path_runs_scheduled_through_completed() {
    let setup = Setup::new();
    let appointment = setup.booked(8).await;

    let confirmed = setup.lifecycle.confirm(appointment.id).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let started = setup.lifecycle.start(appointment.id).await.unwrap();
    assert_eq!(started.status, AppointmentStatus::InProgress);

    let completed = setup
        .lifecycle
        .complete(appointment.id, Some("follow-up in two weeks".into()))
        .await
        .unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);
    assert_eq!(completed.notes.as_deref(), Some("follow-up in two weeks"));
}

#[tokio::test]
async fn steps_cannot_be_skipped() {
    let setup = Setup::new();
    let appointment = setup.booked(8).await;

    // scheduled -> in_progress and scheduled -> completed are both illegal.
    assert_matches!(
        setup.lifecycle.start(appointment.id).await,
        Err(AppError::InvalidTransition { from, to })
            if from == "scheduled" && to == "in_progress"
    );
    assert_matches!(
        setup.lifecycle.complete(appointment.id, None).await,
        Err(AppError::InvalidTransition { from, to })
            if from == "scheduled" && to == "completed"
    );
}

#[tokio::test]
async fn cancellation_is_allowed_before_the_visit_starts() {
    let setup = Setup::new();

    let scheduled = setup.booked(8).await;
    let cancelled = setup
        .lifecycle
        .cancel(scheduled.id, cancel_request())
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancelled_by, Some(CancelledBy::Patient));
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("schedule change"));

    let confirmed = setup.booked(9).await;
    setup.lifecycle.confirm(confirmed.id).await.unwrap();
    setup.lifecycle.cancel(confirmed.id, cancel_request()).await.unwrap();
}

#[tokio::test]
async fn in_progress_visits_cannot_be_cancelled() {
    let setup = Setup::new();
    let appointment = setup.booked(8).await;
    setup.lifecycle.confirm(appointment.id).await.unwrap();
    setup.lifecycle.start(appointment.id).await.unwrap();

    assert_matches!(
        setup.lifecycle.cancel(appointment.id, cancel_request()).await,
        Err(AppError::InvalidTransition { from, to })
            if from == "in_progress" && to == "cancelled"
    );
}

#[tokio::test]
async fn cancellation_requires_a_reason() {
    let setup = Setup::new();
    let appointment = setup.booked(8).await;

    let result = setup
        .lifecycle
        .cancel(
            appointment.id,
            CancelAppointmentRequest {
                reason: "  ".into(),
                cancelled_by: CancelledBy::System,
            },
        )
        .await;
    assert_matches!(result, Err(AppError::Validation(_)));
}

#[tokio::test]
async fn no_show_branches_off_either_pre_visit_state() {
    let setup = Setup::new();

    let scheduled = setup.booked(8).await;
    let marked = setup.lifecycle.mark_no_show(scheduled.id).await.unwrap();
    assert_eq!(marked.status, AppointmentStatus::NoShow);

    let confirmed = setup.booked(9).await;
    setup.lifecycle.confirm(confirmed.id).await.unwrap();
    setup.lifecycle.mark_no_show(confirmed.id).await.unwrap();
}

#[tokio::test]
async fn terminal_states_admit_no_further_transitions() {
    let setup = Setup::new();

    let completed = setup.booked(8).await;
    setup.lifecycle.confirm(completed.id).await.unwrap();
    setup.lifecycle.start(completed.id).await.unwrap();
    setup.lifecycle.complete(completed.id, None).await.unwrap();

    assert_matches!(
        setup.lifecycle.confirm(completed.id).await,
        Err(AppError::InvalidTransition { .. })
    );
    assert_matches!(
        setup.lifecycle.cancel(completed.id, cancel_request()).await,
        Err(AppError::InvalidTransition { .. })
    );

    let cancelled = setup.booked(9).await;
    setup.lifecycle.cancel(cancelled.id, cancel_request()).await.unwrap();
    assert_matches!(
        setup.lifecycle.cancel(cancelled.id, cancel_request()).await,
        Err(AppError::InvalidTransition { .. })
    );
    assert_matches!(
        setup.lifecycle.mark_no_show(cancelled.id).await,
        Err(AppError::InvalidTransition { .. })
    );
}

#[tokio::test]
async fn unknown_appointment_is_not_found() {
    let setup = Setup::new();
    assert_matches!(
        setup.lifecycle.confirm(404).await,
        Err(AppError::NotFound(_))
    );
}

#[test]
fn transition_table_matches_the_state_machine() {
    use AppointmentStatus::*;

    assert_eq!(
        AppointmentLifecycleService::valid_transitions(Scheduled),
        &[Confirmed, Cancelled, NoShow]
    );
    assert_eq!(
        AppointmentLifecycleService::valid_transitions(Confirmed),
        &[InProgress, Cancelled, NoShow]
    );
    assert_eq!(
        AppointmentLifecycleService::valid_transitions(InProgress),
        &[Completed]
    );
    assert!(AppointmentLifecycleService::valid_transitions(Completed).is_empty());
    assert!(AppointmentLifecycleService::valid_transitions(Cancelled).is_empty());
    assert!(AppointmentLifecycleService::valid_transitions(NoShow).is_empty());
}
