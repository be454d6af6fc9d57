// libs/schedule-cell/src/store.rs
//
// Persistence collaborators for the three schedule stores, plus the seam to
// the appointment store. Services receive these as explicit handles at
// construction; no process-wide state.

use async_trait::async_trait;
use chrono::NaiveDate;

use shared_database::MemoryTable;
use shared_models::{AppError, DoctorId, ScheduleEntryId, WindowId};
use shared_utils::interval::date_ranges_overlap;

use crate::models::{
    DetailedScheduleEntry, DetailedSchedulePatch, NewDetailedScheduleEntry,
    NewUnavailabilityWindow, NewWeeklyScheduleEntry, UnavailabilityPatch,
    UnavailabilityWindow, WeeklySchedulePatch, WeeklyScheduleEntry, BookedRange,
};

// ==============================================================================
// STORE TRAITS
// ==============================================================================

#[async_trait]
pub trait WeeklyScheduleStore: Send + Sync {
    async fn create(&self, entry: NewWeeklyScheduleEntry) -> Result<WeeklyScheduleEntry, AppError>;

    async fn get(&self, id: ScheduleEntryId) -> Result<Option<WeeklyScheduleEntry>, AppError>;

    async fn list_for_doctor(&self, doctor_id: DoctorId)
        -> Result<Vec<WeeklyScheduleEntry>, AppError>;

    async fn list_for_doctor_on_day(
        &self,
        doctor_id: DoctorId,
        day_of_week: u8,
    ) -> Result<Vec<WeeklyScheduleEntry>, AppError>;

    async fn update(
        &self,
        id: ScheduleEntryId,
        patch: WeeklySchedulePatch,
    ) -> Result<Option<WeeklyScheduleEntry>, AppError>;

    async fn delete(&self, id: ScheduleEntryId) -> Result<bool, AppError>;

    async fn list_all(&self) -> Result<Vec<WeeklyScheduleEntry>, AppError>;
}

#[async_trait]
pub trait DetailedScheduleStore: Send + Sync {
    async fn create(
        &self,
        entry: NewDetailedScheduleEntry,
    ) -> Result<DetailedScheduleEntry, AppError>;

    async fn get(&self, id: ScheduleEntryId) -> Result<Option<DetailedScheduleEntry>, AppError>;

    async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<DetailedScheduleEntry>, AppError>;

    async fn list_for_doctor_on_date(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<DetailedScheduleEntry>, AppError>;

    async fn update(
        &self,
        id: ScheduleEntryId,
        patch: DetailedSchedulePatch,
    ) -> Result<Option<DetailedScheduleEntry>, AppError>;

    async fn delete(&self, id: ScheduleEntryId) -> Result<bool, AppError>;

    async fn list_all(&self) -> Result<Vec<DetailedScheduleEntry>, AppError>;
}

#[async_trait]
pub trait UnavailabilityStore: Send + Sync {
    async fn create(
        &self,
        window: NewUnavailabilityWindow,
    ) -> Result<UnavailabilityWindow, AppError>;

    async fn get(&self, id: WindowId) -> Result<Option<UnavailabilityWindow>, AppError>;

    async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<UnavailabilityWindow>, AppError>;

    /// Windows whose inclusive date range intersects `[start, end]`.
    async fn list_in_range(
        &self,
        doctor_id: DoctorId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<UnavailabilityWindow>, AppError>;

    async fn update(
        &self,
        id: WindowId,
        patch: UnavailabilityPatch,
    ) -> Result<Option<UnavailabilityWindow>, AppError>;

    async fn delete(&self, id: WindowId) -> Result<bool, AppError>;

    async fn list_all(&self) -> Result<Vec<UnavailabilityWindow>, AppError>;
}

/// Read-side seam to the appointment store. Implementations return only
/// occupying bookings: cancelled and no-show appointments never hold a slot.
#[async_trait]
pub trait AppointmentLookup: Send + Sync {
    async fn booked_ranges(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<BookedRange>, AppError>;
}

// ==============================================================================
// IN-MEMORY REFERENCE IMPLEMENTATIONS
// ==============================================================================

#[derive(Default)]
pub struct InMemoryWeeklyScheduleStore {
    table: MemoryTable<WeeklyScheduleEntry>,
}

impl InMemoryWeeklyScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WeeklyScheduleStore for InMemoryWeeklyScheduleStore {
    async fn create(&self, entry: NewWeeklyScheduleEntry) -> Result<WeeklyScheduleEntry, AppError> {
        Ok(self
            .table
            .insert_with(|id| WeeklyScheduleEntry {
                id,
                doctor_id: entry.doctor_id,
                day_of_week: entry.day_of_week,
                start_time: entry.start_time,
                end_time: entry.end_time,
                state: entry.state,
                valid_from: entry.valid_from,
                valid_to: entry.valid_to,
                created_at: entry.created_at,
            })
            .await)
    }

    async fn get(&self, id: ScheduleEntryId) -> Result<Option<WeeklyScheduleEntry>, AppError> {
        Ok(self.table.get(id).await)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<WeeklyScheduleEntry>, AppError> {
        let mut entries = self.table.filter(|e| e.doctor_id == doctor_id).await;
        entries.sort_by_key(|e| (e.day_of_week, e.start_time));
        Ok(entries)
    }

    async fn list_for_doctor_on_day(
        &self,
        doctor_id: DoctorId,
        day_of_week: u8,
    ) -> Result<Vec<WeeklyScheduleEntry>, AppError> {
        let mut entries = self
            .table
            .filter(|e| e.doctor_id == doctor_id && e.day_of_week == day_of_week)
            .await;
        entries.sort_by_key(|e| e.start_time);
        Ok(entries)
    }

    async fn update(
        &self,
        id: ScheduleEntryId,
        patch: WeeklySchedulePatch,
    ) -> Result<Option<WeeklyScheduleEntry>, AppError> {
        Ok(self
            .table
            .update(id, |entry| {
                if let Some(start_time) = patch.start_time {
                    entry.start_time = start_time;
                }
                if let Some(end_time) = patch.end_time {
                    entry.end_time = end_time;
                }
                if let Some(state) = patch.state {
                    entry.state = state;
                }
                if let Some(valid_from) = patch.valid_from {
                    entry.valid_from = Some(valid_from);
                }
                if let Some(valid_to) = patch.valid_to {
                    entry.valid_to = Some(valid_to);
                }
            })
            .await)
    }

    async fn delete(&self, id: ScheduleEntryId) -> Result<bool, AppError> {
        Ok(self.table.remove(id).await.is_some())
    }

    async fn list_all(&self) -> Result<Vec<WeeklyScheduleEntry>, AppError> {
        Ok(self.table.all().await)
    }
}

#[derive(Default)]
pub struct InMemoryDetailedScheduleStore {
    table: MemoryTable<DetailedScheduleEntry>,
}

impl InMemoryDetailedScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DetailedScheduleStore for InMemoryDetailedScheduleStore {
    async fn create(
        &self,
        entry: NewDetailedScheduleEntry,
    ) -> Result<DetailedScheduleEntry, AppError> {
        Ok(self
            .table
            .insert_with(|id| DetailedScheduleEntry {
                id,
                doctor_id: entry.doctor_id,
                date: entry.date,
                start_time: entry.start_time,
                end_time: entry.end_time,
                kind: entry.kind,
                state: entry.state,
                created_by: entry.created_by,
                created_at: entry.created_at,
            })
            .await)
    }

    async fn get(&self, id: ScheduleEntryId) -> Result<Option<DetailedScheduleEntry>, AppError> {
        Ok(self.table.get(id).await)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<DetailedScheduleEntry>, AppError> {
        let mut entries = self.table.filter(|e| e.doctor_id == doctor_id).await;
        entries.sort_by_key(|e| (e.date, e.start_time));
        Ok(entries)
    }

    async fn list_for_doctor_on_date(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<DetailedScheduleEntry>, AppError> {
        let mut entries = self
            .table
            .filter(|e| e.doctor_id == doctor_id && e.date == date)
            .await;
        entries.sort_by_key(|e| e.start_time);
        Ok(entries)
    }

    async fn update(
        &self,
        id: ScheduleEntryId,
        patch: DetailedSchedulePatch,
    ) -> Result<Option<DetailedScheduleEntry>, AppError> {
        Ok(self
            .table
            .update(id, |entry| {
                if let Some(start_time) = patch.start_time {
                    entry.start_time = start_time;
                }
                if let Some(end_time) = patch.end_time {
                    entry.end_time = end_time;
                }
                if let Some(state) = patch.state {
                    entry.state = state;
                }
            })
            .await)
    }

    async fn delete(&self, id: ScheduleEntryId) -> Result<bool, AppError> {
        Ok(self.table.remove(id).await.is_some())
    }

    async fn list_all(&self) -> Result<Vec<DetailedScheduleEntry>, AppError> {
        Ok(self.table.all().await)
    }
}

#[derive(Default)]
pub struct InMemoryUnavailabilityStore {
    table: MemoryTable<UnavailabilityWindow>,
}

impl InMemoryUnavailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnavailabilityStore for InMemoryUnavailabilityStore {
    async fn create(
        &self,
        window: NewUnavailabilityWindow,
    ) -> Result<UnavailabilityWindow, AppError> {
        Ok(self
            .table
            .insert_with(|id| UnavailabilityWindow {
                id,
                doctor_id: window.doctor_id,
                start_date: window.start_date,
                end_date: window.end_date,
                kind: window.kind,
                reason: window.reason,
                state: window.state,
                created_at: window.created_at,
            })
            .await)
    }

    async fn get(&self, id: WindowId) -> Result<Option<UnavailabilityWindow>, AppError> {
        Ok(self.table.get(id).await)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<UnavailabilityWindow>, AppError> {
        let mut windows = self.table.filter(|w| w.doctor_id == doctor_id).await;
        windows.sort_by_key(|w| w.start_date);
        Ok(windows)
    }

    async fn list_in_range(
        &self,
        doctor_id: DoctorId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<UnavailabilityWindow>, AppError> {
        let mut windows = self
            .table
            .filter(|w| {
                w.doctor_id == doctor_id
                    && date_ranges_overlap(w.start_date, w.end_date, start, end)
            })
            .await;
        windows.sort_by_key(|w| w.start_date);
        Ok(windows)
    }

    async fn update(
        &self,
        id: WindowId,
        patch: UnavailabilityPatch,
    ) -> Result<Option<UnavailabilityWindow>, AppError> {
        Ok(self
            .table
            .update(id, |window| {
                if let Some(start_date) = patch.start_date {
                    window.start_date = start_date;
                }
                if let Some(end_date) = patch.end_date {
                    window.end_date = end_date;
                }
                if let Some(state) = patch.state {
                    window.state = state;
                }
                if let Some(reason) = patch.reason.clone() {
                    window.reason = Some(reason);
                }
            })
            .await)
    }

    async fn delete(&self, id: WindowId) -> Result<bool, AppError> {
        Ok(self.table.remove(id).await.is_some())
    }

    async fn list_all(&self) -> Result<Vec<UnavailabilityWindow>, AppError> {
        Ok(self.table.all().await)
    }
}
