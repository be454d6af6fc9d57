// libs/schedule-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::{DoctorId, ScheduleEntryId, WindowId};

// ==============================================================================
// WEEKLY (RECURRING) SCHEDULE
// ==============================================================================

/// Recurring availability: the doctor is bookable every week on
/// `day_of_week` between `start_time` and `end_time` (half-open), optionally
/// limited to the `valid_from..=valid_to` calendar range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyScheduleEntry {
    pub id: ScheduleEntryId,
    pub doctor_id: DoctorId,
    /// ISO-8601 weekday: 1 = Monday .. 7 = Sunday.
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub state: ScheduleState,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl WeeklyScheduleEntry {
    /// Whether the recurring pattern applies on the given calendar date.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if self.valid_from.is_some_and(|from| date < from) {
            return false;
        }
        if self.valid_to.is_some_and(|to| date > to) {
            return false;
        }
        true
    }

    /// Validity range with open ends widened to the calendar extremes,
    /// for intersecting two entries' applicable periods.
    pub fn validity_bounds(&self) -> (NaiveDate, NaiveDate) {
        (
            self.valid_from.unwrap_or(NaiveDate::MIN),
            self.valid_to.unwrap_or(NaiveDate::MAX),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    Active,
    Inactive,
}

impl fmt::Display for ScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleState::Active => write!(f, "active"),
            ScheduleState::Inactive => write!(f, "inactive"),
        }
    }
}

impl FromStr for ScheduleState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ScheduleState::Active),
            "inactive" => Ok(ScheduleState::Inactive),
            _ => Err(()),
        }
    }
}

// ==============================================================================
// DETAILED (ONE-OFF) SCHEDULE
// ==============================================================================

/// One-off availability layered on top of the weekly pattern for a single
/// calendar date: an extra shift, emergency coverage, and so on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedScheduleEntry {
    pub id: ScheduleEntryId,
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub kind: DetailedScheduleKind,
    pub state: DetailedScheduleState,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailedScheduleKind {
    Shift,
    Extra,
    Emergency,
    Other,
}

impl fmt::Display for DetailedScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailedScheduleKind::Shift => write!(f, "shift"),
            DetailedScheduleKind::Extra => write!(f, "extra"),
            DetailedScheduleKind::Emergency => write!(f, "emergency"),
            DetailedScheduleKind::Other => write!(f, "other"),
        }
    }
}

impl FromStr for DetailedScheduleKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shift" => Ok(DetailedScheduleKind::Shift),
            "extra" => Ok(DetailedScheduleKind::Extra),
            "emergency" => Ok(DetailedScheduleKind::Emergency),
            "other" => Ok(DetailedScheduleKind::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailedScheduleState {
    Active,
    Inactive,
    Cancelled,
}

impl fmt::Display for DetailedScheduleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailedScheduleState::Active => write!(f, "active"),
            DetailedScheduleState::Inactive => write!(f, "inactive"),
            DetailedScheduleState::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for DetailedScheduleState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DetailedScheduleState::Active),
            "inactive" => Ok(DetailedScheduleState::Inactive),
            "cancelled" => Ok(DetailedScheduleState::Cancelled),
            _ => Err(()),
        }
    }
}

// ==============================================================================
// TEMPORARY UNAVAILABILITY
// ==============================================================================

/// Date-range block (vacation, leave, training). Every date inside
/// `[start_date, end_date]` is fully blocked regardless of schedule entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailabilityWindow {
    pub id: WindowId,
    pub doctor_id: DoctorId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: UnavailabilityKind,
    pub reason: Option<String>,
    pub state: ScheduleState,
    pub created_at: DateTime<Utc>,
}

impl UnavailabilityWindow {
    pub fn blocks(&self, date: NaiveDate) -> bool {
        self.state == ScheduleState::Active
            && shared_utils::interval::range_contains_date(self.start_date, self.end_date, date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailabilityKind {
    Vacation,
    Leave,
    Training,
    Other,
}

impl fmt::Display for UnavailabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailabilityKind::Vacation => write!(f, "vacation"),
            UnavailabilityKind::Leave => write!(f, "leave"),
            UnavailabilityKind::Training => write!(f, "training"),
            UnavailabilityKind::Other => write!(f, "other"),
        }
    }
}

impl FromStr for UnavailabilityKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vacation" => Ok(UnavailabilityKind::Vacation),
            "leave" => Ok(UnavailabilityKind::Leave),
            "training" => Ok(UnavailabilityKind::Training),
            "other" => Ok(UnavailabilityKind::Other),
            _ => Err(()),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================
// Time-of-day values cross the boundary as "HH:MM[:SS]" strings and are
// parsed by the shared validators; dates cross as calendar dates.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWeeklyScheduleRequest {
    pub doctor_id: DoctorId,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWeeklyScheduleRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub state: Option<String>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDetailedScheduleRequest {
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub kind: String,
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDetailedScheduleRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUnavailabilityRequest {
    pub doctor_id: DoctorId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUnavailabilityRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub state: Option<String>,
    pub reason: Option<String>,
}

// ==============================================================================
// STORE ROW BUILDERS AND PATCHES
// ==============================================================================
// Validated values handed to the stores; the store assigns the id.

#[derive(Debug, Clone)]
pub struct NewWeeklyScheduleEntry {
    pub doctor_id: DoctorId,
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub state: ScheduleState,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct WeeklySchedulePatch {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub state: Option<ScheduleState>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewDetailedScheduleEntry {
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub kind: DetailedScheduleKind,
    pub state: DetailedScheduleState,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct DetailedSchedulePatch {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub state: Option<DetailedScheduleState>,
}

#[derive(Debug, Clone)]
pub struct NewUnavailabilityWindow {
    pub doctor_id: DoctorId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: UnavailabilityKind,
    pub reason: Option<String>,
    pub state: ScheduleState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UnavailabilityPatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub state: Option<ScheduleState>,
    pub reason: Option<String>,
}

// ==============================================================================
// AVAILABILITY READ MODELS
// ==============================================================================

/// One bookable window on a given date, flagged occupied when any committed
/// appointment overlaps it. Whole-slot occupancy: the slot is not carved
/// into sub-ranges around the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
}

/// Committed appointment range handed across the appointment-store seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedRange {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
