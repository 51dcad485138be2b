use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use doctor_cell::models::{TimeRange, Weekday};
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub fees: f64,
    pub reason_for_visit: Option<String>,
    pub payment_status: PaymentStatus,
    pub appointment_status: AppointmentStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    InProgress,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::InProgress => write!(f, "inprogress"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

/// Row written by the booking validator once every check has passed.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub fees: f64,
    pub reason_for_visit: Option<String>,
    pub payment_status: PaymentStatus,
    pub appointment_status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub blood_group: Option<String>,
    pub allergies: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub reason_for_visit: Option<String>,
}

impl CreateAppointmentRequest {
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn validate(&self) -> Result<(), AppointmentError> {
        if !self.time_range().is_valid() {
            return Err(AppointmentError::ValidationError(format!(
                "End time {} must be after start time {}",
                self.end_time.format("%H:%M"),
                self.start_time.format("%H:%M")
            )));
        }

        Ok(())
    }
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

/// Fixed-duration bookable range, rendered as `HH:MM-HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Open slots of one availability rule on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySlots {
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub date: NaiveDate,
    pub day: Weekday,
    pub time_slot: Vec<TimeSlot>,
}

impl DaySlots {
    pub fn labels(&self) -> Vec<String> {
        self.time_slot.iter().map(ToString::to_string).collect()
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("No doctor found for this doctor id {0}")]
    DoctorNotFound(Uuid),

    #[error("No patient found for this user id {0}")]
    PatientNotFound(String),

    #[error("Doctor {0} has no clinic to attach the appointment to")]
    ClinicNotFound(Uuid),

    #[error("No doctor availability found for this doctor id {0}")]
    NoAvailability(Uuid),

    #[error("No appointments found for this patient")]
    NoAppointments,

    #[error("This time slot overlaps with an existing appointment ({start}-{end} on {date})")]
    SlotConflict { date: NaiveDate, start: NaiveTime, end: NaiveTime },

    #[error("You already have an appointment with this doctor on {date}")]
    DuplicateDailyBooking { date: NaiveDate },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<shared_database::SupabaseError> for AppointmentError {
    fn from(e: shared_database::SupabaseError) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}

impl From<doctor_cell::models::AvailabilityError> for AppointmentError {
    fn from(e: doctor_cell::models::AvailabilityError) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::DoctorNotFound(_)
            | AppointmentError::PatientNotFound(_)
            | AppointmentError::ClinicNotFound(_)
            | AppointmentError::NoAvailability(_)
            | AppointmentError::NoAppointments => AppError::NotFound(e.to_string()),
            AppointmentError::SlotConflict { .. }
            | AppointmentError::DuplicateDailyBooking { .. } => AppError::Conflict(e.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
