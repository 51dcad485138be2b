use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

// ==============================================================================
// CORE DOCTOR MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub speciality: String,
    pub experience: Option<i32>,
    pub consultation_fee: Option<f64>,
    pub bio: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl Doctor {
    /// Fee charged for a booking made now. A doctor without a configured fee
    /// books at zero.
    pub fn current_fee(&self) -> f64 {
        self.consultation_fee.unwrap_or_else(|| {
            warn!("Doctor {} has no consultation fee, booking at 0.0", self.id);
            0.0
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_name: String,
    pub clinic_phone: Option<String>,
    #[serde(default)]
    pub is_primary_location: bool,
    pub created_at: DateTime<Utc>,
}

/// Day of the week a recurring availability window applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open time-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Two ranges share at least one instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Recurring weekly window during which a doctor sees patients at a clinic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl AvailabilityRule {
    pub fn window(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub days_of_week: Vec<Weekday>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Doctor not found for doctor id {0}")]
    DoctorNotFound(Uuid),

    #[error("Clinic not found for clinic id {0}")]
    ClinicNotFound(Uuid),

    #[error("Clinic {clinic_id} does not belong to doctor {doctor_id}")]
    ClinicNotOwned { clinic_id: Uuid, doctor_id: Uuid },

    #[error("Availability on {day} overlaps an existing window {start}-{end}")]
    Overlap { day: Weekday, start: NaiveTime, end: NaiveTime },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<shared_database::SupabaseError> for AvailabilityError {
    fn from(e: shared_database::SupabaseError) -> Self {
        AvailabilityError::DatabaseError(e.to_string())
    }
}

impl From<AvailabilityError> for shared_models::error::AppError {
    fn from(e: AvailabilityError) -> Self {
        use shared_models::error::AppError;

        match e {
            AvailabilityError::DoctorNotFound(_) | AvailabilityError::ClinicNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            AvailabilityError::ClinicNotOwned { .. } => AppError::BadRequest(e.to_string()),
            AvailabilityError::Overlap { .. } => AppError::Conflict(e.to_string()),
            AvailabilityError::ValidationError(msg) => AppError::ValidationError(msg),
            AvailabilityError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
