use doctor_cell::models::TimeRange;
use uuid::Uuid;

use crate::models::Appointment;

/// First existing appointment whose interval overlaps the candidate.
///
/// Callers pass the appointments of a single doctor on a single date.
pub fn find_conflict<'a>(candidate: &TimeRange, existing: &'a [Appointment]) -> Option<&'a Appointment> {
    existing.iter().find(|appointment| appointment.time_range().overlaps(candidate))
}

/// Whether the patient already holds an appointment among `existing`.
pub fn has_daily_booking(patient_id: Uuid, existing: &[Appointment]) -> bool {
    existing.iter().any(|appointment| appointment.patient_id == patient_id)
}
