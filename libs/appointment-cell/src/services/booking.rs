use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, CreateAppointmentRequest,
    NewAppointment, Patient, PaymentStatus,
};
use crate::services::conflict::{find_conflict, has_daily_booking};
use crate::services::locks::SchedulingLocks;
use crate::services::store::SchedulingStore;

pub struct AppointmentBookingService {
    store: Arc<dyn SchedulingStore>,
    locks: Arc<SchedulingLocks>,
}

impl AppointmentBookingService {
    pub fn new(store: Arc<dyn SchedulingStore>, locks: Arc<SchedulingLocks>) -> Self {
        Self { store, locks }
    }

    /// Admit or reject a booking for `doctor_id` made by the patient behind
    /// `user_id`. Nothing is written unless every check passes.
    pub async fn book_appointment(
        &self,
        doctor_id: Uuid,
        user_id: &str,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!("Booking appointment with doctor {} on {} {}-{}",
              doctor_id, request.date, request.start_time, request.end_time);

        request.validate()?;

        let doctor = self.store
            .find_doctor(doctor_id)
            .await?
            .ok_or(AppointmentError::DoctorNotFound(doctor_id))?;

        let patient = self.resolve_patient(user_id).await?;

        let clinic = self.store
            .first_clinic(doctor_id)
            .await?
            .ok_or(AppointmentError::ClinicNotFound(doctor_id))?;

        let candidate = request.time_range();
        let _guard = self.locks.acquire(doctor_id, request.date).await;

        let existing = self.store.doctor_appointments_on(doctor_id, request.date).await?;
        debug!("Doctor {} has {} appointments on {}", doctor_id, existing.len(), request.date);

        if let Some(clash) = find_conflict(&candidate, &existing) {
            warn!("Booking for doctor {} overlaps appointment {} ({}-{})",
                  doctor_id, clash.id, clash.start_time, clash.end_time);
            return Err(AppointmentError::SlotConflict {
                date: request.date,
                start: request.start_time,
                end: request.end_time,
            });
        }

        if has_daily_booking(patient.id, &existing) {
            warn!("Patient {} already booked doctor {} on {}", patient.id, doctor_id, request.date);
            return Err(AppointmentError::DuplicateDailyBooking { date: request.date });
        }

        let appointment = self.store
            .insert_appointment(NewAppointment {
                patient_id: patient.id,
                doctor_id,
                clinic_id: clinic.id,
                date: request.date,
                start_time: request.start_time,
                end_time: request.end_time,
                fees: doctor.current_fee(),
                reason_for_visit: request.reason_for_visit,
                payment_status: PaymentStatus::Pending,
                appointment_status: AppointmentStatus::Scheduled,
            })
            .await?;

        info!("Appointment {} booked for patient {} with doctor {}",
              appointment.id, patient.id, doctor_id);
        Ok(appointment)
    }

    /// All appointments of the patient behind `user_id`, oldest first.
    pub async fn list_patient_appointments(&self, user_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let patient = self.resolve_patient(user_id).await?;

        let appointments = self.store.patient_appointments(patient.id).await?;
        if appointments.is_empty() {
            return Err(AppointmentError::NoAppointments);
        }

        Ok(appointments)
    }

    async fn resolve_patient(&self, user_id: &str) -> Result<Patient, AppointmentError> {
        let not_found = || AppointmentError::PatientNotFound(user_id.to_string());

        let user_uuid = Uuid::parse_str(user_id).map_err(|_| not_found())?;

        self.store
            .find_patient_by_user(user_uuid)
            .await?
            .ok_or_else(not_found)
    }
}
