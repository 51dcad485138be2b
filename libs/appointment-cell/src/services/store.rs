use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::models::{AvailabilityRule, Clinic, Doctor};
use doctor_cell::services::{AvailabilityService, DoctorService};
use shared_config::AppConfig;
use shared_database::{SupabaseClient, SupabaseError};

use crate::models::{Appointment, AppointmentError, NewAppointment, Patient};

/// Name of the unique index enforcing one booking per patient, doctor and day.
pub const DAILY_BOOKING_CONSTRAINT: &str = "appointments_patient_doctor_date_key";

/// Persistence seam consumed by the slot generator and the booking validator.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, AppointmentError>;

    /// Clinic a booking is attached to: the doctor's first clinic in listing order.
    async fn first_clinic(&self, doctor_id: Uuid) -> Result<Option<Clinic>, AppointmentError>;

    async fn find_patient_by_user(&self, user_id: Uuid) -> Result<Option<Patient>, AppointmentError>;

    async fn availability_rules(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityRule>, AppointmentError>;

    /// Appointments of a doctor with `from <= date <= to`.
    async fn doctor_appointments_between(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError>;

    async fn doctor_appointments_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.doctor_appointments_between(doctor_id, date, date).await
    }

    async fn patient_appointments(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError>;

    /// Persist a validated booking. Constraint violations surface as conflicts.
    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError>;
}

/// `SchedulingStore` backed by PostgREST, authenticated as the service role.
/// Callers are authorized by the HTTP layer before reaching it.
pub struct SupabaseSchedulingStore {
    supabase: Arc<SupabaseClient>,
    doctor_service: DoctorService,
    availability_service: AvailabilityService,
}

impl SupabaseSchedulingStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(SupabaseClient::with_service_role(config)))
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            doctor_service: DoctorService::new(Arc::clone(&supabase)),
            availability_service: AvailabilityService::new(Arc::clone(&supabase)),
            supabase,
        }
    }

    async fn fetch_appointments(&self, path: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None, None).await?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }
}

#[async_trait]
impl SchedulingStore for SupabaseSchedulingStore {
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, AppointmentError> {
        Ok(self.doctor_service.get_doctor(doctor_id, None).await?)
    }

    async fn first_clinic(&self, doctor_id: Uuid) -> Result<Option<Clinic>, AppointmentError> {
        Ok(self.doctor_service.first_clinic(doctor_id, None).await?)
    }

    async fn find_patient_by_user(&self, user_id: Uuid) -> Result<Option<Patient>, AppointmentError> {
        debug!("Resolving patient for user: {}", user_id);

        let path = format!("/rest/v1/patients?user_id=eq.{}&is_deleted=is.false&limit=1", user_id);
        let result: Vec<Patient> = self.supabase.request(Method::GET, &path, None, None).await?;

        Ok(result.into_iter().next())
    }

    async fn availability_rules(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityRule>, AppointmentError> {
        Ok(self.availability_service.get_doctor_availability(doctor_id, None).await?)
    }

    async fn doctor_appointments_between(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=gte.{}&date=lte.{}&order=date.asc,start_time.asc",
            doctor_id, from, to
        );

        self.fetch_appointments(&path).await
    }

    async fn patient_appointments(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=date.asc,start_time.asc",
            patient_id
        );

        self.fetch_appointments(&path).await
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment, AppointmentError> {
        let row = serde_json::to_value(&appointment)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to encode appointment: {}", e)))?;

        let created: Vec<Appointment> = match self.supabase.insert("appointments", row, None).await {
            Ok(created) => created,
            Err(SupabaseError::Conflict(message)) => {
                warn!("Store rejected appointment for doctor {}: {}", appointment.doctor_id, message);

                return Err(if message.contains(DAILY_BOOKING_CONSTRAINT) {
                    AppointmentError::DuplicateDailyBooking { date: appointment.date }
                } else {
                    AppointmentError::SlotConflict {
                        date: appointment.date,
                        start: appointment.start_time,
                        end: appointment.end_time,
                    }
                });
            }
            Err(e) => return Err(e.into()),
        };

        created.into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))
    }
}
