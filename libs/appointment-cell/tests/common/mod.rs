#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    Appointment, AppointmentError, AppointmentStatus, CreateAppointmentRequest,
    NewAppointment, Patient, PaymentStatus,
};
use appointment_cell::services::SchedulingStore;
use doctor_cell::models::{AvailabilityRule, Clinic, Doctor, Weekday};

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_time(time(h, m))
}

pub fn request(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        date,
        start_time: start,
        end_time: end,
        reason_for_visit: Some("Checkup".to_string()),
    }
}

pub fn doctor(fee: Option<f64>) -> Doctor {
    Doctor {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        speciality: "Cardiology".to_string(),
        experience: Some(12),
        consultation_fee: fee,
        bio: None,
        is_verified: true,
    }
}

pub fn clinic(doctor_id: Uuid, created_day: u32) -> Clinic {
    Clinic {
        id: Uuid::new_v4(),
        doctor_id,
        clinic_name: format!("Clinic {}", created_day),
        clinic_phone: None,
        is_primary_location: false,
        created_at: Utc.with_ymd_and_hms(2024, 1, created_day, 8, 0, 0).unwrap(),
    }
}

pub fn patient(user_id: Uuid) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        user_id,
        blood_group: Some("A+".to_string()),
        allergies: None,
        is_deleted: false,
    }
}

pub fn rule(doctor_id: Uuid, clinic_id: Uuid, day: Weekday, start: NaiveTime, end: NaiveTime) -> AvailabilityRule {
    AvailabilityRule {
        id: Uuid::new_v4(),
        doctor_id,
        clinic_id,
        day_of_week: day,
        start_time: start,
        end_time: end,
        is_available: true,
    }
}

pub fn appointment(
    patient_id: Uuid,
    doctor_id: Uuid,
    clinic_id: Uuid,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id,
        clinic_id,
        date,
        start_time: start,
        end_time: end,
        fees: 100.0,
        reason_for_visit: None,
        payment_status: PaymentStatus::Pending,
        appointment_status: AppointmentStatus::Scheduled,
        created_at: None,
    }
}

/// Process-local `SchedulingStore`. Reads can be slowed down to widen the
/// window between the conflict check and the insert.
#[derive(Default)]
pub struct InMemoryStore {
    pub doctors: Mutex<Vec<Doctor>>,
    pub clinics: Mutex<Vec<Clinic>>,
    pub patients: Mutex<Vec<Patient>>,
    pub rules: Mutex<Vec<AvailabilityRule>>,
    pub appointments: Mutex<Vec<Appointment>>,
    pub read_delay: Option<StdDuration>,
}

impl InMemoryStore {
    pub fn with_read_delay(delay: StdDuration) -> Self {
        Self {
            read_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn add_doctor(&self, doctor: Doctor) {
        self.doctors.lock().unwrap().push(doctor);
    }

    pub fn add_clinic(&self, clinic: Clinic) {
        self.clinics.lock().unwrap().push(clinic);
    }

    pub fn add_patient(&self, patient: Patient) {
        self.patients.lock().unwrap().push(patient);
    }

    pub fn add_rule(&self, rule: AvailabilityRule) {
        self.rules.lock().unwrap().push(rule);
    }

    pub fn add_appointment(&self, appointment: Appointment) {
        self.appointments.lock().unwrap().push(appointment);
    }

    pub fn appointment_count(&self) -> usize {
        self.appointments.lock().unwrap().len()
    }

    async fn pause(&self) {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, AppointmentError> {
        Ok(self.doctors.lock().unwrap().iter().find(|d| d.id == doctor_id).cloned())
    }

    async fn first_clinic(&self, doctor_id: Uuid) -> Result<Option<Clinic>, AppointmentError> {
        Ok(self.clinics.lock().unwrap()
            .iter()
            .filter(|c| c.doctor_id == doctor_id)
            .min_by_key(|c| (c.created_at, c.id))
            .cloned())
    }

    async fn find_patient_by_user(&self, user_id: Uuid) -> Result<Option<Patient>, AppointmentError> {
        Ok(self.patients.lock().unwrap()
            .iter()
            .find(|p| p.user_id == user_id && !p.is_deleted)
            .cloned())
    }

    async fn availability_rules(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityRule>, AppointmentError> {
        Ok(self.rules.lock().unwrap().iter().filter(|r| r.doctor_id == doctor_id).cloned().collect())
    }

    async fn doctor_appointments_between(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let found = self.appointments.lock().unwrap()
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.date >= from && a.date <= to)
            .cloned()
            .collect();

        self.pause().await;
        Ok(found)
    }

    async fn patient_appointments(&self, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        let mut found: Vec<Appointment> = self.appointments.lock().unwrap()
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| (a.date, a.start_time));
        Ok(found)
    }

    async fn insert_appointment(&self, new: NewAppointment) -> Result<Appointment, AppointmentError> {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            clinic_id: new.clinic_id,
            date: new.date,
            start_time: new.start_time,
            end_time: new.end_time,
            fees: new.fees,
            reason_for_visit: new.reason_for_visit,
            payment_status: new.payment_status,
            appointment_status: new.appointment_status,
            created_at: Some(Utc::now()),
        };

        self.appointments.lock().unwrap().push(appointment.clone());
        Ok(appointment)
    }
}
