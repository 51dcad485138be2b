use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::{Result, SupabaseClient};

use crate::models::{Clinic, Doctor};

/// Read access to doctor and clinic records.
pub struct DoctorService {
    supabase: Arc<SupabaseClient>,
}

impl DoctorService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid, auth_token: Option<&str>) -> Result<Option<Doctor>> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}&limit=1", doctor_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, auth_token, None).await?;

        first_row(result)
    }

    pub async fn get_clinic(&self, clinic_id: Uuid, auth_token: Option<&str>) -> Result<Option<Clinic>> {
        debug!("Fetching clinic: {}", clinic_id);

        let path = format!("/rest/v1/doctor_clinics?id=eq.{}&limit=1", clinic_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, auth_token, None).await?;

        first_row(result)
    }

    /// The clinic a new booking is attached to: the doctor's earliest listed clinic.
    pub async fn first_clinic(&self, doctor_id: Uuid, auth_token: Option<&str>) -> Result<Option<Clinic>> {
        let path = format!(
            "/rest/v1/doctor_clinics?doctor_id=eq.{}&order=created_at.asc,id.asc&limit=1",
            doctor_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, auth_token, None).await?;

        first_row(result)
    }
}

fn first_row<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>> {
    match rows.into_iter().next() {
        Some(row) => Ok(Some(serde_json::from_value(row)?)),
        None => Ok(None),
    }
}
