use std::collections::BTreeSet;
use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{
    AvailabilityError, AvailabilityRule, CreateAvailabilityRequest, TimeRange, Weekday,
};
use crate::services::doctor::DoctorService;

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
    doctor_service: DoctorService,
}

impl AvailabilityService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            doctor_service: DoctorService::new(Arc::clone(&supabase)),
            supabase,
        }
    }

    /// Create one weekly availability rule per requested day at the given clinic.
    pub async fn create_availability(
        &self,
        doctor_id: Uuid,
        clinic_id: Uuid,
        request: CreateAvailabilityRequest,
        auth_token: Option<&str>,
    ) -> Result<Vec<AvailabilityRule>, AvailabilityError> {
        debug!("Creating availability for doctor {} at clinic {}", doctor_id, clinic_id);

        let window = TimeRange::new(request.start_time, request.end_time);
        if !window.is_valid() {
            return Err(AvailabilityError::ValidationError(
                "Start time must be before end time".to_string(),
            ));
        }

        let days: BTreeSet<Weekday> = request.days_of_week.into_iter().collect();
        if days.is_empty() {
            return Err(AvailabilityError::ValidationError(
                "At least one day of week is required".to_string(),
            ));
        }

        if self.doctor_service.get_doctor(doctor_id, auth_token).await?.is_none() {
            return Err(AvailabilityError::DoctorNotFound(doctor_id));
        }

        let clinic = self.doctor_service
            .get_clinic(clinic_id, auth_token)
            .await?
            .ok_or(AvailabilityError::ClinicNotFound(clinic_id))?;

        if clinic.doctor_id != doctor_id {
            return Err(AvailabilityError::ClinicNotOwned { clinic_id, doctor_id });
        }

        self.check_availability_conflicts(doctor_id, &days, window, auth_token).await?;

        let rows: Vec<Value> = days.iter()
            .map(|day| json!({
                "doctor_id": doctor_id,
                "clinic_id": clinic_id,
                "day_of_week": day,
                "start_time": window.start.format("%H:%M:%S").to_string(),
                "end_time": window.end.format("%H:%M:%S").to_string(),
                "is_available": true
            }))
            .collect();

        let created: Vec<AvailabilityRule> = self.supabase
            .insert("doctor_availability", Value::Array(rows), auth_token)
            .await?;

        if created.len() != days.len() {
            return Err(AvailabilityError::DatabaseError(format!(
                "Expected {} availability rows, store returned {}",
                days.len(),
                created.len()
            )));
        }

        info!("Created {} availability rules for doctor {}", created.len(), doctor_id);
        Ok(created)
    }

    /// All weekly rules of a doctor, ordered by weekday then start time.
    pub async fn get_doctor_availability(
        &self,
        doctor_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<AvailabilityRule>, AvailabilityError> {
        debug!("Fetching availability for doctor: {}", doctor_id);

        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&order=day_of_week.asc,start_time.asc",
            doctor_id
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, auth_token, None).await?;

        let mut rules: Vec<AvailabilityRule> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AvailabilityError::DatabaseError(format!("Failed to parse availability: {}", e)))?;

        rules.sort_by_key(|rule| (rule.day_of_week, rule.start_time));
        Ok(rules)
    }

    async fn check_availability_conflicts(
        &self,
        doctor_id: Uuid,
        days: &BTreeSet<Weekday>,
        window: TimeRange,
        auth_token: Option<&str>,
    ) -> Result<(), AvailabilityError> {
        let day_list = days.iter().map(Weekday::as_str).collect::<Vec<_>>().join(",");
        let path = format!(
            "/rest/v1/doctor_availability?doctor_id=eq.{}&day_of_week=in.({})",
            doctor_id, day_list
        );

        let existing: Vec<AvailabilityRule> = self.supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        if let Some(clash) = existing.iter()
            .find(|rule| days.contains(&rule.day_of_week) && rule.window().overlaps(&window))
        {
            warn!("Availability for doctor {} clashes with rule {}", doctor_id, clash.id);
            return Err(AvailabilityError::Overlap {
                day: clash.day_of_week,
                start: clash.start_time,
                end: clash.end_time,
            });
        }

        Ok(())
    }
}
