use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{Appointment, CreateAppointmentRequest};
use crate::services::{AppointmentBookingService, SlotService, SlotSettings};
use crate::state::SchedulingState;

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<SchedulingState>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &["patient"])?;

    let slot_service = SlotService::new(state.store.clone(), SlotSettings::from_config(&state.config));

    let slots = slot_service
        .available_slots(doctor_id, state.config.clinic_now())
        .await?;

    Ok(Json(json!({
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<SchedulingState>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    require_role(&user, &["patient"])?;
    request.validate()?;

    let booking_service = AppointmentBookingService::new(state.store.clone(), state.locks.clone());

    let appointment = booking_service
        .book_appointment(doctor_id, &user.id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<SchedulingState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &["patient"])?;

    let booking_service = AppointmentBookingService::new(state.store.clone(), state.locks.clone());

    let appointments = booking_service.list_patient_appointments(&user.id).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
