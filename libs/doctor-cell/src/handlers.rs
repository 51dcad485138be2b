use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::CreateAvailabilityRequest;
use crate::services::AvailabilityService;

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<AppConfig>>,
    Path((doctor_id, clinic_id)): Path<(Uuid, Uuid)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, &["doctor", "admin"])?;

    let availability_service = AvailabilityService::new(Arc::new(SupabaseClient::new(&state)));

    let created = availability_service
        .create_availability(doctor_id, clinic_id, request, Some(auth.token()))
        .await?;

    Ok((StatusCode::CREATED, Json(json!({
        "availability": created,
        "total": created.len()
    }))))
}

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(Arc::new(SupabaseClient::new(&state)));

    let rules = availability_service
        .get_doctor_availability(doctor_id, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "availability": rules,
        "doctor_id": doctor_id,
        "total": rules.len()
    })))
}
