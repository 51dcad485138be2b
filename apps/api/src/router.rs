use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::SchedulingState;
use doctor_cell::router::doctor_routes;
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>, scheduling: SchedulingState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/appointments", appointment_routes(scheduling))
        .nest("/doctors", doctor_routes(config))
}
