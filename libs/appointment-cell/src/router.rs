use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::SchedulingState;

pub fn appointment_routes(state: SchedulingState) -> Router {
    Router::new()
        .route("/doctors/{doctor_id}/slots", get(handlers::get_available_slots))
        .route("/doctors/{doctor_id}", post(handlers::book_appointment))
        .route("/mine", get(handlers::get_my_appointments))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
