use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Resolves the bearer token into a `User` stored in request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Role gate run by handlers before any domain logic.
pub fn require_role(user: &User, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.iter().any(|role| user.has_role(role)) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "Role '{}' is not allowed to perform this action",
        user.role.as_deref().unwrap_or("anonymous")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{middleware, routing::get, Extension, Router};
    use http::StatusCode;
    use tower::ServiceExt;

    use crate::test_utils::{JwtTestUtils, TestConfig, TestUser};

    fn app(config: Arc<AppConfig>) -> Router {
        Router::new()
            .route("/whoami", get(|Extension(user): Extension<User>| async move { user.id }))
            .layer(middleware::from_fn_with_state(config, auth_middleware))
    }

    #[test]
    fn test_require_role() {
        let patient = TestUser::patient("p@example.com").to_user();

        assert!(require_role(&patient, &["patient"]).is_ok());
        assert_matches!(require_role(&patient, &["doctor", "admin"]), Err(AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_middleware_injects_user() {
        let test_config = TestConfig::default();
        let patient = TestUser::patient("p@example.com");
        let token = JwtTestUtils::create_test_token(&patient, &test_config.jwt_secret, None);

        let response = app(test_config.to_arc())
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, patient.id.as_bytes());
    }

    #[tokio::test]
    async fn test_middleware_rejects_missing_header() {
        let response = app(TestConfig::default().to_arc())
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
