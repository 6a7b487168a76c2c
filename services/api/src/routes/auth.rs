//! Authentication routes: register, login, logout, profile

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::{ApiError, ValidationErrors},
    middleware::AuthUser,
    models::{LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest, UserResponse},
    repositories::{is_unique_violation, user::verify_password},
    validation::{normalize_email, validate_profile_update, validate_registration},
};

fn email_conflict() -> ApiError {
    ApiError::Conflict("The email has already been taken.".to_string())
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    validate_registration(&payload).into_result()?;

    let email = normalize_email(&payload.email);
    let taken = state
        .user_repository
        .email_taken(&email, None)
        .await
        .map_err(|e| {
            error!("Failed to check email availability: {}", e);
            ApiError::InternalServerError
        })?;
    if taken {
        return Err(email_conflict());
    }

    let user = state
        .user_repository
        .create(payload.name.trim(), &email, &payload.password)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return email_conflict();
            }
            error!("Failed to create user: {}", e);
            ApiError::InternalServerError
        })?;

    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "user": UserResponse::from(user),
        })),
    ))
}

/// Exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&payload.email);
    info!("Login attempt for user: {}", email);

    let mut errors = ValidationErrors::new();
    if email.is_empty() {
        errors.add("email", "The email field is required.");
    }
    if payload.password.is_empty() {
        errors.add("password", "The password field is required.");
    }
    errors.into_result()?;

    if let Err(remaining) = state.rate_limiter.check(&email).await {
        warn!("Login throttled for {}", email);
        return Err(ApiError::TooManyRequests {
            retry_after: remaining.as_secs().max(1),
        });
    }

    let user = state
        .user_repository
        .find_by_email(&email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?;

    let user = match user {
        Some(user) if verify_password(&user.password_hash, &payload.password).unwrap_or(false) => {
            user
        }
        _ => {
            if let Some(lockout) = state.rate_limiter.record_failure(&email).await {
                return Err(ApiError::TooManyRequests {
                    retry_after: lockout.as_secs().max(1),
                });
            }
            return Err(ApiError::Unauthorized);
        }
    };
    state.rate_limiter.reset(&email).await;

    let issued = state.token_service.issue(user.id).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        ApiError::InternalServerError
    })?;

    state
        .session_repository
        .create(user.id, &issued.token_hash, issued.expires_at)
        .await
        .map_err(|e| {
            error!("Failed to store session: {}", e);
            ApiError::InternalServerError
        })?;

    let response = LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        user: UserResponse::from(user),
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_service.token_expiry(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Revoke the bearer token the request was made with
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Logout request for user {}", user.id);

    state
        .session_repository
        .revoke(&user.token_hash)
        .await
        .map_err(|e| {
            error!("Failed to revoke session: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((
        StatusCode::OK,
        Json(json!({"success": true, "message": "Logged out successfully"})),
    ))
}

/// Current user profile
pub async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_id(user.id)
        .await
        .map_err(|e| {
            error!("Failed to get user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(json!({
        "success": true,
        "user": UserResponse::from(user),
    })))
}

/// Update name, email and optionally the password
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    validate_profile_update(&payload).into_result()?;

    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to get user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    if payload.new_password.is_some() {
        let current = payload.password.as_deref().unwrap_or_default();
        let matches = verify_password(&user.password_hash, current).map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::InternalServerError
        })?;
        if !matches {
            return Err(ApiError::Validation(ValidationErrors::single(
                "password",
                "The current password is incorrect.",
            )));
        }
    }

    let email = normalize_email(&payload.email);
    let taken = state
        .user_repository
        .email_taken(&email, Some(user.id))
        .await
        .map_err(|e| {
            error!("Failed to check email availability: {}", e);
            ApiError::InternalServerError
        })?;
    if taken {
        return Err(email_conflict());
    }

    let updated = state
        .user_repository
        .update(
            user.id,
            payload.name.trim(),
            &email,
            payload.new_password.as_deref(),
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return email_conflict();
            }
            error!("Failed to update user: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": UserResponse::from(updated),
    })))
}
