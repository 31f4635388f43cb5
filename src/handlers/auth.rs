//! Authentication HTTP handlers

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{
    ApiResponse, AuthTokensResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
    UserResponse,
};
use crate::state::AppState;

/// POST /api/auth/register - Create an account and issue tokens
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthTokensResponse>>), ApiError> {
    request.validate()?;

    let (ip_address, user_agent) = client_info(&headers);

    let tokens = state
        .auth_service
        .register(request, ip_address, user_agent)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tokens))))
}

/// POST /api/auth/login - Verify credentials and issue tokens
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthTokensResponse>>, ApiError> {
    let (ip_address, user_agent) = client_info(&headers);

    let tokens = state
        .auth_service
        .login(&request.email, &request.password, ip_address, user_agent)
        .await?;

    Ok(Json(ApiResponse::ok(tokens)))
}

/// POST /api/auth/refresh - Refresh access token using refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<AuthTokensResponse>>, ApiError> {
    let tokens = state
        .auth_service
        .refresh_tokens(&request.refresh_token)
        .await?;

    Ok(Json(ApiResponse::ok(tokens)))
}

/// POST /api/auth/logout - Revoke current session
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<StatusCode, ApiError> {
    state.auth_service.revoke_session(&user.jti).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me - Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.auth_service.get_user_by_id(user.user_id).await?;

    Ok(Json(ApiResponse::ok(user.into())))
}

fn client_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    (ip_address, user_agent)
}
