//! Authentication middleware
//!
//! Extractors that resolve the `Authorization: Bearer` token to a user
//! identity. Handlers never see credentials, only the resolved user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{verify_token, AuthService};
use crate::error::ApiError;

/// Authenticated user extracted from a JWT access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub jti: String,
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}

/// Extractor for authenticated users
///
/// Verifies the Bearer token, checks the token type, and confirms the
/// session has not been revoked.
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| unauthorized("Authorization header with Bearer token required"))?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        let claims = verify_token(bearer.token(), auth_service.jwt_secret()).map_err(|e| {
            if e.to_string().contains("expired") {
                unauthorized("Token has expired")
            } else {
                unauthorized("Invalid token")
            }
        })?;

        if claims.token_type != "access" {
            return Err(unauthorized("Expected access token"));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| unauthorized("Invalid user ID in token"))?;

        // Reject tokens whose session was revoked by logout
        auth_service
            .verify_session(&claims.jti)
            .await
            .map_err(|_| unauthorized("Session has been revoked"))?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            jti: claims.jti,
        })
    }
}

/// Optional authenticated user extractor
///
/// Attempts to authenticate but doesn't fail if no token is present.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthenticatedUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(_) => Ok(OptionalUser(None)),
        }
    }
}
