//! Host authentication extractor
//!
//! Verifies the bearer JWT from the Authorization header. Guests never
//! authenticate; a verified subject only says who the caller is, and each
//! operation decides whether that subject hosts the event in question.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::response::ApiError;
use crate::state::AppState;

/// Caller with a verified host identity
#[derive(Debug, Clone)]
pub struct HostUser {
    /// Subject of the verified token
    pub host_id: String,
}

impl HostUser {
    /// Create a new HostUser
    pub fn new(host_id: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
        }
    }

    fn verify(state: &AppState, token: &str) -> Result<Self, ApiError> {
        let claims = state.jwt_service().validate_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Invalid host token");
            ApiError::InvalidAuthFormat
        })?;

        let host_id = claims.host_id();
        if host_id.trim().is_empty() {
            tracing::warn!("Host token without subject");
            return Err(ApiError::InvalidAuthFormat);
        }

        Ok(Self::new(host_id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for HostUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        Self::verify(&app_state, bearer.token())
    }
}

/// Caller who may or may not be a host
///
/// Absent header means an anonymous guest. A header that is present but
/// does not verify is rejected rather than silently downgraded.
#[derive(Debug, Clone)]
pub struct OptionalHostUser(pub Option<HostUser>);

impl OptionalHostUser {
    /// Host id to hand to services that decide visibility
    pub fn host_id(&self) -> Option<&str> {
        self.0.as_ref().map(|host| host.host_id.as_str())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalHostUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_result =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await;

        match auth_result {
            Ok(TypedHeader(Authorization(bearer))) => {
                let app_state = AppState::from_ref(state);
                HostUser::verify(&app_state, bearer.token()).map(|host| Self(Some(host)))
            }
            Err(_) => Ok(Self(None)),
        }
    }
}
