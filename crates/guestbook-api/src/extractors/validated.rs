//! Validated JSON extractor
//!
//! Extracts and validates JSON request bodies using the validator crate.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::response::ApiError;

/// Validated JSON extractor
///
/// The inner type must implement both `Deserialize` and `Validate`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| match e {
                JsonRejection::JsonDataError(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::JsonSyntaxError(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::MissingJsonContentType(e) => ApiError::invalid_body(e.body_text()),
                JsonRejection::BytesRejection(e) => ApiError::invalid_body(e.body_text()),
                _ => ApiError::invalid_body("Invalid JSON body"),
            })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Optional validated JSON extractor
///
/// Returns the type's default for an empty body, so `POST` endpoints whose
/// fields are all optional accept a bare request.
#[derive(Debug, Clone)]
pub struct OptionalValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let has_body = req
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<usize>().ok())
            .is_some_and(|len| len > 0);

        if !has_body {
            return Ok(OptionalValidatedJson(T::default()));
        }

        let ValidatedJson(value) = ValidatedJson::from_request(req, state).await?;
        Ok(OptionalValidatedJson(value))
    }
}
