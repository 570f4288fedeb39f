//! Query string extractor
//!
//! Wraps `axum::extract::Query` so malformed parameters use the API error body.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use guestbook_core::MessageFilter;
use serde::{de::DeserializeOwned, Deserialize};

use crate::response::ApiError;

/// Deserialized query string
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(inner) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(QueryParams(inner))
    }
}

/// `?filter=all|approved|pending`, honored for hosts only
#[derive(Debug, Default, Deserialize)]
pub struct MessageListParams {
    #[serde(default)]
    pub filter: MessageFilter,
}

/// `?approved_only=true`
#[derive(Debug, Default, Deserialize)]
pub struct MediaListParams {
    #[serde(default)]
    pub approved_only: bool,
}

/// `?active=true`
#[derive(Debug, Default, Deserialize)]
pub struct TokenListParams {
    #[serde(default)]
    pub active: bool,
}
