//! services/api/src/web/extract.rs
//!
//! JSON body and query-string extractors that reject with `ApiError`, so a
//! malformed request gets the same `{ "error": ... }` 400 as any other
//! validation failure.

use crate::error::ApiError;
use axum::{
    extract::{FromRequest, FromRequestParts, OptionalFromRequest, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use std::future::Future;

/// A JSON request body.
///
/// As `Option<ApiJson<T>>` it yields `None` when the request carries no
/// `Content-Type` at all, which lets header-only callers through.
#[derive(Debug, Clone, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    #[allow(clippy::manual_async_fn)]
    fn from_request(
        req: Request,
        state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
            Ok(ApiJson(value))
        }
    }
}

impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    #[allow(clippy::manual_async_fn)]
    fn from_request(
        req: Request,
        state: &S,
    ) -> impl Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        async move {
            let body = <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
            Ok(body.map(|Json(value)| ApiJson(value)))
        }
    }
}

/// A deserialized query string.
#[derive(Debug, Clone, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let Query(value) =
                <Query<T> as FromRequestParts<S>>::from_request_parts(parts, state).await?;
            Ok(ApiQuery(value))
        }
    }
}
