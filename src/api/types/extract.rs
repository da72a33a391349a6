//! Query-string and path extractors whose rejections use the API error body

use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    FromRequestParts, Path as AxumPath, Query as AxumQuery,
};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::error;

use super::error::ApiError;

/// Wrapper around `axum::extract::Query`; undecodable query strings become `400`
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AxumQuery::<T>::from_request_parts(parts, state)
            .await
            .map(|AxumQuery(value)| Query(value))
            .map_err(|rejection| match rejection {
                QueryRejection::FailedToDeserializeQueryString(err) => {
                    ApiError::bad_request(format!("Invalid query string: {}", err.body_text()))
                }
                _ => ApiError::bad_request("Invalid query string"),
            })
    }
}

/// Wrapper around `axum::extract::Path`
///
/// Segments that do not decode are the caller's fault (`400`); a route wired
/// without the expected parameters is ours (`500`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AxumPath::<T>::from_request_parts(parts, state)
            .await
            .map(|AxumPath(value)| Path(value))
            .map_err(|rejection| match rejection {
                PathRejection::FailedToDeserializePathParams(err) => {
                    ApiError::bad_request(format!("Invalid path parameter: {}", err.body_text()))
                        .with_param("id")
                }
                other => {
                    error!(error = %other.body_text(), "Path parameters unavailable");
                    ApiError::internal()
                }
            })
    }
}
