use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Form, FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;

use crate::models::ContactFields;

/// Sentinel key for requests whose remote address is unavailable. Such
/// requests share one bucket instead of bypassing the limiter.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Stable per-caller identity for rate-limit partitioning, derived from the
/// remote network address. Swapping the strategy (e.g. a trusted proxy
/// header) only means swapping this extractor.
pub struct ClientKey(pub String);

impl<S> FromRequestParts<S> for ClientKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
        Ok(ClientKey(key))
    }
}

/// Contact fields gathered from the query string and, when present, a
/// urlencoded form body. A missing or non-form body just contributes nothing.
pub struct SubmittedFields(pub ContactFields);

impl<S> FromRequest<S> for SubmittedFields
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let query = Query::<ContactFields>::from_request_parts(&mut parts, state)
            .await
            .map(|Query(fields)| fields)
            .unwrap_or_default();

        let req = Request::from_parts(parts, body);
        let form = Form::<ContactFields>::from_request(req, state)
            .await
            .map(|Form(fields)| fields)
            .unwrap_or_default();

        Ok(SubmittedFields(ContactFields::merge(query, form)))
    }
}
