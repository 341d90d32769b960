use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{ORIGIN, REFERER, USER_AGENT};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::Serialize;

/// Client metadata recorded alongside a submission under `data.request`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestMeta {
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
    pub origin: Option<String>,
}

impl RequestMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        // First hop of x-forwarded-for is the client.
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| header("x-real-ip"));

        Self {
            user_agent: header(USER_AGENT.as_str()),
            referer: header(REFERER.as_str()),
            ip,
            origin: header(ORIGIN.as_str()),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
