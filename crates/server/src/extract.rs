//! Body extractor accepting urlencoded forms and JSON.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::errors::BodyRejection;

/// Decodes the body as JSON when `Content-Type` says so, otherwise as
/// `application/x-www-form-urlencoded`. An empty body decodes to all-absent
/// fields so handlers can report which field is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.trim_start().starts_with("application/json"))
            .unwrap_or(false);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| BodyRejection(e.to_string()))?;

        let value = if is_json {
            let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) { b"{}" } else { &bytes };
            serde_json::from_slice(bytes).map_err(|e| BodyRejection(e.to_string()))?
        } else {
            serde_urlencoded::from_bytes(&bytes).map_err(|e| BodyRejection(e.to_string()))?
        };
        Ok(FormOrJson(value))
    }
}
