// src/utils/http.rs
//! Small helpers shared by the HTTP capability adapters.

use crate::error::CapabilityError;
use reqwest::{Response, Url};

/// Appends percent-encoded path segments to a base URL.
pub fn endpoint(
    base: &str,
    service: &'static str,
    segments: &[&str],
) -> Result<Url, CapabilityError> {
    let mut url = Url::parse(base)
        .map_err(|e| CapabilityError::decode(service, format!("invalid base URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| CapabilityError::decode(service, format!("base URL {base} cannot hold a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turns non-2xx responses into [`CapabilityError::Status`].
pub async fn ensure_success(
    service: &'static str,
    response: Response,
) -> Result<Response, CapabilityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CapabilityError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}
