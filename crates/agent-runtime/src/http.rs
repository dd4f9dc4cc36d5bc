//! Shared HTTP plumbing for the provider bindings

use agent_core::{AgentError, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

/// Longest response body excerpt carried in an error
const BODY_EXCERPT_LEN: usize = 500;

/// Send a prepared request and decode the JSON body, mapping failures onto
/// [`AgentError`] variants.
pub(crate) async fn send_json(provider: &str, request: RequestBuilder) -> Result<Value> {
    let response = request.send().await.map_err(|e| {
        tracing::debug!(provider, error = %e, "Request failed before a response");
        AgentError::ProviderUnavailable(format!("{provider}: {e}"))
    })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AgentError::ProviderUnavailable(format!("{provider}: {e}")))?;

    if !status.is_success() {
        tracing::debug!(provider, %status, "Provider returned an error status");
        return Err(status_error(provider, status, &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| AgentError::Parse(format!("{provider} returned invalid JSON: {e}")))
}

/// Map a non-success status onto an error variant
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> AgentError {
    let detail = format!("{provider} returned {status}: {}", excerpt(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
        s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
        _ => AgentError::Provider(detail),
    }
}

/// Prefer the provider's own error message when the body carries one
fn excerpt(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let text = message.unwrap_or_else(|| body.trim().to_string());
    match text.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text,
    }
}

/// Trim a trailing slash so paths can be appended with `format!`
pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
