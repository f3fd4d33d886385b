//! Request-security pipeline: every inbound request is fingerprinted, then
//! passed through the rate limiter(s); mutating requests additionally go
//! through the honeypot gate. Ordering matters: the context middleware must
//! be outermost so the limiters and handlers can read the fingerprint from
//! request extensions.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, TryRngCore};
use serde_json::{json, Value};
use vaultgate_core::{
    events::{SecurityEvent, SecurityEventLog, SecurityEventType, Severity},
    ClientInfo, Fingerprint, HoneypotDetector, RateLimiter,
};

use crate::error::ApiError;

/// Largest body the honeypot gate will buffer.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared request-security components, constructed once at startup.
pub struct SecurityState {
    pub general_limiter: RateLimiter,
    pub auth_limiter: RateLimiter,
    pub honeypot: HoneypotDetector,
    pub events: Arc<SecurityEventLog>,
}

/// Per-request client identity, attached as a request extension by
/// [`security_context`].
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub fingerprint: Fingerprint,
    pub ip: String,
    pub user_agent: Option<String>,
    pub request_id: String,
}

impl ClientContext {
    pub fn meta(&self) -> vaultgate_core::services::ClientMeta {
        vaultgate_core::services::ClientMeta {
            ip: Some(self.ip.clone()),
            user_agent: self.user_agent.clone(),
            request_id: Some(self.request_id.clone()),
        }
    }
}

/// Derive the client fingerprint and request ID, and attach them to the
/// request. Must be the outermost security layer.
pub async fn security_context(mut request: Request, next: Next) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let info = ClientInfo {
        ip: ip.clone(),
        user_agent: header_string(&request, header::USER_AGENT),
        accept_language: header_string(&request, header::ACCEPT_LANGUAGE),
        accept_encoding: header_string(&request, header::ACCEPT_ENCODING),
        connection: header_string(&request, header::CONNECTION),
    };

    let context = ClientContext {
        fingerprint: Fingerprint::derive(&info),
        ip,
        user_agent: if info.user_agent.is_empty() {
            None
        } else {
            Some(info.user_agent.clone())
        },
        request_id: generate_request_id(),
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// General-pool rate limit: 100 requests per 15 minutes per fingerprint.
pub async fn general_rate_limit(
    State(security): State<Arc<SecurityState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&security, &security.general_limiter, &request)?;
    Ok(next.run(request).await)
}

/// Auth-pool rate limit: 20 requests per minute per fingerprint, layered on
/// authentication routes in addition to the general pool.
pub async fn auth_rate_limit(
    State(security): State<Arc<SecurityState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&security, &security.auth_limiter, &request)?;
    Ok(next.run(request).await)
}

/// Honeypot gate for mutating requests.
///
/// Buffers and inspects JSON bodies; when a decoy field is filled the
/// request is answered with a successful-looking 200 so automated clients
/// cannot learn they were detected. Non-JSON and unparsable bodies pass
/// through untouched.
pub async fn honeypot_gate(
    State(security): State<Arc<SecurityState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !matches!(
        *request.method(),
        Method::POST | Method::PUT | Method::PATCH
    ) {
        return Ok(next.run(request).await);
    }

    let context = request.extensions().get::<ClientContext>().cloned();
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| ApiError::PayloadTooLarge)?;

    if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
        if security.honeypot.triggered(&value) {
            let mut event =
                SecurityEvent::new(SecurityEventType::HoneypotTriggered, Severity::High)
                    .detail("path", parts.uri.path());
            if let Some(context) = &context {
                event = event
                    .actor_ip(&context.ip)
                    .request_id(&context.request_id);
                if let Some(user_agent) = &context.user_agent {
                    event = event.user_agent(user_agent);
                }
            }
            security.events.log(event);
            tracing::warn!(path = parts.uri.path(), "honeypot field filled, deceiving client");

            // Deliberate deception: respond as if the operation succeeded.
            return Ok((StatusCode::OK, Json(json!({ "success": true }))).into_response());
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

fn enforce(
    security: &SecurityState,
    limiter: &RateLimiter,
    request: &Request,
) -> Result<(), ApiError> {
    let Some(context) = request.extensions().get::<ClientContext>() else {
        // Context middleware missing is a wiring bug, not a client error.
        return Err(ApiError::Internal(
            "client context missing from request".to_string(),
        ));
    };

    let decision = limiter.check(&context.fingerprint);
    if let Some(retry_after_seconds) = decision.retry_after_seconds() {
        let mut event =
            SecurityEvent::new(SecurityEventType::RateLimitExceeded, Severity::Medium)
                .actor_ip(&context.ip)
                .request_id(&context.request_id)
                .detail("retry_after", retry_after_seconds.to_string());
        if let Some(user_agent) = &context.user_agent {
            event = event.user_agent(user_agent);
        }
        security.events.log(event);

        return Err(ApiError::RateLimited {
            retry_after_seconds,
        });
    }
    Ok(())
}

fn header_string(request: &Request, name: header::HeaderName) -> String {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn generate_request_id() -> String {
    let mut bytes = [0u8; 12];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");
    format!("req_{}", BASE64_URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_shape() {
        let id = generate_request_id();
        assert!(id.starts_with("req_"));
        assert_ne!(id, generate_request_id());
    }
}
