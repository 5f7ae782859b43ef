//! Axum middleware adapter.
//!
//! Wire it with `axum::middleware::from_fn_with_state` and serve the router
//! with `into_make_service_with_connect_info::<SocketAddr>()` so the client
//! socket address is available as a fallback source identity.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::engine::types::{BlockContext, Fingerprint, NormalizedRequest};
use crate::engine::Engine;

/// Caller-supplied override invoked on every block. Returning `None` falls
/// back to the default empty 403.
pub type BlockHook = Arc<dyn Fn(&BlockContext) -> Option<Response> + Send + Sync>;

/// State for [`admission_middleware`].
#[derive(Clone)]
pub struct AdmissionState {
    engine: Arc<Engine>,
    on_block: Option<BlockHook>,
}

impl AdmissionState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            on_block: None,
        }
    }

    /// Attach a block hook.
    pub fn with_block_hook(mut self, hook: BlockHook) -> Self {
        self.on_block = Some(hook);
        self
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

/// Middleware function for request admission.
pub async fn admission_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AdmissionState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let normalized = normalize_request(Some(addr), &request);
    let decision = state.engine.evaluate(&normalized);

    if decision.is_block() {
        // The hook sees the same fingerprint shape the engine reported.
        let ctx = BlockContext {
            fingerprint: Fingerprint::capture(&normalized),
            decision,
        };
        if let Some(hook) = &state.on_block {
            if let Some(response) = hook(&ctx) {
                return response;
            }
        }
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::FORBIDDEN;
        return response;
    }

    next.run(request).await
}

/// Build a [`NormalizedRequest`] from an axum request.
///
/// Header names are kept in received order; duplicate values are joined
/// with ", ". The client IP prefers the first `x-forwarded-for` hop over
/// the socket address.
pub fn normalize_request(
    remote_addr: Option<SocketAddr>,
    request: &Request<Body>,
) -> NormalizedRequest {
    let (headers, header_names) = flatten_headers(request.headers());

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty());
    let ip = forwarded
        .or_else(|| remote_addr.map(|a| a.ip().to_string()))
        .unwrap_or_else(|| "0.0.0.0".to_string());

    NormalizedRequest {
        ip,
        user_agent: headers.get("user-agent").cloned().unwrap_or_default(),
        headers,
        header_names,
        path: request.uri().path().to_string(),
        method: request.method().as_str().to_string(),
    }
}

fn flatten_headers(map: &HeaderMap) -> (HashMap<String, String>, Vec<String>) {
    let mut headers: HashMap<String, String> = HashMap::new();
    // http normalizes header names to lowercase already.
    let mut names: Vec<String> = Vec::new();

    for (name, value) in map.iter() {
        let name = name.as_str();
        let value = value.to_str().unwrap_or_default();
        match headers.get_mut(name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                headers.insert(name.to_string(), value.to_string());
                names.push(name.to_string());
            }
        }
    }

    (headers, names)
}
