//! The shield middleware: one gate evaluation per inbound request.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use login_shield_core::{
    AttemptRepository, BlockingGate, GateRequest, RouteResolver, UnavailablePolicy, Verdict,
};

use crate::{error::ShieldError, session::Session};

pub struct ShieldState<R: AttemptRepository, P: RouteResolver> {
    pub gate: Arc<BlockingGate<R, P>>,
}

impl<R: AttemptRepository, P: RouteResolver> ShieldState<R, P> {
    pub fn new(gate: Arc<BlockingGate<R, P>>) -> Self {
        Self { gate }
    }
}

impl<R: AttemptRepository, P: RouteResolver> Clone for ShieldState<R, P> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
        }
    }
}

/// Route identifier for the request: the matched path pattern when the
/// router provides one, the raw URI path otherwise.
pub(crate) fn route_of(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Client source IP: the first `x-forwarded-for` entry when present,
/// falling back to the socket address.
pub(crate) fn client_ip(request: &Request) -> Option<String> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// Evaluate the blocking gate for this request and map the verdict onto
/// the response pipeline: pass through, short-circuit with a redirect, or
/// short-circuit with a flood-control error.
///
/// Expects the session layer to run before it. Requests without a session
/// extension pass through with a warning.
pub async fn shield_middleware<R, P>(
    State(state): State<ShieldState<R, P>>,
    request: Request,
    next: Next,
) -> Response
where
    R: AttemptRepository,
    P: RouteResolver,
{
    let Some(session) = request.extensions().get::<Session>().cloned() else {
        tracing::warn!("shield middleware running without a session layer");
        return next.run(request).await;
    };

    let route = route_of(&request);
    let ip = client_ip(&request);

    let verdict = state
        .gate
        .evaluate(&GateRequest {
            route: Some(route.as_str()),
            ip_address: ip.as_deref(),
            session: &session,
        })
        .await;

    match verdict {
        Ok(Verdict::Allow) => next.run(request).await,
        Ok(Verdict::RedirectToRecovery { location }) => {
            Redirect::temporary(&location).into_response()
        }
        Ok(Verdict::HardBlock) => ShieldError::FloodBlocked.into_response(),
        Err(e) => match state.gate.config().unavailable_policy {
            UnavailablePolicy::FailOpen => {
                tracing::warn!(error = %e, route, "attempt tracker unavailable, failing open");
                next.run(request).await
            }
            UnavailablePolicy::FailClosed => {
                tracing::error!(error = %e, route, "attempt tracker unavailable, failing closed");
                ShieldError::TrackerUnavailable(e.to_string()).into_response()
            }
        },
    }
}
