//! Referer capture: remember the last non-ignored page a client visited
//! so a successful login can bounce them back to it.

use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use login_shield_core::session::{REFERER_KEY, SessionHandle};
use serde_json::Value;

use crate::{middleware::route_of, session::Session};

#[derive(Debug, Clone, Default)]
pub struct RefererConfig {
    /// Routes never remembered as a return target (login, logout,
    /// registration and the like).
    pub ignored_routes: HashSet<String>,
}

impl RefererConfig {
    pub fn new(ignored_routes: impl IntoIterator<Item = String>) -> Self {
        Self {
            ignored_routes: ignored_routes.into_iter().collect(),
        }
    }
}

/// Store the request path in the session unless the route is ignored or
/// internal (leading underscore segment).
pub async fn referer_middleware(
    State(config): State<RefererConfig>,
    request: Request,
    next: Next,
) -> Response {
    let route = route_of(&request);
    let internal = route.trim_start_matches('/').starts_with('_');

    if !internal && !config.ignored_routes.contains(&route) {
        if let Some(session) = request.extensions().get::<Session>() {
            session.set(
                REFERER_KEY,
                Value::String(request.uri().path().to_string()),
            );
        }
    }

    next.run(request).await
}
