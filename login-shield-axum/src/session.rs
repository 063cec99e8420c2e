//! Cookie-backed session layer.
//!
//! Provides the ephemeral half of the attempt store: an in-memory
//! key-value session identified by a cookie, attached to every request as
//! an extension. Applications that already carry a session can skip this
//! layer and implement [`SessionHandle`] over their own.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use login_shield_core::{SessionHandle, SessionId};
use serde_json::Value;

/// Settings for the session id cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub http_only: bool,
    pub secure: bool,
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "sid".to_string(),
            http_only: true,
            secure: true,
            path: "/".to_string(),
        }
    }
}

impl CookieConfig {
    pub fn development() -> Self {
        Self {
            secure: false,
            ..Self::default()
        }
    }
}

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

struct SessionEntry {
    values: Arc<DashMap<String, Value>>,
    last_seen: Instant,
}

/// In-memory session store shared across requests.
///
/// Sessions idle longer than the configured timeout are swept whenever a
/// session is opened, so cookieless clients minting fresh ids cannot grow
/// the map without bound.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            idle_timeout,
        }
    }

    fn open(&self, id: &str) -> Arc<DashMap<String, Value>> {
        let now = Instant::now();
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);

        let mut entry = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionEntry {
                values: Arc::new(DashMap::new()),
                last_seen: now,
            });
        entry.last_seen = now;
        entry.values.clone()
    }
}

/// The session attached to the current request.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    values: Arc<DashMap<String, Value>>,
}

impl SessionHandle for Session {
    fn id(&self) -> Option<SessionId> {
        Some(self.id.clone())
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|value| value.clone())
    }

    fn set(&self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }
}

#[derive(Clone)]
pub struct SessionLayerState {
    pub store: MemorySessionStore,
    pub cookie: CookieConfig,
}

impl SessionLayerState {
    pub fn new(cookie: CookieConfig) -> Self {
        Self {
            store: MemorySessionStore::new(),
            cookie,
        }
    }
}

/// Attach a session to the request, creating one (and setting the cookie
/// on the response) when the client does not present a session id.
pub async fn session_middleware(
    State(state): State<SessionLayerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(&state.cookie.name)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty());

    let (id, is_new) = match existing {
        Some(id) => (id, false),
        None => (uuid::Uuid::new_v4().to_string(), true),
    };

    let session = Session {
        id: SessionId::new(id.clone()),
        values: state.store.open(&id),
    };
    request.extensions_mut().insert(session);

    let response = next.run(request).await;

    if is_new {
        let mut cookie = Cookie::new(state.cookie.name.clone(), id);
        cookie.set_path(state.cookie.path.clone());
        cookie.set_http_only(state.cookie.http_only);
        cookie.set_secure(state.cookie.secure);
        cookie.set_same_site(SameSite::Lax);
        (jar.add(cookie), response).into_response()
    } else {
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_reopens_same_session() {
        let store = MemorySessionStore::new();
        let first = Session {
            id: SessionId::new("sess-1"),
            values: store.open("sess-1"),
        };
        first.set("referer", json!("/account"));

        let second = Session {
            id: SessionId::new("sess-1"),
            values: store.open("sess-1"),
        };
        assert_eq!(second.get("referer"), Some(json!("/account")));
        assert!(store.open("sess-2").get("referer").is_none());
    }

    #[test]
    fn test_idle_sessions_are_evicted() {
        let store = MemorySessionStore::with_idle_timeout(Duration::from_millis(1));
        store
            .open("sess-1")
            .insert("referer".to_string(), json!("/account"));

        std::thread::sleep(Duration::from_millis(5));

        // Opening any session sweeps the idle one; reopening it yields a
        // fresh, empty map.
        assert!(store.open("sess-2").get("referer").is_none());
        assert!(store.open("sess-1").get("referer").is_none());
    }

    #[test]
    fn test_active_sessions_survive_the_sweep() {
        let store = MemorySessionStore::with_idle_timeout(Duration::from_secs(60));
        store
            .open("sess-1")
            .insert("referer".to_string(), json!("/account"));

        store.open("sess-2");
        assert_eq!(
            store.open("sess-1").get("referer").map(|v| v.clone()),
            Some(json!("/account"))
        );
    }

    #[test]
    fn test_cookie_config_defaults() {
        let config = CookieConfig::default();
        assert_eq!(config.name, "sid");
        assert!(config.secure);
        assert!(!CookieConfig::development().secure);
    }
}
