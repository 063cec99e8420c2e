//! # login-shield Axum Integration
//!
//! Axum middleware for the login-shield brute force protection system:
//! a cookie-backed session layer, the shield middleware that evaluates the
//! blocking gate once per request, and a referer-capture middleware for
//! post-login redirects.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{Router, middleware::from_fn_with_state, routing::get};
//! use login_shield_core::{BlockingGate, ShieldConfig, StaticRouteResolver};
//! use login_shield_axum::{
//!     CookieConfig, SessionLayerState, ShieldState, session_middleware, shield_middleware,
//! };
//! use login_shield_storage_sqlite::SqliteAttemptRepository;
//!
//! # async fn run(pool: sqlx::SqlitePool) {
//! let repository = Arc::new(SqliteAttemptRepository::new(pool));
//! let resolver = StaticRouteResolver::new().with_route("account_recover", "/recover");
//! let config = ShieldConfig {
//!     guarded_routes: ["/login".to_string()].into_iter().collect(),
//!     login_route: "/login".to_string(),
//!     recover_route: "account_recover".to_string(),
//!     ..ShieldConfig::default()
//! };
//! let gate = Arc::new(BlockingGate::new(repository, resolver, config));
//!
//! let app: Router = Router::new()
//!     .route("/login", get(|| async { "login" }))
//!     .layer(from_fn_with_state(ShieldState::new(gate), shield_middleware))
//!     .layer(from_fn_with_state(
//!         SessionLayerState::new(CookieConfig::default()),
//!         session_middleware,
//!     ));
//! # }
//! ```

mod error;
mod middleware;
mod referer;
mod session;

pub use error::{FLOOD_CONTROL_MESSAGE, ShieldError};
pub use middleware::{ShieldState, shield_middleware};
pub use referer::{RefererConfig, referer_middleware};
pub use session::{
    CookieConfig, MemorySessionStore, Session, SessionLayerState, session_middleware,
};
