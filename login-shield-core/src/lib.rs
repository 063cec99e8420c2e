//! Core counting and escalation logic for the login-shield brute force
//! protection system.
//!
//! Failed login attempts are tracked per client identity, the (session id,
//! source IP) pair, in two append-only halves: a durable log behind the
//! [`AttemptRepository`] trait and a session-scoped mirror behind
//! [`SessionHandle`]. [`AttemptStore`] merges them at read time,
//! [`AttemptTracker`] applies the trailing time window, and
//! [`BlockingGate`] turns the windowed count into a per-request
//! [`Verdict`]: pass through, redirect toward account recovery, or hard
//! block.
//!
//! The crate is framework-agnostic; see `login-shield-axum` for a
//! ready-made integration and `login-shield-storage-sqlite` for a durable
//! backend.

pub mod config;
pub mod error;
pub mod repositories;
pub mod routing;
pub mod services;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ShieldConfig, UnavailablePolicy};
pub use error::{Error, StorageError};
pub use repositories::AttemptRepository;
pub use routing::{RouteResolver, StaticRouteResolver};
pub use services::{AttemptStore, AttemptTracker, BlockingGate, GateRequest, Verdict};
pub use session::{SessionHandle, SessionId};
pub use storage::{ClientIdentity, LoginAttempt, RecordedAttempt};
