//! Shield configuration.
//!
//! Loaded once at startup and immutable thereafter; the gate takes the
//! config at construction time, which keeps tests deterministic across
//! varied thresholds.

use std::collections::{HashMap, HashSet};

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// What the integration does when the durable attempt backend is
/// unreachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailablePolicy {
    /// Let the request through and log a warning.
    FailOpen,
    /// Reject the request. This is the default: the original behavior on a
    /// backend failure was a server error, so closed preserves it.
    #[default]
    FailClosed,
}

/// Configuration for the blocking gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldConfig {
    /// Master switch. When false every route gets `Allow` and nothing is
    /// counted or recorded.
    pub enabled: bool,
    /// Routes subject to the blocking check. Attempts are never recorded
    /// or counted for routes outside this set.
    pub guarded_routes: HashSet<String>,
    /// Width of the trailing window within which attempts are counted.
    pub block_for_minutes: i64,
    /// First count value that leaves the Normal state and starts
    /// redirecting to recovery.
    pub limit_before_recover: u32,
    /// Last count value that still redirects; strictly exceeding it hard
    /// blocks.
    pub limit_before_hard_block: u32,
    /// Route name the recovery redirect resolves against.
    pub recover_route: String,
    pub recover_route_params: HashMap<String, String>,
    /// The one route whose visits generate new failure signals once a
    /// client is at or past the recovery threshold.
    pub login_route: String,
    pub unavailable_policy: UnavailablePolicy,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            guarded_routes: HashSet::new(),
            block_for_minutes: 15,
            limit_before_recover: 5,
            limit_before_hard_block: 10,
            recover_route: String::new(),
            recover_route_params: HashMap::new(),
            login_route: String::new(),
            unavailable_policy: UnavailablePolicy::default(),
        }
    }
}

impl ShieldConfig {
    /// A configuration with the shield switched off entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn window(&self) -> Duration {
        Duration::minutes(self.block_for_minutes)
    }

    pub fn is_guarded(&self, route: &str) -> bool {
        self.guarded_routes.contains(route)
    }
}
