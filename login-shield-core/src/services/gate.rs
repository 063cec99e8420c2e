//! The request-time escalation state machine.

use std::sync::Arc;

use crate::{
    Error, config::ShieldConfig, repositories::AttemptRepository, routing::RouteResolver,
    services::AttemptTracker, session::SessionHandle, storage::ClientIdentity,
};

/// The gate's decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Verdict {
    /// Pass through, no mutation.
    Allow,
    /// Short-circuit with a redirect toward the account recovery flow.
    RedirectToRecovery { location: String },
    /// Terminal: stop the request with a flood-control server error.
    HardBlock,
}

/// The slice of an inbound request the gate needs.
pub struct GateRequest<'a> {
    /// Matched route identifier, if the router produced one.
    pub route: Option<&'a str>,
    /// Client source IP as reported by the connection or proxy headers.
    pub ip_address: Option<&'a str>,
    /// Session attached to the request.
    pub session: &'a dyn SessionHandle,
}

/// Decision engine invoked once per incoming request.
///
/// Verdicts are recomputed from the current windowed count on every
/// evaluation; the gate holds no mutable state beyond its immutable
/// configuration, so it is safely shared across concurrent requests
/// without locking.
pub struct BlockingGate<R: AttemptRepository, P: RouteResolver> {
    tracker: AttemptTracker<R>,
    resolver: P,
    config: ShieldConfig,
}

impl<R: AttemptRepository, P: RouteResolver> BlockingGate<R, P> {
    pub fn new(repository: Arc<R>, resolver: P, config: ShieldConfig) -> Self {
        Self {
            tracker: AttemptTracker::new(repository, config.window()),
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &ShieldConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Evaluate one request. Each request gets exactly one evaluation;
    /// callers must not retry on [`Error::TrackerUnavailable`].
    pub async fn evaluate(&self, request: &GateRequest<'_>) -> Result<Verdict, Error> {
        if !self.config.enabled {
            return Ok(Verdict::Allow);
        }

        // Unknown or unguarded routes never count or record anything.
        let Some(route) = request.route else {
            return Ok(Verdict::Allow);
        };
        if !self.config.is_guarded(route) {
            return Ok(Verdict::Allow);
        }

        let identity = ClientIdentity::new(
            request.session.id(),
            request.ip_address.map(str::to_string),
        );
        if identity.is_empty() {
            // Nothing to key the counter on; fail open on classification
            // rather than crash the pipeline.
            tracing::warn!(route, "guarded route hit without any client identity");
            return Ok(Verdict::Allow);
        }

        let mut count = self.tracker.attempt_count(request.session, &identity).await?;

        // Common case: still below the recovery threshold.
        if count < self.config.limit_before_recover {
            return Ok(Verdict::Allow);
        }

        // Only the login route itself generates new failure signals here.
        // Attempts against the recovery route or other guarded routes must
        // not inflate the counter.
        if route == self.config.login_route {
            count = self
                .tracker
                .add_attempt(request.session, &identity, "")
                .await?;
        }

        // Inclusive on the recovery side: a client sitting exactly at the
        // hard-block limit is still redirected, only exceeding it blocks.
        if count <= self.config.limit_before_hard_block {
            let target = self
                .resolver
                .resolve(&self.config.recover_route, &self.config.recover_route_params);
            return match target {
                Some(location) => {
                    tracing::debug!(route, count, "redirecting client to account recovery");
                    Ok(Verdict::RedirectToRecovery { location })
                }
                None => {
                    tracing::warn!(
                        recover_route = %self.config.recover_route,
                        "recovery route did not resolve, allowing request"
                    );
                    Ok(Verdict::Allow)
                }
            };
        }

        tracing::debug!(route, count, "hard blocking client");
        Ok(Verdict::HardBlock)
    }
}
