//! External planning strategies with deterministic fallback.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{DeterministicScheduler, Planner};
use crate::agenda::{PlanningRequest, PlanningResult};
use crate::error::{PlannerError, ValidationError};

/// A planner that lives outside this process (a remote service, a model).
///
/// Implementations must honour the same contract as
/// [`DeterministicScheduler`]; anything else is treated as a failure.
#[async_trait]
pub trait ExternalPlanner: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Ask the external planner for an agenda.
    async fn propose(&self, request: &PlanningRequest) -> Result<PlanningResult, PlannerError>;
}

/// Runs an external planner under a timeout and falls back to the
/// deterministic scheduler on timeout, error or a malformed proposal.
pub struct ExternalScheduler {
    external: Box<dyn ExternalPlanner>,
    fallback: DeterministicScheduler,
    timeout: Duration,
}

impl ExternalScheduler {
    pub fn new(
        external: Box<dyn ExternalPlanner>,
        fallback: DeterministicScheduler,
        timeout: Duration,
    ) -> Self {
        Self {
            external,
            fallback,
            timeout,
        }
    }

    /// Produce an agenda, preferring the external planner.
    ///
    /// # Errors
    /// Returns an error only when the request itself is invalid; external
    /// failures are never surfaced.
    pub async fn plan(&self, request: &PlanningRequest) -> Result<PlanningResult, ValidationError> {
        request.validate(self.fallback.config().max_horizon_hours)?;

        match self.propose_checked(request).await {
            Ok(result) => {
                debug!(
                    planner = self.external.name(),
                    blocks = result.blocks.len(),
                    "external agenda accepted"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(
                    planner = self.external.name(),
                    error = %err,
                    "external planner failed, falling back to deterministic scheduler"
                );
                self.fallback.plan(request)
            }
        }
    }

    async fn propose_checked(
        &self,
        request: &PlanningRequest,
    ) -> Result<PlanningResult, PlannerError> {
        let result = tokio::time::timeout(self.timeout, self.external.propose(request))
            .await
            .map_err(|_| PlannerError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })??;
        result
            .check_against(request, self.fallback.config().slot_duration())
            .map_err(PlannerError::Malformed)?;
        Ok(result)
    }
}

#[async_trait]
impl Planner for ExternalScheduler {
    async fn plan(&self, request: &PlanningRequest) -> Result<PlanningResult, ValidationError> {
        ExternalScheduler::plan(self, request).await
    }
}
