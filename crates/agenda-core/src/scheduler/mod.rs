//! Agenda scheduler.
//!
//! Turns a user's backlog into a time-boxed agenda of fixed-size slots:
//! - Orders the backlog by priority, valence and due date
//! - Scales each estimate by the requester's energy tier
//! - Allocates contiguous slots from "now" until the horizon is used up
//!
//! [`DeterministicScheduler`] is the reference algorithm. An external
//! strategy can be plugged in through [`ExternalScheduler`], which falls
//! back to the deterministic path whenever the external planner fails.
//! [`AgendaPlanner`] picks one of the two from configuration.

mod external;
mod http;

pub use external::{ExternalPlanner, ExternalScheduler};
pub use http::HttpPlanner;

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tracing::debug;

use crate::agenda::{AgendaBlock, PlanningRequest, PlanningResult, DEFAULT_MAX_HORIZON_HOURS};
use crate::clock::{Clock, SystemClock};
use crate::energy::{EnergyCurve, TieredEnergyCurve};
use crate::error::{ConfigError, CoreError, ValidationError};
use crate::project::{clamp_rating, Project};
use crate::storage::config::{PlannerConfig, PlannerStrategy};

/// Slot counts within this distance of a whole number are taken as exact.
const SLOT_EPSILON: f64 = 1e-9;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Length of one agenda block (minutes)
    pub slot_minutes: u32,
    /// Largest horizon a request may ask for (hours)
    pub max_horizon_hours: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            slot_minutes: 30,
            max_horizon_hours: DEFAULT_MAX_HORIZON_HOURS,
        }
    }
}

impl SchedulerConfig {
    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    /// Hours covered by `slots` whole slots.
    fn hours_for(&self, slots: u64) -> f64 {
        (slots * u64::from(self.slot_minutes)) as f64 / 60.0
    }

    /// Largest number of slots whose total does not exceed `horizon_hours`.
    fn slot_budget(&self, horizon_hours: f64) -> u64 {
        if self.slot_minutes == 0 || !horizon_hours.is_finite() || horizon_hours <= 0.0 {
            return 0;
        }
        let raw = horizon_hours * 60.0 / f64::from(self.slot_minutes);
        let mut budget = (raw + SLOT_EPSILON).floor() as u64;
        while budget > 0 && self.hours_for(budget) > horizon_hours {
            budget -= 1;
        }
        budget
    }
}

/// Backlog processing order: priority descending, then valence descending,
/// then due date ascending, then id ascending.
///
/// Ratings are compared after clamping to 1..=5.
pub fn backlog_order(a: &Project, b: &Project) -> Ordering {
    clamp_rating(b.priority)
        .cmp(&clamp_rating(a.priority))
        .then_with(|| clamp_rating(b.valence).cmp(&clamp_rating(a.valence)))
        .then_with(|| a.due_date.cmp(&b.due_date))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort a backlog into processing order.
pub fn sort_backlog(projects: &mut [Project]) {
    projects.sort_by(backlog_order);
}

/// Number of slots needed to cover `hours` of work.
///
/// Rounds up to the next whole slot, with a minimum of one slot for any
/// positive duration. Non-positive durations need no slots.
pub fn slots_needed(hours: f64, slot_minutes: u32) -> u64 {
    if hours.is_nan() || hours <= 0.0 || slot_minutes == 0 {
        return 0;
    }
    let raw = hours * 60.0 / f64::from(slot_minutes);
    let nearest = raw.round();
    let slots = if (raw - nearest).abs() < SLOT_EPSILON {
        nearest
    } else {
        raw.ceil()
    };
    (slots as u64).max(1)
}

/// A planning strategy.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Produce an agenda for `request`.
    ///
    /// # Errors
    /// Returns an error only for malformed input.
    async fn plan(&self, request: &PlanningRequest) -> Result<PlanningResult, ValidationError>;
}

/// The reference greedy scheduler.
#[derive(Clone)]
pub struct DeterministicScheduler {
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    energy: Arc<dyn EnergyCurve>,
}

impl DeterministicScheduler {
    /// Create a new scheduler with default config and the system clock
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            energy: Arc::new(TieredEnergyCurve::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_energy_curve(mut self, energy: Arc<dyn EnergyCurve>) -> Self {
        self.energy = energy;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Generate an agenda for a validated request.
    ///
    /// # Errors
    /// Returns an error if the request fails validation or the configured
    /// slot length is zero.
    pub fn plan(&self, request: &PlanningRequest) -> Result<PlanningResult, ValidationError> {
        if self.config.slot_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "planner.slot_minutes".into(),
                message: "must be greater than 0".into(),
            });
        }
        request.validate(self.config.max_horizon_hours)?;
        Ok(self.allocate(request))
    }

    fn allocate(&self, request: &PlanningRequest) -> PlanningResult {
        let mut backlog = request.projects.clone();
        sort_backlog(&mut backlog);

        let multiplier = self.energy.multiplier(request.energy);
        let slot = self.config.slot_duration();
        let budget = self.config.slot_budget(request.horizon_hours);

        let mut cursor = self.clock.now();
        let mut blocks = Vec::new();
        let mut used: u64 = 0;

        for project in &backlog {
            if used >= budget {
                break;
            }
            let wanted = slots_needed(project.estimated_hours * multiplier, self.config.slot_minutes);
            let granted = wanted.min(budget - used);

            for _ in 0..granted {
                let end = cursor + slot;
                blocks.push(AgendaBlock::new(&request.user_id, &project.id, cursor, end));
                cursor = end;
            }
            used += granted;

            if granted < wanted {
                debug!(
                    project_id = %project.id,
                    wanted,
                    granted,
                    "horizon reached, project truncated"
                );
            }
        }

        let total_hours = self.config.hours_for(used);
        debug!(
            user_id = %request.user_id,
            projects = backlog.len(),
            blocks = blocks.len(),
            total_hours,
            "agenda planned"
        );

        PlanningResult {
            blocks,
            total_hours,
        }
    }
}

impl Default for DeterministicScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Planner for DeterministicScheduler {
    async fn plan(&self, request: &PlanningRequest) -> Result<PlanningResult, ValidationError> {
        DeterministicScheduler::plan(self, request)
    }
}

/// Planning strategy selected by configuration.
pub enum AgendaPlanner {
    Deterministic(DeterministicScheduler),
    External(ExternalScheduler),
}

impl AgendaPlanner {
    /// Build the configured strategy.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, or if the external
    /// strategy is selected without an endpoint.
    pub fn from_config(config: &PlannerConfig, clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        config.validate()?;
        let deterministic = DeterministicScheduler::with_config(config.scheduler_config())
            .with_clock(clock)
            .with_energy_curve(Arc::new(config.energy));

        match config.strategy {
            PlannerStrategy::Deterministic => Ok(AgendaPlanner::Deterministic(deterministic)),
            PlannerStrategy::External => {
                let endpoint = config
                    .external
                    .endpoint
                    .clone()
                    .filter(|e| !e.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingKey("planner.external.endpoint".into()))?;
                let http = HttpPlanner::new(endpoint)?;
                Ok(AgendaPlanner::External(ExternalScheduler::new(
                    Box::new(http),
                    deterministic,
                    std::time::Duration::from_secs(config.external.timeout_secs),
                )))
            }
        }
    }

    /// Produce an agenda with the selected strategy.
    ///
    /// # Errors
    /// Returns an error only for malformed input.
    pub async fn plan(&self, request: &PlanningRequest) -> Result<PlanningResult, ValidationError> {
        match self {
            AgendaPlanner::Deterministic(s) => s.plan(request),
            AgendaPlanner::External(s) => s.plan(request).await,
        }
    }
}

#[async_trait]
impl Planner for AgendaPlanner {
    async fn plan(&self, request: &PlanningRequest) -> Result<PlanningResult, ValidationError> {
        AgendaPlanner::plan(self, request).await
    }
}
