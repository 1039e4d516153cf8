//! # Agenda Planner Core Library
//!
//! This library provides the core logic for a personal agenda planner:
//! users keep a backlog of projects and ask for an agenda of fixed-size
//! time blocks covering a planning horizon.
//!
//! ## Architecture
//!
//! - **Scheduler**: Greedy slot allocator ordered by priority, valence and
//!   due date, with an optional external strategy that falls back to it
//! - **Energy**: Tier multipliers applied to estimated effort
//! - **Storage**: SQLite persistence for projects and confirmed agendas,
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`DeterministicScheduler`]: The reference planning algorithm
//! - [`ExternalScheduler`]: External strategy with timeout and fallback
//! - [`AgendaPlanner`]: Strategy chosen from [`Config`]
//! - [`AgendaDb`]: Project and agenda persistence

pub mod agenda;
pub mod clock;
pub mod energy;
pub mod error;
pub mod project;
pub mod scheduler;
pub mod storage;

pub use agenda::{AgendaBlock, PlanningRequest, PlanningResult, DEFAULT_MAX_HORIZON_HOURS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use energy::{EnergyCurve, EnergyLevel, TieredEnergyCurve};
pub use error::{ConfigError, CoreError, DatabaseError, PlannerError, ValidationError};
pub use project::{Project, ProjectUpdate};
pub use scheduler::{
    AgendaPlanner, DeterministicScheduler, ExternalPlanner, ExternalScheduler, HttpPlanner,
    Planner, SchedulerConfig,
};
pub use storage::{AgendaDb, Config, PlannerConfig, PlannerStrategy};
