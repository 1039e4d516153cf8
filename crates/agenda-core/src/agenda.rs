//! Agenda blocks and the planning request/result pair.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::energy::EnergyLevel;
use crate::error::ValidationError;
use crate::project::{validate_estimate, Project};

/// Upper bound on a planning horizon unless configured otherwise (one week).
pub const DEFAULT_MAX_HORIZON_HOURS: f64 = 168.0;

/// One scheduled slot of work on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaBlock {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AgendaBlock {
    /// Create a block with a fresh id.
    pub fn new(
        user_id: impl Into<String>,
        project_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            project_id: project_id.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Check if this block overlaps with a time range
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// Input to one planning call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRequest {
    #[serde(alias = "backlog")]
    pub projects: Vec<Project>,
    pub horizon_hours: f64,
    pub energy: EnergyLevel,
    pub user_id: String,
}

impl PlanningRequest {
    pub fn new(
        user_id: impl Into<String>,
        projects: Vec<Project>,
        horizon_hours: f64,
        energy: EnergyLevel,
    ) -> Self {
        Self {
            projects,
            horizon_hours,
            energy,
            user_id: user_id.into(),
        }
    }

    /// Reject malformed input before planning.
    ///
    /// # Errors
    /// Returns an error for a horizon outside `(0, max_horizon_hours]`, an
    /// empty user id, or a project with a non-positive estimate.
    pub fn validate(&self, max_horizon_hours: f64) -> Result<(), ValidationError> {
        if !self.horizon_hours.is_finite()
            || self.horizon_hours <= 0.0
            || self.horizon_hours > max_horizon_hours
        {
            return Err(ValidationError::HorizonOutOfRange {
                value: self.horizon_hours,
                max: max_horizon_hours,
            });
        }
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "userId".into(),
                message: "must not be empty".into(),
            });
        }
        for project in &self.projects {
            validate_estimate(&project.id, project.estimated_hours)?;
        }
        Ok(())
    }
}

/// Output of one planning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningResult {
    pub blocks: Vec<AgendaBlock>,
    pub total_hours: f64,
}

impl PlanningResult {
    /// Total scheduled time computed from the blocks themselves.
    pub fn scheduled_duration(&self) -> Duration {
        self.blocks
            .iter()
            .fold(Duration::zero(), |acc, b| acc + b.duration())
    }

    /// Check that a proposed agenda honours the planning contract for
    /// `request`: blocks sorted and non-overlapping, each exactly one `slot`
    /// long, owned by the requester, referring to backlog projects, and a
    /// total that matches the blocks and fits the horizon.
    ///
    /// Returns a description of the first violation found.
    pub fn check_against(&self, request: &PlanningRequest, slot: Duration) -> Result<(), String> {
        const EPS: f64 = 1e-6;

        let known: HashSet<&str> = request.projects.iter().map(|p| p.id.as_str()).collect();
        let mut prev: Option<&AgendaBlock> = None;

        for (i, block) in self.blocks.iter().enumerate() {
            if block.duration() != slot {
                return Err(format!(
                    "block {i} lasts {} minutes, expected {}",
                    block.duration().num_minutes(),
                    slot.num_minutes()
                ));
            }
            if block.user_id != request.user_id {
                return Err(format!("block {i} is owned by '{}'", block.user_id));
            }
            if !known.contains(block.project_id.as_str()) {
                return Err(format!(
                    "block {i} refers to unknown project '{}'",
                    block.project_id
                ));
            }
            if let Some(prev) = prev {
                if prev.overlaps(block.start, block.end) {
                    return Err(format!("block {i} overlaps block {}", i - 1));
                }
                if block.start < prev.end {
                    return Err(format!("block {i} starts before block {}", i - 1));
                }
            }
            prev = Some(block);
        }

        let from_blocks = self.scheduled_duration().num_seconds() as f64 / 3600.0;
        if !self.total_hours.is_finite() || (self.total_hours - from_blocks).abs() > EPS {
            return Err(format!(
                "totalHours {} does not match the {} hours covered by blocks",
                self.total_hours, from_blocks
            ));
        }
        if self.total_hours > request.horizon_hours + EPS {
            return Err(format!(
                "totalHours {} exceeds horizon {}",
                self.total_hours, request.horizon_hours
            ));
        }
        Ok(())
    }
}
