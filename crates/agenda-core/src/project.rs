//! Backlog items.
//!
//! A project is one unit of pending work owned by a user. Valence
//! (importance) and priority (urgency) are 1-5 ratings and are clamped into
//! range on construction and update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Clamp a valence/priority rating into `[1, 5]`.
pub fn clamp_rating(value: i32) -> i32 {
    value.clamp(MIN_RATING, MAX_RATING)
}

/// Check that an hour estimate is a positive, finite number.
pub fn validate_estimate(project_id: &str, hours: f64) -> Result<(), ValidationError> {
    if hours.is_finite() && hours > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidEstimate {
            project_id: project_id.to_string(),
            value: hours,
        })
    }
}

/// A backlog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Free-form label such as "work" or "family".
    pub category: String,
    #[serde(alias = "valenza")]
    pub valence: i32,
    #[serde(alias = "estHours")]
    pub estimated_hours: f64,
    pub priority: i32,
    pub due_date: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create a project with a fresh id. Ratings are clamped.
    ///
    /// # Errors
    /// Returns an error if `estimated_hours` is not positive and finite.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        valence: i32,
        estimated_hours: f64,
        priority: i32,
        due_date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let id = Uuid::new_v4().to_string();
        validate_estimate(&id, estimated_hours)?;
        Ok(Self {
            id,
            user_id: user_id.into(),
            title: title.into(),
            category: category.into(),
            valence: clamp_rating(valence),
            estimated_hours,
            priority: clamp_rating(priority),
            due_date,
            created_at: Utc::now(),
        })
    }

    /// Re-apply the rating clamp, e.g. after deserializing foreign input.
    pub fn normalized(mut self) -> Self {
        self.valence = clamp_rating(self.valence);
        self.priority = clamp_rating(self.priority);
        self
    }

    /// Apply a partial update in place.
    ///
    /// # Errors
    /// Returns an error if the update carries an invalid estimate or an
    /// empty title/category. The project is left untouched on error.
    pub fn apply(&mut self, update: &ProjectUpdate) -> Result<(), ValidationError> {
        if let Some(hours) = update.estimated_hours {
            validate_estimate(&self.id, hours)?;
        }
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "title".into(),
                    message: "must not be empty".into(),
                });
            }
        }
        if let Some(category) = &update.category {
            if category.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "category".into(),
                    message: "must not be empty".into(),
                });
            }
        }

        if let Some(title) = &update.title {
            self.title = title.trim().to_string();
        }
        if let Some(category) = &update.category {
            self.category = category.trim().to_string();
        }
        if let Some(valence) = update.valence {
            self.valence = clamp_rating(valence);
        }
        if let Some(hours) = update.estimated_hours {
            self.estimated_hours = hours;
        }
        if let Some(priority) = update.priority {
            self.priority = clamp_rating(priority);
        }
        if let Some(due) = update.due_date {
            self.due_date = due;
        }
        Ok(())
    }
}

/// Partial update for a project; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub valence: Option<i32>,
    pub estimated_hours: Option<f64>,
    pub priority: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProjectUpdate::default()
    }
}
