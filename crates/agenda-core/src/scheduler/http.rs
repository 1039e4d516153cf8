//! JSON-over-HTTP external planner.
//!
//! POSTs the planning request (`projects`, `horizonHours`, `energy`,
//! `userId`) to a configured endpoint and expects `{blocks, totalHours}`
//! back.

use async_trait::async_trait;
use reqwest::Client;

use super::external::ExternalPlanner;
use crate::agenda::{PlanningRequest, PlanningResult};
use crate::error::PlannerError;

const USER_AGENT: &str = "agenda-planner";

pub struct HttpPlanner {
    client: Client,
    endpoint: String,
}

impl HttpPlanner {
    /// Create a planner that posts to `endpoint`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PlannerError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ExternalPlanner for HttpPlanner {
    fn name(&self) -> &str {
        "http"
    }

    async fn propose(&self, request: &PlanningRequest) -> Result<PlanningResult, PlannerError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PlannerError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| PlannerError::Malformed(e.to_string()))
    }
}
