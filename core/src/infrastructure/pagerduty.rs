// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! PagerDuty Scheduling Adapter
//!
//! REST v2 client implementing [`SchedulingProvider`].
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** List schedules and the users on call for one of them
//! - **Integration:** PagerDuty REST API → `PagerDutyClient` → on-call aggregator

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::domain::schedule::{
    OnCallEntry, Schedule, ScheduleName, SchedulingError, SchedulingProvider, TimeWindow,
};

const ACCEPT_HEADER: &str = "application/vnd.pagerduty+json;version=2";
const PAGE_SIZE: usize = 100;

// ============================================================================
// Wire Models
// ============================================================================

#[derive(Debug, Deserialize)]
struct SchedulesPage {
    #[serde(default)]
    schedules: Vec<ScheduleRecord>,
    #[serde(default)]
    more: bool,
}

#[derive(Debug, Deserialize)]
struct ScheduleRecord {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ScheduleUsers {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    email: String,
}

// ============================================================================
// Client Implementation
// ============================================================================

pub struct PagerDutyClient {
    /// API base URL, without trailing slash
    base_url: String,
    token: String,
    client: Client,
}

impl PagerDutyClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SchedulingError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "PagerDuty request");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token token={}", self.token))
            .header("Accept", ACCEPT_HEADER)
            .query(query)
            .send()
            .await
            .map_err(|e| SchedulingError::Network(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SchedulingError::Parse(e.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, SchedulingError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(SchedulingError::Authentication(format!("HTTP {}", status)))
        }
        _ => Err(SchedulingError::Api(format!("HTTP {}: {}", status, body))),
    }
}

#[async_trait]
impl SchedulingProvider for PagerDutyClient {
    async fn list_schedules(&self) -> Result<Vec<Schedule>, SchedulingError> {
        let mut schedules = Vec::new();
        let mut offset = 0;

        loop {
            let page: SchedulesPage = self
                .get_json(
                    "/schedules",
                    &[("limit", PAGE_SIZE.to_string()), ("offset", offset.to_string())],
                )
                .await?;

            let fetched = page.schedules.len();
            schedules.extend(page.schedules.into_iter().map(|s| Schedule {
                id: s.id,
                name: ScheduleName::new(s.name),
            }));

            if !page.more || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        debug!(count = schedules.len(), "Listed PagerDuty schedules");
        Ok(schedules)
    }

    async fn list_on_call(
        &self,
        schedule_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<OnCallEntry>, SchedulingError> {
        let users: ScheduleUsers = self
            .get_json(
                &format!("/schedules/{}/users", schedule_id),
                &[("since", window.since()), ("until", window.until())],
            )
            .await?;

        Ok(users
            .users
            .into_iter()
            .map(|u| OnCallEntry::new(u.email))
            .collect())
    }
}
