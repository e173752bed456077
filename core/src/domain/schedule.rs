// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Schedule
//!
//! Domain view of the external scheduling system (PagerDuty).
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Schedule names, query windows, on-call entries and the
//!   narrow capability the aggregator consumes

// Scheduling Provider Domain Interface (Anti-Corruption Layer)
//
// The core only ever needs two calls from the scheduling system: list the
// schedules it knows about and ask who is on call for one of them within a
// window. Implementations live in infrastructure/pagerduty.rs.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a schedule as shown in the scheduling system
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleName(pub String);

impl ScheduleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScheduleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A schedule known to the scheduling system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Provider-side identifier used for on-call queries
    pub id: String,
    pub name: ScheduleName,
}

/// Interval for which on-call assignment is queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Start of the window in the scheduling API's timestamp convention
    pub fn since(&self) -> String {
        format_timestamp(self.start)
    }

    /// End of the window in the scheduling API's timestamp convention
    pub fn until(&self) -> String {
        format_timestamp(self.end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.since(), self.until())
    }
}

/// RFC 3339, second precision, `Z` for UTC
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// One person on call for a schedule within the queried window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OnCallEntry {
    /// Email address of the on-call person
    pub external_identity: String,
}

impl OnCallEntry {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            external_identity: email.into(),
        }
    }
}

/// Read-only handle to the scheduling system
#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    /// List every schedule visible to the configured token
    async fn list_schedules(&self) -> Result<Vec<Schedule>, SchedulingError>;

    /// List the people on call for `schedule_id` within `window`
    async fn list_on_call(
        &self,
        schedule_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<OnCallEntry>, SchedulingError>;
}

/// Errors returned by a scheduling provider
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Unexpected response: {0}")]
    Parse(String),
}
