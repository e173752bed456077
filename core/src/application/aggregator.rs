// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! On-Call Aggregator
//!
//! Collects the email of everyone on call, within the query window, for the
//! watched schedules.
//!
//! # Flow
//!
//! 1. List every schedule once
//! 2. Skip schedules whose name is not watched
//! 3. Query on-call users for each watched schedule and append their emails
//!
//! Watched names that the scheduling system does not know are logged and
//! skipped. Any failing API call aborts aggregation; the caller never sees a
//! partial list.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::ReconcileError;
use crate::domain::schedule::{OnCallEntry, ScheduleName, SchedulingProvider, TimeWindow};

pub struct OnCallAggregator {
    scheduling: Arc<dyn SchedulingProvider>,
}

impl OnCallAggregator {
    pub fn new(scheduling: Arc<dyn SchedulingProvider>) -> Self {
        Self { scheduling }
    }

    /// Emails on call for `watch_list` during `window`; duplicates are kept
    pub async fn aggregate(
        &self,
        watch_list: &[ScheduleName],
        window: &TimeWindow,
    ) -> Result<Vec<OnCallEntry>, ReconcileError> {
        let watched: HashSet<&ScheduleName> = watch_list.iter().collect();

        let schedules = self
            .scheduling
            .list_schedules()
            .await
            .map_err(|source| ReconcileError::UpstreamQuery {
                operation: "list schedules".to_string(),
                source,
            })?;

        let mut seen: HashSet<&ScheduleName> = HashSet::new();
        let mut entries = Vec::new();

        for schedule in schedules.iter().filter(|s| watched.contains(&s.name)) {
            seen.insert(&schedule.name);

            info!(
                "Getting on-call for schedule \"{}\" ({}) between {} and {}",
                schedule.name,
                schedule.id,
                window.since(),
                window.until()
            );

            let on_call = self
                .scheduling
                .list_on_call(&schedule.id, window)
                .await
                .map_err(|source| ReconcileError::UpstreamQuery {
                    operation: format!("list on-call users for schedule '{}'", schedule.name),
                    source,
                })?;

            debug!(schedule = %schedule.name, count = on_call.len(), "On-call users received");
            entries.extend(on_call);
        }

        for name in watch_list.iter().filter(|n| !seen.contains(n)) {
            warn!("Watched schedule \"{}\" not found in the scheduling system, skipping", name);
        }

        Ok(entries)
    }
}
