// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Schedule Window Resolver
//!
//! The on-call query always covers the next twelve hours from invocation.

use chrono::{DateTime, Duration, Utc};

use crate::domain::schedule::TimeWindow;

/// Length of the on-call query window
pub const ONCALL_WINDOW_HOURS: i64 = 12;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleWindowResolver;

impl ScheduleWindowResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            start: now,
            end: now + Duration::hours(ONCALL_WINDOW_HOURS),
        }
    }
}
