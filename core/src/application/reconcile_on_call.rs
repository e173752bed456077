// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Reconcile On-Call Use Case
//!
//! Application service running one reconciliation pass end to end.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Sequence the reconciliation components
//! - **Collaborators:**
//!   - Domain: MembershipSet, MembershipDiff, ReconciliationOutcome
//!   - Infrastructure (through traits): SchedulingProvider, DirectoryClient,
//!     MessagingProvider
//!
//! # Flow
//!
//! ```text
//! Start → WindowResolved → Aggregated → Reconciled → {NoOp | Updated} → Notified? → Done
//!                       any error ─────────────────────────────────────→ Err(ReconcileError)
//! ```
//!
//! A failed pass has no report: the `Err` return is its terminal state, and
//! the last state reached before the failure is logged with the error.
//!
//! 1. Resolve the twelve hour query window
//! 2. Aggregate on-call emails for the watched schedules
//! 3. Read the current group, map emails to uids, diff
//! 4. Unchanged: stop. Changed: bind, remove, add
//! 5. Announce the change (best effort)
//!
//! The directory session is closed when the pass ends, whatever the outcome.
//!
//! # Error Handling
//!
//! The first error ends the pass and is returned as-is; later states are not
//! attempted and nothing is retried.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::aggregator::OnCallAggregator;
use super::group_reader::GroupReader;
use super::identity_mapper::IdentityMapper;
use super::notifier::ChangeNotifier;
use super::reconciler::MembershipReconciler;
use super::updater::{AppliedChanges, BindCredentials, GroupMembershipUpdater};
use super::window::ScheduleWindowResolver;
use crate::domain::config::{DeputizeConfig, LdapSettings};
use crate::domain::directory::DirectoryClient;
use crate::domain::errors::ReconcileError;
use crate::domain::membership::ReconciliationOutcome;
use crate::domain::messaging::MessagingProvider;
use crate::domain::schedule::{ScheduleName, SchedulingProvider, TimeWindow};

/// States of a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    WindowResolved,
    Aggregated,
    Reconciled,
    NoOp,
    Updated,
    Notified,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute and log the diff, but do not bind, modify or notify
    pub dry_run: bool,
}

/// Summary of a successful pass
#[derive(Debug, Clone)]
pub struct RunReport {
    pub window: TimeWindow,
    pub outcome: ReconciliationOutcome,
    /// `None` when nothing was written (no-op or dry run)
    pub applied: Option<AppliedChanges>,
    pub notified: bool,
    /// Every state the pass went through, in order
    pub states: Vec<RunState>,
}

impl RunReport {
    pub fn final_state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Start)
    }
}

#[async_trait]
pub trait ReconcileOnCallUseCase: Send + Sync {
    /// Run one pass with `now` as the start of the query window
    async fn run(&self, now: DateTime<Utc>) -> Result<RunReport, ReconcileError>;
}

/// Standard implementation of ReconcileOnCallUseCase
pub struct StandardReconcileOnCallUseCase {
    schedules: Vec<ScheduleName>,
    ldap: LdapSettings,
    scheduling: Arc<dyn SchedulingProvider>,
    directory: Arc<dyn DirectoryClient>,
    notifier: ChangeNotifier,
    credentials: BindCredentials,
    options: RunOptions,
}

impl StandardReconcileOnCallUseCase {
    pub fn new(
        config: &DeputizeConfig,
        scheduling: Arc<dyn SchedulingProvider>,
        directory: Arc<dyn DirectoryClient>,
        messaging: Option<Arc<dyn MessagingProvider>>,
        directory_password: impl Into<String>,
        options: RunOptions,
    ) -> Self {
        let notifier = match (config.slack.enabled, messaging, config.slack.channel.as_deref()) {
            (true, Some(messaging), Some(channel)) => ChangeNotifier::new(
                messaging,
                channel,
                config.ldap.server.clone(),
                config.ldap.group_display_name(),
            ),
            (true, _, _) => {
                warn!("Slack notifications enabled but no client or channel configured; disabling");
                ChangeNotifier::disabled()
            }
            _ => ChangeNotifier::disabled(),
        };

        Self {
            schedules: config.schedules.clone(),
            ldap: config.ldap.clone(),
            scheduling,
            directory,
            notifier,
            credentials: BindCredentials::new(config.ldap.mod_user_dn.clone(), directory_password),
            options,
        }
    }

    async fn execute(
        &self,
        now: DateTime<Utc>,
        states: &mut Vec<RunState>,
    ) -> Result<RunReport, ReconcileError> {
        // Step 1: Query window
        let window = ScheduleWindowResolver::new().resolve(now);
        transition(states, RunState::WindowResolved);

        // Step 2: Who is on call
        let on_call = OnCallAggregator::new(self.scheduling.clone())
            .aggregate(&self.schedules, &window)
            .await?;
        transition(states, RunState::Aggregated);

        // Step 3: Current vs desired
        let current = GroupReader::from_settings(self.directory.clone(), &self.ldap)
            .current_members()
            .await?;
        let mapper = IdentityMapper::from_settings(self.directory.clone(), &self.ldap);
        let outcome = MembershipReconciler::new(&mapper)
            .reconcile(current, &on_call)
            .await?;
        transition(states, RunState::Reconciled);

        if !outcome.changed {
            transition(states, RunState::NoOp);
            transition(states, RunState::Done);
            return Ok(RunReport {
                window,
                outcome,
                applied: None,
                notified: false,
                states: std::mem::take(states),
            });
        }

        if outcome.desired.is_empty() && !self.ldap.allow_empty_group {
            return Err(ReconcileError::EmptyDesiredSet {
                group_dn: self.ldap.group_dn.clone(),
            });
        }

        if self.options.dry_run {
            info!(
                to_add = %outcome.diff.to_add,
                to_remove = %outcome.diff.to_remove,
                "Dry run: leaving {} untouched",
                self.ldap.group_dn
            );
            transition(states, RunState::Done);
            return Ok(RunReport {
                window,
                outcome,
                applied: None,
                notified: false,
                states: std::mem::take(states),
            });
        }

        // Step 4: Remove, then add
        let updater = GroupMembershipUpdater::new(
            self.directory.clone(),
            self.ldap.group_dn.clone(),
            self.ldap.member_attribute.clone(),
            self.credentials.clone(),
        );
        let applied = updater.apply(&outcome.diff).await?;
        transition(states, RunState::Updated);

        // Step 5: Announce (best effort)
        let notified = self.notifier.notify(&outcome).await;
        if notified {
            transition(states, RunState::Notified);
        }
        transition(states, RunState::Done);

        Ok(RunReport {
            window,
            outcome,
            applied: Some(applied),
            notified,
            states: std::mem::take(states),
        })
    }
}

#[async_trait]
impl ReconcileOnCallUseCase for StandardReconcileOnCallUseCase {
    async fn run(&self, now: DateTime<Utc>) -> Result<RunReport, ReconcileError> {
        let schedule_names: Vec<&str> = self.schedules.iter().map(|s| s.as_str()).collect();
        info!("Deputize starting. On-call schedules: {}", schedule_names.join(", "));

        let mut states = vec![RunState::Start];
        let result = self.execute(now, &mut states).await;

        if let Err(e) = self.directory.close().await {
            warn!("Failed to close directory session: {}", e);
        }

        match result {
            Ok(report) => {
                info!(final_state = %report.final_state(), "Reconciliation pass finished");
                Ok(report)
            }
            Err(e) => {
                let last_state = states.last().copied().unwrap_or(RunState::Start);
                error!(%last_state, "Reconciliation pass failed: {}", e);
                Err(e)
            }
        }
    }
}

fn transition(states: &mut Vec<RunState>, next: RunState) {
    debug!(from = ?states.last(), to = %next, "Run state transition");
    states.push(next);
}
