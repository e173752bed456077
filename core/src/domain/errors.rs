// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Errors
//!
//! Run-level error taxonomy. Every variant aborts the reconciliation pass;
//! none are retried within a run.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Surface which phase failed and why

use std::fmt;
use thiserror::Error;

use super::directory::DirectoryError;
use super::schedule::SchedulingError;

/// Phase of the two-step group update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyPhase {
    Remove,
    Add,
}

impl fmt::Display for ModifyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove => f.write_str("remove"),
            Self::Add => f.write_str("add"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Scheduling system unreachable or erroring
    #[error("Scheduling API query failed ({operation}): {source}")]
    UpstreamQuery {
        operation: String,
        #[source]
        source: SchedulingError,
    },

    /// An on-call person has no directory entry
    #[error("No directory entry found with {attribute}={identity}")]
    IdentityNotFound { identity: String, attribute: String },

    /// More than one directory entry matches and the policy forbids guessing
    #[error("{count} directory entries match {attribute}={identity}")]
    AmbiguousIdentity {
        identity: String,
        attribute: String,
        count: usize,
    },

    #[error("Directory entry {dn} has no {attribute} value")]
    MissingUidAttribute { dn: String, attribute: String },

    #[error("Directory search failed ({context}): {source}")]
    DirectoryQuery {
        context: String,
        #[source]
        source: DirectoryError,
    },

    #[error("No on-call group found under {base_dn} matching {filter}")]
    GroupNotFound { base_dn: String, filter: String },

    /// Binding with the update credentials failed
    #[error("Unable to bind to directory as {dn}: {source}")]
    DirectoryAuth {
        dn: String,
        #[source]
        source: DirectoryError,
    },

    /// A remove or add modify call failed
    #[error("Directory modify failed during {phase} phase on {group_dn}: {source}")]
    DirectoryModify {
        phase: ModifyPhase,
        group_dn: String,
        #[source]
        source: DirectoryError,
    },

    #[error("Refusing to empty {group_dn}: nobody on the watched schedules resolved to a directory user")]
    EmptyDesiredSet { group_dn: String },
}

impl ReconcileError {
    /// Phase of a failed modify call, if this is one
    pub fn modify_phase(&self) -> Option<ModifyPhase> {
        match self {
            Self::DirectoryModify { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
