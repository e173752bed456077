// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Membership Reconciler
//!
//! Derives the desired membership from the on-call entries and diffs it
//! against the current group.
//!
//! # Flow
//!
//! 1. Deduplicate the on-call emails (first occurrence wins)
//! 2. Map each email to a uid via the [`IdentityResolver`]
//! 3. Collect uids into a normalized [`MembershipSet`]
//! 4. Diff current vs desired in both directions
//!
//! A mapping failure aborts before any diff is produced. Equal sets yield
//! `changed = false`, which is what keeps repeated runs from touching the
//! directory.

use std::collections::HashSet;
use tracing::info;

use super::identity_mapper::IdentityResolver;
use crate::domain::errors::ReconcileError;
use crate::domain::membership::{MembershipSet, ReconciliationOutcome};
use crate::domain::schedule::OnCallEntry;

pub struct MembershipReconciler<'a> {
    resolver: &'a dyn IdentityResolver,
}

impl<'a> MembershipReconciler<'a> {
    pub fn new(resolver: &'a dyn IdentityResolver) -> Self {
        Self { resolver }
    }

    pub async fn reconcile(
        &self,
        current: MembershipSet,
        on_call: &[OnCallEntry],
    ) -> Result<ReconciliationOutcome, ReconcileError> {
        let mut seen = HashSet::new();
        let mut desired = MembershipSet::new();

        for entry in on_call {
            if !seen.insert(entry.external_identity.as_str()) {
                continue;
            }
            let uid = self.resolver.resolve(&entry.external_identity).await?;
            desired.insert(uid);
        }

        info!("New on call (PagerDuty): {}", desired);

        let outcome = ReconciliationOutcome::new(current, desired);
        if outcome.changed {
            info!(
                to_add = %outcome.diff.to_add,
                to_remove = %outcome.diff.to_remove,
                "LDAP and PagerDuty differ"
            );
        } else {
            info!("LDAP and PagerDuty match, doing nothing");
        }

        Ok(outcome)
    }
}
