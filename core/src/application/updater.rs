// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Group Membership Updater
//!
//! Applies a [`MembershipDiff`] to the on-call group as a two-step saga:
//!
//! 1. Bind with the update credentials
//! 2. Remove `to_remove` (skipped when empty)
//! 3. Add `to_add` (skipped when empty)
//!
//! The directory has no multi-modify transaction. If step 2 succeeds and
//! step 3 fails the group holds fewer members than either the old or the new
//! set; the next run sees the missing uids in `to_add` and repairs it. A
//! failure in step 2 leaves step 3 unattempted. There is no rollback.

use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::domain::directory::{AttributeModification, DirectoryClient};
use crate::domain::errors::{ModifyPhase, ReconcileError};
use crate::domain::membership::{MembershipDiff, MembershipSet};

/// Credentials used to bind before modifying the group
#[derive(Clone)]
pub struct BindCredentials {
    pub dn: String,
    pub password: String,
}

impl BindCredentials {
    pub fn new(dn: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BindCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindCredentials")
            .field("dn", &self.dn)
            .field("password", &"***REDACTED***")
            .finish()
    }
}

/// What the updater actually changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    pub removed: MembershipSet,
    pub added: MembershipSet,
}

pub struct GroupMembershipUpdater {
    directory: Arc<dyn DirectoryClient>,
    group_dn: String,
    member_attribute: String,
    credentials: BindCredentials,
}

impl GroupMembershipUpdater {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        group_dn: impl Into<String>,
        member_attribute: impl Into<String>,
        credentials: BindCredentials,
    ) -> Self {
        Self {
            directory,
            group_dn: group_dn.into(),
            member_attribute: member_attribute.into(),
            credentials,
        }
    }

    pub async fn apply(&self, diff: &MembershipDiff) -> Result<AppliedChanges, ReconcileError> {
        let mut applied = AppliedChanges::default();
        if diff.is_empty() {
            return Ok(applied);
        }

        info!("Replacing LDAP with PagerDuty information");

        self.directory
            .bind(&self.credentials.dn, &self.credentials.password)
            .await
            .map_err(|source| ReconcileError::DirectoryAuth {
                dn: self.credentials.dn.clone(),
                source,
            })?;

        if !diff.to_remove.is_empty() {
            info!("LDAP: Deleting old UIDs: {}", diff.to_remove);
            let modification = AttributeModification::Delete {
                attribute: self.member_attribute.clone(),
                values: diff.to_remove.as_set().clone(),
            };
            self.modify(ModifyPhase::Remove, &modification).await?;
            applied.removed = diff.to_remove.clone();
        }

        if !diff.to_add.is_empty() {
            info!("LDAP: Adding new UIDs: {}", diff.to_add);
            let modification = AttributeModification::Add {
                attribute: self.member_attribute.clone(),
                values: diff.to_add.as_set().clone(),
            };
            self.modify(ModifyPhase::Add, &modification).await?;
            applied.added = diff.to_add.clone();
        }

        Ok(applied)
    }

    async fn modify(
        &self,
        phase: ModifyPhase,
        modification: &AttributeModification,
    ) -> Result<(), ReconcileError> {
        self.directory
            .modify(&self.group_dn, modification)
            .await
            .map_err(|source| ReconcileError::DirectoryModify {
                phase,
                group_dn: self.group_dn.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::{DirectoryCall, FakeDirectory};

    const GROUP_DN: &str = "cn=lg-oncall,ou=groups,dc=example,dc=com";
    const MOD_DN: &str = "cn=deputize,ou=services,dc=example,dc=com";

    fn set(members: &[&str]) -> MembershipSet {
        members.iter().copied().collect()
    }

    fn updater(directory: Arc<FakeDirectory>) -> GroupMembershipUpdater {
        GroupMembershipUpdater::new(
            directory,
            GROUP_DN,
            "memberUid",
            BindCredentials::new(MOD_DN, "s3cret"),
        )
    }

    fn group(members: &[&str]) -> Arc<FakeDirectory> {
        Arc::new(FakeDirectory::new().with_group(GROUP_DN, "lg-oncall", members))
    }

    #[tokio::test]
    async fn test_remove_then_add() {
        let directory = group(&["alice", "bob"]);
        let diff = MembershipDiff::between(&set(&["alice", "bob"]), &set(&["bob", "carol"]));

        let applied = updater(directory.clone()).apply(&diff).await.unwrap();

        assert_eq!(applied.removed, set(&["alice"]));
        assert_eq!(applied.added, set(&["carol"]));
        assert_eq!(
            directory.calls(),
            vec![
                DirectoryCall::Bind(MOD_DN.to_string()),
                DirectoryCall::Modify(GROUP_DN.to_string(), "delete memberUid: alice".to_string()),
                DirectoryCall::Modify(GROUP_DN.to_string(), "add memberUid: carol".to_string()),
            ]
        );
        assert_eq!(directory.group_members(GROUP_DN), set(&["bob", "carol"]));
    }

    #[tokio::test]
    async fn test_empty_group_skips_removal() {
        let directory = group(&[]);
        let diff = MembershipDiff::between(&MembershipSet::new(), &set(&["dave"]));

        updater(directory.clone()).apply(&diff).await.unwrap();

        assert_eq!(
            directory.calls(),
            vec![
                DirectoryCall::Bind(MOD_DN.to_string()),
                DirectoryCall::Modify(GROUP_DN.to_string(), "add memberUid: dave".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_diff_does_nothing() {
        let directory = group(&["alice"]);
        let applied = updater(directory.clone())
            .apply(&MembershipDiff::default())
            .await
            .unwrap();

        assert_eq!(applied, AppliedChanges::default());
        assert!(directory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bind_failure_is_auth_error() {
        let directory = Arc::new(
            FakeDirectory::new()
                .with_group(GROUP_DN, "lg-oncall", &["alice"])
                .failing_bind(),
        );
        let diff = MembershipDiff::between(&set(&["alice"]), &set(&["bob"]));

        let err = updater(directory.clone()).apply(&diff).await.unwrap_err();

        assert!(matches!(err, ReconcileError::DirectoryAuth { ref dn, .. } if dn == MOD_DN));
        assert_eq!(directory.calls(), vec![DirectoryCall::Bind(MOD_DN.to_string())]);
    }

    #[tokio::test]
    async fn test_remove_failure_skips_add() {
        let directory = Arc::new(
            FakeDirectory::new()
                .with_group(GROUP_DN, "lg-oncall", &["alice"])
                .failing_delete(),
        );
        let diff = MembershipDiff::between(&set(&["alice"]), &set(&["bob"]));

        let err = updater(directory.clone()).apply(&diff).await.unwrap_err();

        assert_eq!(err.modify_phase(), Some(ModifyPhase::Remove));
        assert!(!directory
            .calls()
            .iter()
            .any(|c| matches!(c, DirectoryCall::Modify(_, m) if m.starts_with("add"))));
        assert_eq!(directory.group_members(GROUP_DN), set(&["alice"]));
    }

    #[tokio::test]
    async fn test_add_failure_leaves_partial_state() {
        let directory = Arc::new(
            FakeDirectory::new()
                .with_group(GROUP_DN, "lg-oncall", &["alice"])
                .failing_add(),
        );
        let diff = MembershipDiff::between(&set(&["alice"]), &set(&["bob"]));

        let err = updater(directory.clone()).apply(&diff).await.unwrap_err();

        assert_eq!(err.modify_phase(), Some(ModifyPhase::Add));
        assert!(directory.group_members(GROUP_DN).is_empty());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let rendered = format!("{:?}", BindCredentials::new(MOD_DN, "s3cret"));
        assert!(!rendered.contains("s3cret"));
    }
}
