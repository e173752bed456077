// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Reads the current members of the on-call group.

use std::sync::Arc;
use tracing::info;

use crate::domain::config::LdapSettings;
use crate::domain::directory::DirectoryClient;
use crate::domain::errors::ReconcileError;
use crate::domain::membership::MembershipSet;

pub struct GroupReader {
    directory: Arc<dyn DirectoryClient>,
    base_dn: String,
    group_filter: String,
    member_attribute: String,
}

impl GroupReader {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        base_dn: impl Into<String>,
        group_filter: impl Into<String>,
        member_attribute: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            base_dn: base_dn.into(),
            group_filter: group_filter.into(),
            member_attribute: member_attribute.into(),
        }
    }

    pub fn from_settings(directory: Arc<dyn DirectoryClient>, settings: &LdapSettings) -> Self {
        Self::new(
            directory,
            settings.base_dn.clone(),
            settings.group_filter.clone(),
            settings.member_attribute.clone(),
        )
    }

    /// Member values of the first entry matching the group filter
    pub async fn current_members(&self) -> Result<MembershipSet, ReconcileError> {
        let entries = self
            .directory
            .search(&self.base_dn, &self.group_filter, &[self.member_attribute.as_str()])
            .await
            .map_err(|source| ReconcileError::DirectoryQuery {
                context: format!("reading group {}", self.group_filter),
                source,
            })?;

        let group = entries.first().ok_or_else(|| ReconcileError::GroupNotFound {
            base_dn: self.base_dn.clone(),
            filter: self.group_filter.clone(),
        })?;

        let members: MembershipSet = group.values(&self.member_attribute).iter().cloned().collect();
        info!("Currently on call (LDAP): {}", members);
        Ok(members)
    }
}
