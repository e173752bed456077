// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Identity Mapper
//!
//! Resolves an on-call email to the uid used as a group member value.
//!
//! Exactly one directory entry is expected per email. Zero matches abort the
//! run; several matches are handled according to [`AmbiguityPolicy`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::config::{AmbiguityPolicy, LdapSettings};
use crate::domain::directory::{equality_filter, DirectoryClient};
use crate::domain::errors::ReconcileError;

/// Capability used by the reconciler to turn an email into a uid
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, email: &str) -> Result<String, ReconcileError>;
}

pub struct IdentityMapper {
    directory: Arc<dyn DirectoryClient>,
    base_dn: String,
    mail_attribute: String,
    uid_attribute: String,
    policy: AmbiguityPolicy,
}

impl IdentityMapper {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        base_dn: impl Into<String>,
        mail_attribute: impl Into<String>,
        uid_attribute: impl Into<String>,
        policy: AmbiguityPolicy,
    ) -> Self {
        Self {
            directory,
            base_dn: base_dn.into(),
            mail_attribute: mail_attribute.into(),
            uid_attribute: uid_attribute.into(),
            policy,
        }
    }

    pub fn from_settings(directory: Arc<dyn DirectoryClient>, settings: &LdapSettings) -> Self {
        Self::new(
            directory,
            settings.base_dn.clone(),
            settings.mail_attribute.clone(),
            settings.uid_attribute.clone(),
            settings.identity_ambiguity,
        )
    }
}

#[async_trait]
impl IdentityResolver for IdentityMapper {
    async fn resolve(&self, email: &str) -> Result<String, ReconcileError> {
        let filter = equality_filter(&self.mail_attribute, email);

        let entries = self
            .directory
            .search(&self.base_dn, &filter, &[self.uid_attribute.as_str()])
            .await
            .map_err(|source| ReconcileError::DirectoryQuery {
                context: format!("looking up {}", filter),
                source,
            })?;

        let entry = match (entries.len(), self.policy) {
            (0, _) => {
                return Err(ReconcileError::IdentityNotFound {
                    identity: email.to_string(),
                    attribute: self.mail_attribute.clone(),
                })
            }
            (1, _) | (_, AmbiguityPolicy::FirstMatch) => {
                if entries.len() > 1 {
                    warn!(
                        "{} directory entries match {}, using the first ({})",
                        entries.len(),
                        filter,
                        entries[0].dn
                    );
                }
                &entries[0]
            }
            (count, AmbiguityPolicy::Fail) => {
                return Err(ReconcileError::AmbiguousIdentity {
                    identity: email.to_string(),
                    attribute: self.mail_attribute.clone(),
                    count,
                })
            }
        };

        let uid = entry
            .first_value(&self.uid_attribute)
            .ok_or_else(|| ReconcileError::MissingUidAttribute {
                dn: entry.dn.clone(),
                attribute: self.uid_attribute.clone(),
            })?;

        debug!(email = %email, uid = %uid, "Resolved on-call identity");
        Ok(uid.to_string())
    }
}
