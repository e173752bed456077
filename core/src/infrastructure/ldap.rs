// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! LDAP Directory Adapter
//!
//! Implements [`DirectoryClient`] on top of an `ldap3` async session.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Open a (StartTLS-wrapped) session, search, bind and modify
//! - **Integration:** Directory server → `LdapDirectory` → identity mapper,
//!   group reader and group updater
//!
//! The connection is opened unauthenticated; searches run anonymously until
//! the updater binds with the update user. The `ldap3` driver future is
//! spawned on the tokio runtime and the [`Ldap`] handle is cloned per
//! operation.

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Mod, Scope, SearchEntry};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::domain::config::LdapSettings;
use crate::domain::directory::{AttributeModification, DirectoryClient, DirectoryEntry, DirectoryError};

const RC_SUCCESS: u32 = 0;
const RC_INVALID_CREDENTIALS: u32 = 49;

pub struct LdapDirectory {
    ldap: Ldap,
    url: String,
}

impl LdapDirectory {
    /// Connect to the server described by `settings`
    pub async fn connect(settings: &LdapSettings) -> Result<Self, DirectoryError> {
        let url = server_url(&settings.server, settings.port);

        let mut conn_settings = LdapConnSettings::new().set_starttls(settings.starttls);
        if let Some(ca_file) = &settings.root_ca_file {
            conn_settings = conn_settings.set_connector(tls_connector(ca_file)?);
        }

        debug!(url = %url, starttls = settings.starttls, "Connecting to LDAP server");

        let (conn, ldap) = LdapConnAsync::with_settings(conn_settings, &url)
            .await
            .map_err(|e| DirectoryError::Connection(format!("{}: {}", url, e)))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        info!(url = %url, "Connected to LDAP");

        Ok(Self { ldap, url })
    }
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    #[instrument(skip(self, attributes), fields(url = %self.url))]
    async fn search(
        &self,
        base_dn: &str,
        filter: &str,
        attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let mut ldap = self.ldap.clone();
        let result = ldap
            .search(base_dn, Scope::Subtree, filter, attributes.to_vec())
            .await
            .map_err(|e| DirectoryError::Connection(e.to_string()))?;

        let (entries, _) = result.success().map_err(|e| match e {
            ldap3::LdapError::LdapResult { result } => operation_error(&result),
            other => DirectoryError::Other(other.to_string()),
        })?;

        debug!(count = entries.len(), "LDAP search returned");

        Ok(entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(to_directory_entry)
            .collect())
    }

    #[instrument(skip(self, password), fields(url = %self.url))]
    async fn bind(&self, dn: &str, password: &str) -> Result<(), DirectoryError> {
        let mut ldap = self.ldap.clone();
        let result = ldap
            .simple_bind(dn, password)
            .await
            .map_err(|e| DirectoryError::Connection(e.to_string()))?;

        match result.rc {
            RC_SUCCESS => Ok(()),
            RC_INVALID_CREDENTIALS => Err(DirectoryError::InvalidCredentials(dn.to_string())),
            _ => Err(operation_error(&result)),
        }
    }

    #[instrument(skip(self, modification), fields(url = %self.url, change = %modification))]
    async fn modify(&self, dn: &str, modification: &AttributeModification) -> Result<(), DirectoryError> {
        let mut ldap = self.ldap.clone();
        let result = ldap
            .modify(dn, vec![to_ldap_mod(modification)])
            .await
            .map_err(|e| DirectoryError::Connection(e.to_string()))?;

        if result.rc != RC_SUCCESS {
            return Err(operation_error(&result));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), DirectoryError> {
        let mut ldap = self.ldap.clone();
        ldap.unbind()
            .await
            .map_err(|e| DirectoryError::Connection(e.to_string()))
    }
}

fn server_url(server: &str, port: u16) -> String {
    format!("ldap://{}:{}", server, port)
}

fn tls_connector(ca_file: &Path) -> Result<native_tls::TlsConnector, DirectoryError> {
    let pem = std::fs::read(ca_file).map_err(|e| {
        DirectoryError::Connection(format!("Unable to read root CA {}: {}", ca_file.display(), e))
    })?;
    let certificate = native_tls::Certificate::from_pem(&pem).map_err(|e| {
        DirectoryError::Connection(format!("Invalid root CA {}: {}", ca_file.display(), e))
    })?;

    native_tls::TlsConnector::builder()
        .add_root_certificate(certificate)
        .build()
        .map_err(|e| DirectoryError::Connection(format!("TLS setup failed: {}", e)))
}

fn operation_error(result: &LdapResult) -> DirectoryError {
    DirectoryError::Operation {
        code: result.rc,
        message: result.text.clone(),
    }
}

fn to_ldap_mod(modification: &AttributeModification) -> Mod<String> {
    let attribute = modification.attribute().to_string();
    let values: HashSet<String> = modification.values().iter().cloned().collect();
    match modification {
        AttributeModification::Add { .. } => Mod::Add(attribute, values),
        AttributeModification::Delete { .. } => Mod::Delete(attribute, values),
    }
}

fn to_directory_entry(entry: SearchEntry) -> DirectoryEntry {
    DirectoryEntry {
        dn: entry.dn,
        attributes: entry.attrs,
    }
}
