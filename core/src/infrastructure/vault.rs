// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Vault Secret Provider
//!
//! Reads the run credentials from a Vault KV (version 1) secret.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Resolve a Vault token, read one secret, hand back [`Secrets`]
//! - **Integration:** Vault → `VaultSecretProvider` → CLI wiring
//!
//! The secret is expected to hold `pdAuthToken` and `modUserPW`, plus
//! `slackAuthToken` when notifications are enabled.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};

use crate::domain::config::VaultSettings;
use crate::domain::secrets::{SecretProvider, Secrets, SecretsError};

const TOKEN_ENV: &str = "VAULT_TOKEN";

#[derive(Debug, Deserialize)]
struct StoredSecrets {
    #[serde(rename = "pdAuthToken")]
    pd_auth_token: String,
    #[serde(rename = "modUserPW")]
    mod_user_pw: String,
    #[serde(rename = "slackAuthToken", default)]
    slack_auth_token: Option<String>,
}

impl From<StoredSecrets> for Secrets {
    fn from(stored: StoredSecrets) -> Self {
        Secrets {
            scheduling_token: stored.pd_auth_token,
            directory_password: stored.mod_user_pw,
            messaging_token: stored.slack_auth_token.filter(|t| !t.is_empty()),
        }
    }
}

pub struct VaultSecretProvider {
    address: String,
    token_path: Option<PathBuf>,
    secret_path: String,
}

impl VaultSecretProvider {
    pub fn from_settings(settings: &VaultSettings) -> Self {
        Self {
            address: settings.server.clone(),
            token_path: settings.token_path.clone(),
            secret_path: settings.secret_path.clone(),
        }
    }

    fn client(&self, token: String) -> Result<VaultClient, SecretsError> {
        if self.address.is_empty() {
            return Err(SecretsError::Client(
                "no server address: set vault.server or VAULT_ADDR".to_string(),
            ));
        }

        let settings = VaultClientSettingsBuilder::default()
            .address(self.address.as_str())
            .token(token)
            .build()
            .map_err(|e| SecretsError::Client(e.to_string()))?;

        VaultClient::new(settings).map_err(|e| SecretsError::Client(e.to_string()))
    }
}

#[async_trait]
impl SecretProvider for VaultSecretProvider {
    async fn fetch(&self) -> Result<Secrets, SecretsError> {
        let (mount, path) = split_secret_path(&self.secret_path)?;
        let token = resolve_token(self.token_path.as_deref(), |key| std::env::var(key).ok())?;
        let client = self.client(token)?;

        debug!(address = %self.address, mount = %mount, path = %path, "Reading secrets from Vault");

        let stored: StoredSecrets = vaultrs::kv1::get(&client, mount, path)
            .await
            .map_err(|e| SecretsError::Read {
                path: self.secret_path.clone(),
                message: e.to_string(),
            })?;

        Ok(stored.into())
    }
}

/// Split `<mount>/<path>` at the first slash
fn split_secret_path(secret_path: &str) -> Result<(&str, &str), SecretsError> {
    let trimmed = secret_path.trim_matches('/');
    match trimmed.split_once('/') {
        Some((mount, path)) if !mount.is_empty() && !path.is_empty() => Ok((mount, path)),
        _ => Err(SecretsError::InvalidPath(secret_path.to_string())),
    }
}

/// Token from `token_path` when set, otherwise from the environment
fn resolve_token(
    token_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, SecretsError> {
    if let Some(path) = token_path {
        let raw = std::fs::read_to_string(path).map_err(|e| SecretsError::TokenFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(SecretsError::TokenFile {
                path: path.display().to_string(),
                message: "file is empty".to_string(),
            });
        }
        return Ok(token.to_string());
    }

    env(TOKEN_ENV)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(SecretsError::MissingToken)
}
