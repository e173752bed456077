// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Secrets Domain Interface
//
// Credentials are fetched once, before the reconciliation pass starts, and
// handed to the adapters that need them. The core never talks to the secret
// store itself. Vault implementation in infrastructure/vault.rs.

use async_trait::async_trait;
use std::fmt;

/// Credentials required for one run
#[derive(Clone)]
pub struct Secrets {
    /// PagerDuty API token
    pub scheduling_token: String,

    /// Password for the directory update user
    pub directory_password: String,

    /// Slack token; only required when notifications are enabled
    pub messaging_token: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("scheduling_token", &"***REDACTED***")
            .field("directory_password", &"***REDACTED***")
            .field(
                "messaging_token",
                &self.messaging_token.as_ref().map(|_| "***REDACTED***"),
            )
            .finish()
    }
}

#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn fetch(&self) -> Result<Secrets, SecretsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("No secret store token: set vault.token_path or VAULT_TOKEN")]
    MissingToken,

    #[error("Unable to read secret store token from {path}: {message}")]
    TokenFile { path: String, message: String },

    #[error("Invalid secret path '{0}': expected <mount>/<path>")]
    InvalidPath(String),

    #[error("Secret store client error: {0}")]
    Client(String),

    #[error("Unable to read secrets from {path}: {message}")]
    Read { path: String, message: String },
}
