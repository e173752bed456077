// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Messaging Provider Domain Interface
//
// The change notifier only needs to drop a line of text into a channel.
// Slack implementation in infrastructure/slack.rs.

use async_trait::async_trait;

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Post `text` to `channel`
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), MessagingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error: {0}")]
    Api(String),
}
