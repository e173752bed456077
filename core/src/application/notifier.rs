// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Change Notifier
//!
//! Announces a membership change in a chat channel. Delivery problems are
//! logged and swallowed; they never fail the run.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::membership::ReconciliationOutcome;
use crate::domain::messaging::MessagingProvider;

pub struct ChangeNotifier {
    messaging: Option<Arc<dyn MessagingProvider>>,
    channel: String,
    server: String,
    group_name: String,
}

impl ChangeNotifier {
    /// Notifier that posts to `channel`
    pub fn new(
        messaging: Arc<dyn MessagingProvider>,
        channel: impl Into<String>,
        server: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            messaging: Some(messaging),
            channel: channel.into(),
            server: server.into(),
            group_name: group_name.into(),
        }
    }

    /// Notifier that never posts
    pub fn disabled() -> Self {
        Self {
            messaging: None,
            channel: String::new(),
            server: String::new(),
            group_name: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.messaging.is_some()
    }

    pub fn format_message(&self, outcome: &ReconciliationOutcome) -> String {
        format!(
            "Updated `{}` on {}: from {{{}}} to {{{}}}",
            self.group_name, self.server, outcome.previous, outcome.desired
        )
    }

    /// Returns true when a message was delivered
    pub async fn notify(&self, outcome: &ReconciliationOutcome) -> bool {
        let Some(messaging) = &self.messaging else {
            return false;
        };
        if !outcome.changed {
            return false;
        }

        let text = self.format_message(outcome);
        match messaging.post_message(&self.channel, &text).await {
            Ok(()) => {
                info!(channel = %self.channel, "Posted change notification");
                true
            }
            Err(e) => {
                warn!("Warning: got {} back from the messaging API", e);
                false
            }
        }
    }
}
