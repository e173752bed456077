// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Slack Messaging Adapter
//!
//! Posts change notifications through the Web API `chat.postMessage` method.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::messaging::{MessagingError, MessagingProvider};

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    as_user: bool,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackClient {
    api_url: String,
    token: String,
    client: Client,
}

impl SlackClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MessagingProvider for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), MessagingError> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&PostMessageRequest {
                channel,
                text,
                as_user: true,
            })
            .send()
            .await
            .map_err(|e| MessagingError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(MessagingError::Authentication(format!(
                    "HTTP {}",
                    response.status()
                )));
            }
            status if !status.is_success() => {
                return Err(MessagingError::Api(format!("HTTP {}", status)));
            }
            _ => {}
        }

        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| MessagingError::Api(format!("unexpected response: {}", e)))?;

        if body.ok {
            Ok(())
        } else {
            Err(MessagingError::Api(
                body.error.unwrap_or_else(|| "unknown_error".to_string()),
            ))
        }
    }
}
