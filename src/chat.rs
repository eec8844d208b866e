use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::ChatError;
use crate::models::slack::{Attachment, PostMessageRequest, PostMessageResponse};

/// Delivers replies to a chat channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatPoster: Send + Sync {
    async fn post_attachment(&self, channel: &str, attachment: &Attachment)
        -> Result<(), ChatError>;
}

/// Client for the Slack Web API
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: Client,
    endpoint: String,
    bot_token: String,
}

impl SlackClient {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_endpoint("https://slack.com/api", bot_token)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        }
    }
}

#[async_trait]
impl ChatPoster for SlackClient {
    async fn post_attachment(
        &self,
        channel: &str,
        attachment: &Attachment,
    ) -> Result<(), ChatError> {
        let url = format!("{}/chat.postMessage", self.endpoint);
        let request = PostMessageRequest {
            channel,
            text: "",
            attachments: vec![attachment],
        };

        info!("Posting message to channel {}", channel);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.bot_token)
            .json(&request)
            .send()
            .await?;
        debug!("Chat API responded with status: {}", res.status());

        let response = res.error_for_status()?.json::<PostMessageResponse>().await?;
        if !response.ok {
            return Err(ChatError::Api(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}
