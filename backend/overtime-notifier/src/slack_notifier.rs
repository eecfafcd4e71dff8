// src/slack_notifier.rs
use async_trait::async_trait;
use slack_morphism::prelude::*;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Failed to set up Slack client: {0}")]
    ClientSetup(String),
    #[error("Recipient lookup failed for {recipient}: {message}")]
    Lookup { recipient: String, message: String },
    #[error("Message delivery failed for {recipient}: {message}")]
    Delivery { recipient: String, message: String },
}

/// Backend-specific id of a resolved recipient (a Slack user id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientHandle(pub String);

/// Backend-specific id of a posted message (a Slack `ts`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn resolve_recipient(&self, email: &str) -> Result<RecipientHandle, NotificationError>;
    async fn send(&self, recipient: &RecipientHandle, text: &str)
        -> Result<MessageId, NotificationError>;
}

#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub delivered: Vec<(String, MessageId)>,
    pub failed: Vec<(String, NotificationError)>,
}

/// Sends `text` to each recipient independently; a failure never stops the loop.
pub async fn dispatch_report(
    dispatcher: &dyn Dispatcher,
    recipients: &[String],
    text: &str,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for recipient in recipients {
        let result = match dispatcher.resolve_recipient(recipient).await {
            Ok(handle) => dispatcher.send(&handle, text).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(message_id) => {
                info!("Notification sent to {} (ts={})", recipient, message_id.0);
                summary.delivered.push((recipient.clone(), message_id));
            }
            Err(e) => {
                error!("Notification to {} failed: {}", recipient, e);
                summary.failed.push((recipient.clone(), e));
            }
        }
    }

    summary
}

// --- Slack Dispatcher ---

pub struct SlackNotifier {
    client: SlackHyperClient,
    token: SlackApiToken,
}

impl SlackNotifier {
    pub fn new(bot_token: &str) -> Result<Self, NotificationError> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| NotificationError::ClientSetup(e.to_string()))?;
        Ok(Self {
            client: SlackClient::new(connector),
            token: SlackApiToken::new(bot_token.to_string().into()),
        })
    }
}

#[async_trait]
impl Dispatcher for SlackNotifier {
    async fn resolve_recipient(&self, email: &str) -> Result<RecipientHandle, NotificationError> {
        let session = self.client.open_session(&self.token);
        let response = session
            .users_lookup_by_email(&SlackApiUsersLookupByEmailRequest::new(EmailAddress(
                email.to_string(),
            )))
            .await
            .map_err(|e| NotificationError::Lookup {
                recipient: email.to_string(),
                message: e.to_string(),
            })?;
        Ok(RecipientHandle(response.user.id.0))
    }

    async fn send(
        &self,
        recipient: &RecipientHandle,
        text: &str,
    ) -> Result<MessageId, NotificationError> {
        let session = self.client.open_session(&self.token);
        let delivery_error = |message: String| NotificationError::Delivery {
            recipient: recipient.0.clone(),
            message,
        };

        // DM channel with the user
        let conversation = session
            .conversations_open(
                &SlackApiConversationsOpenRequest::new()
                    .with_users(vec![SlackUserId(recipient.0.clone())]),
            )
            .await
            .map_err(|e| delivery_error(format!("opening DM channel: {}", e)))?;

        let posted = session
            .chat_post_message(&SlackApiChatPostMessageRequest::new(
                conversation.channel.id,
                SlackMessageContent::new().with_text(text.to_string()),
            ))
            .await
            .map_err(|e| delivery_error(format!("posting message: {}", e)))?;

        Ok(MessageId(posted.ts.0))
    }
}
