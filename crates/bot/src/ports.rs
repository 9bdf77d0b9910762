//! Seams between the command handler and the outside world.

use std::path::PathBuf;

use async_trait::async_trait;
use flowchart::{AttemptIndex, ChatId, MessageId, UserId};

use crate::{DiagramFetchError, MessengerError};

/// A text message received from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Chat the message was posted in.
    pub chat_id: ChatId,
    /// Id of the message, used to reply to it.
    pub message_id: MessageId,
    /// Sender; key of the rate-limit map.
    pub user_id: UserId,
    /// Full message text, command included.
    pub text: String,
}

/// A message the bot sent, kept so it can be deleted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    /// Chat the message was posted in.
    pub chat_id: ChatId,
    /// Id assigned by the platform.
    pub message_id: MessageId,
}

/// An image on disk with its caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Local file to upload.
    pub path: PathBuf,
    /// Caption shown under the image.
    pub caption: String,
}

/// The chat platform, as seen by the command handler.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Replies to `to` with plain text.
    async fn reply(&self, to: &IncomingMessage, text: &str) -> Result<SentMessage, MessengerError>;

    /// Replies to `to` with one album containing all `photos`.
    async fn reply_photos(
        &self,
        to: &IncomingMessage,
        photos: &[Photo],
    ) -> Result<(), MessengerError>;

    /// Deletes a message previously sent by the bot.
    async fn delete(&self, message: &SentMessage) -> Result<(), MessengerError>;
}

/// The diagram generation service, as seen by the command handler.
#[async_trait]
pub trait DiagramSource: Send + Sync {
    /// Requests one flowchart for `algorithm` and returns the image bytes.
    ///
    /// `attempt` is informational (logging); every attempt sends the same
    /// request and relies on the model producing a different variant.
    async fn fetch(
        &self,
        algorithm: &str,
        attempt: AttemptIndex,
    ) -> Result<Vec<u8>, DiagramFetchError>;
}
