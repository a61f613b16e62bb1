pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{ChatAction, ChatId};

/// One-way notifications to the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send an HTML-formatted text message.
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Send a photo by URL with a caption.
    async fn send_photo(&self, chat_id: ChatId, photo_url: &str, caption: &str) -> Result<()>;

    /// Show a transient indicator such as "typing". Callers treat failures
    /// as non-fatal and discard them.
    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;
}
