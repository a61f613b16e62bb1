use anyhow::{Context, Result};
use serde_json::Value;
use teloxide::types::{ChatAction, ChatId};
use tracing::{debug, info, warn};

use crate::persona::Persona;
use crate::platform::Messenger;
use crate::random::RandomSource;
use crate::replies;

/// Chance that any non-command message is answered with a photo.
pub const PHOTO_PROBABILITY: f64 = 0.15;

/// Chance of a follow-up question after a text reply.
pub const FOLLOW_UP_PROBABILITY: f64 = 0.3;

/// The parts of an inbound update the bot acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub text: String,
}

/// What the bot did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Welcomed,
    Photo,
    Text { follow_up: bool },
}

/// Extract the message from a raw webhook body.
///
/// Bodies that are not JSON, or carry no message object, yield `Ok(None)`:
/// the platform gets an acknowledgement and nothing is sent. A message
/// object without a chat id is an error.
pub fn parse_update(body: &[u8]) -> Result<Option<IncomingMessage>> {
    let update: Value = match serde_json::from_slice(body) {
        Ok(update) => update,
        Err(e) => {
            debug!("Ignoring non-JSON update: {}", e);
            return Ok(None);
        }
    };

    let message = match update.get("message") {
        Some(message) if message.is_object() => message,
        _ => return Ok(None),
    };

    let chat_id = message
        .get("chat")
        .and_then(|chat| chat.get("id"))
        .and_then(Value::as_i64)
        .context("message has no chat id")?;

    let text = message
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(Some(IncomingMessage {
        chat_id: ChatId(chat_id),
        text,
    }))
}

/// Parse a webhook body and reply to it.
pub async fn handle_update(
    messenger: &dyn Messenger,
    persona: &Persona,
    rng: &mut dyn RandomSource,
    body: &[u8],
) -> Result<Outcome> {
    match parse_update(body)? {
        Some(msg) => handle_message(messenger, persona, rng, &msg).await,
        None => Ok(Outcome::Ignored),
    }
}

pub async fn handle_message(
    messenger: &dyn Messenger,
    persona: &Persona,
    rng: &mut dyn RandomSource,
    msg: &IncomingMessage,
) -> Result<Outcome> {
    info!("Message from chat {}: {}", msg.chat_id, msg.text);

    if persona.is_start_command(&msg.text) {
        show_action(messenger, msg.chat_id, ChatAction::Typing).await;
        messenger
            .send_message(msg.chat_id, &persona.welcome_text())
            .await?;
        return Ok(Outcome::Welcomed);
    }

    // The random gate is drawn first so every message consumes it.
    let random_photo = rng.chance(PHOTO_PROBABILITY);
    if random_photo || persona.mentions_photo(&msg.text) {
        show_action(messenger, msg.chat_id, ChatAction::UploadPhoto).await;
        let photo_url = rng.pick(&persona.photo_urls).to_string();
        let caption = replies::photo_caption(persona, rng);
        debug!("Sending photo {} to chat {}", photo_url, msg.chat_id);
        messenger
            .send_photo(msg.chat_id, &photo_url, &caption)
            .await?;
        return Ok(Outcome::Photo);
    }

    show_action(messenger, msg.chat_id, ChatAction::Typing).await;
    let reply = replies::select_reply(persona, &msg.text, rng);
    messenger.send_message(msg.chat_id, &reply).await?;

    let follow_up = rng.chance(FOLLOW_UP_PROBABILITY);
    if follow_up {
        show_action(messenger, msg.chat_id, ChatAction::Typing).await;
        let question = rng.pick(&persona.follow_ups).to_string();
        messenger.send_message(msg.chat_id, &question).await?;
    }

    Ok(Outcome::Text { follow_up })
}

/// Chat actions are cosmetic; a failed one never aborts the reply.
async fn show_action(messenger: &dyn Messenger, chat_id: ChatId, action: ChatAction) {
    if let Err(e) = messenger.send_chat_action(chat_id, action).await {
        warn!("Chat action {:?} failed for chat {}: {:#}", action, chat_id, e);
    }
}
