pub mod telegram;

use serde::Deserialize;
use teloxide::types::InlineKeyboardMarkup;

/// A chat message delivered by the webhook
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    /// Missing when the update has no usable `chat.id`
    pub chat_id: Option<i64>,
    /// The message text
    pub text: String,
}

/// A message to send back to a chat, built per command and sent once
#[derive(Debug, Clone)]
pub struct OutboundNotification {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: Option<String>,
    pub markup: Option<InlineKeyboardMarkup>,
}

/// Webhook update body, kept as raw JSON. Providers send many update kinds
/// and only `message.text` and `message.chat.id` matter here, so a field of
/// an unexpected type must not reject the whole body.
#[derive(Debug, Deserialize, Default)]
#[serde(transparent)]
pub struct WebhookUpdate(serde_json::Value);

impl WebhookUpdate {
    /// Returns the message if its text is a string. The chat id is read
    /// separately so a command without a recipient can still be recognised.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.0.get("message")?;
        let text = message.get("text")?.as_str()?.to_string();
        let chat_id = message
            .get("chat")
            .and_then(|chat| chat.get("id"))
            .and_then(serde_json::Value::as_i64);
        Some(IncomingMessage { chat_id, text })
    }
}
