//! Loader for Gmail API message dumps (`users.messages.get`, `format=full`).

use std::path::Path;

use serde::Deserialize;

use crate::error::{OrderScanError, Result};
use crate::model::message::RawMessage;

/// A file holds either one message or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawMessage>),
    One(Box<RawMessage>),
}

/// Parse a single message from JSON text.
pub fn parse_message_json(text: &str) -> Result<RawMessage> {
    Ok(serde_json::from_str(text)?)
}

/// Parse one message or an array of messages from JSON text.
pub fn parse_messages_json(text: &str) -> Result<Vec<RawMessage>> {
    Ok(match serde_json::from_str::<OneOrMany>(text)? {
        OneOrMany::Many(messages) => messages,
        OneOrMany::One(message) => vec![*message],
    })
}

/// Load every message stored in a `.json` file.
pub fn load_messages(path: impl AsRef<Path>) -> Result<Vec<RawMessage>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| OrderScanError::read(path, e))?;
    parse_messages_json(&text).map_err(|e| OrderScanError::InvalidMessage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
