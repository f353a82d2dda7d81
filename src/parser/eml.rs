//! Loader for individual `.eml` files (RFC 5322 messages without MBOX framing).
//!
//! The MIME tree parsed by `mail-parser` is mapped onto [`RawMessagePart`]s.
//! Text bodies arrive already transfer-decoded and charset-converted, and are
//! re-encoded as URL-safe base64 so they go through the same flattening path
//! as API-sourced messages.

use std::path::Path;

use mail_parser::{MessageParser, MimeHeaders, PartType};

use crate::error::{OrderScanError, Result};
use crate::extract::flatten::encode_body_data;
use crate::model::message::{Header, PartBody, RawMessage, RawMessagePart};

/// Nested `multipart/*` levels kept when mapping the tree.
const MAX_DEPTH: usize = 64;

/// Parse a single `.eml` file.
pub fn load_eml(path: impl AsRef<Path>) -> Result<RawMessage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| OrderScanError::read(path, e))?;
    message_from_eml(&data).ok_or_else(|| OrderScanError::InvalidMessage {
        path: path.to_path_buf(),
        reason: "not an RFC 5322 message".to_string(),
    })
}

/// Build a [`RawMessage`] from raw RFC 5322 bytes.
pub fn message_from_eml(raw: &[u8]) -> Option<RawMessage> {
    let msg = MessageParser::default().parse(raw)?;

    let mut headers = Vec::new();
    if let Some(subject) = msg.subject() {
        headers.push(Header::new("Subject", subject));
    }
    if let Some(date) = msg.date() {
        headers.push(Header::new("Date", date.to_rfc3339()));
    }

    let snippet = msg
        .body_text(0)
        .map(|t| t.chars().take(200).collect::<String>())
        .unwrap_or_default();

    let payload = map_part(&msg, 0, 0).unwrap_or_default();

    Some(RawMessage {
        id: msg.message_id().map(str::to_string),
        snippet,
        headers,
        payload,
    })
}

fn map_part(msg: &mail_parser::Message<'_>, id: usize, depth: usize) -> Option<RawMessagePart> {
    let part = msg.part(id)?;

    let declared = part.content_type().map(|ct| match ct.subtype() {
        Some(sub) => format!("{}/{}", ct.ctype(), sub),
        None => ct.ctype().to_string(),
    });

    let mapped = match &part.body {
        PartType::Text(text) => text_part(declared, "text/plain", text.as_bytes()),
        PartType::Html(html) => text_part(declared, "text/html", html.as_bytes()),
        PartType::Binary(bytes) | PartType::InlineBinary(bytes) => RawMessagePart {
            mime_type: Some(declared.unwrap_or_else(|| "application/octet-stream".to_string())),
            body: Some(PartBody {
                data: Some(encode_body_data(bytes)),
                size: bytes.len() as u64,
            }),
            ..RawMessagePart::default()
        },
        PartType::Message(_) => RawMessagePart {
            mime_type: Some("message/rfc822".to_string()),
            ..RawMessagePart::default()
        },
        PartType::Multipart(children) => {
            let parts = if depth < MAX_DEPTH {
                children
                    .iter()
                    .filter_map(|child| map_part(msg, *child, depth + 1))
                    .collect()
            } else {
                tracing::warn!(depth, "Multipart nesting too deep, dropping children");
                Vec::new()
            };
            RawMessagePart {
                mime_type: Some(declared.unwrap_or_else(|| "multipart/mixed".to_string())),
                parts,
                ..RawMessagePart::default()
            }
        }
    };

    Some(mapped)
}

/// A text leaf. The declared type wins unless it is not a text type at all.
fn text_part(declared: Option<String>, fallback: &str, bytes: &[u8]) -> RawMessagePart {
    let mime = declared
        .filter(|m| m.to_ascii_lowercase().starts_with("text/"))
        .unwrap_or_else(|| fallback.to_string());
    RawMessagePart::leaf(mime, encode_body_data(bytes))
}
