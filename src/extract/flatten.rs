//! Body flattening: one plain-text rendering of a whole part tree.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::{debug, warn};

use crate::model::message::RawMessagePart;

use super::markup::strip_markup;

/// Gmail emits URL-safe base64, sometimes without padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Fallback for producers that use the standard alphabet.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Flatten a part tree into a single string.
///
/// Leaves are visited depth-first in document order. Every `text/plain` or
/// `text/html` leaf with a body contributes its decoded text (HTML stripped)
/// followed by `'\n'`. Containers sitting `max_depth` or more levels below
/// `root` are not expanded. A leaf that fails to decode contributes nothing.
pub fn flatten_body(root: &RawMessagePart, max_depth: usize) -> String {
    let mut out = String::new();
    let mut stack: Vec<(&RawMessagePart, usize)> = vec![(root, 0)];

    while let Some((part, depth)) = stack.pop() {
        if !part.parts.is_empty() {
            if depth >= max_depth {
                warn!(
                    depth,
                    children = part.parts.len(),
                    "Part nesting too deep, skipping subtree"
                );
                continue;
            }
            // Reversed so the first child is popped first.
            for child in part.parts.iter().rev() {
                stack.push((child, depth + 1));
            }
            continue;
        }

        if let Some(text) = leaf_text(part) {
            out.push_str(&text);
            out.push('\n');
        }
    }

    out
}

/// Decoded text of a leaf, or `None` if it carries no usable text.
fn leaf_text(part: &RawMessagePart) -> Option<String> {
    let essence = part.essence()?;
    let is_html = match essence.as_str() {
        "text/plain" => false,
        "text/html" => true,
        _ => return None,
    };
    let data = part.data()?;

    let bytes = match decode_body_data(data) {
        Some(bytes) => bytes,
        None => {
            warn!(
                mime_type = %essence,
                len = data.len(),
                "Could not decode body data, skipping part"
            );
            return None;
        }
    };

    let text = decode_text_bytes(&bytes);
    debug!(mime_type = %essence, chars = text.len(), "Decoded body part");

    Some(if is_html { strip_markup(&text) } else { text })
}

/// Decode base64 body data, URL-safe alphabet first.
pub fn decode_body_data(data: &str) -> Option<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    URL_SAFE_LENIENT
        .decode(&compact)
        .or_else(|_| STANDARD_LENIENT.decode(&compact))
        .ok()
}

/// Decode body bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
fn decode_text_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Encode text the way the Gmail API delivers body data.
pub fn encode_body_data(text: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(text)
}
