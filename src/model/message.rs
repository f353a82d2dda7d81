//! Raw message tree as handed to the extractor.
//!
//! The field names follow the Gmail API `users.messages.get` resource, so a
//! message fetched with `format=full` deserializes directly.

use serde::{Deserialize, Serialize};

/// A single name/value header pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Encoded payload of a leaf part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartBody {
    /// URL-safe base64 of the part's decoded content.
    pub data: Option<String>,
    /// Size in bytes of the decoded content, as reported by the source.
    pub size: u64,
}

/// One node of the multipart tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMessagePart {
    pub mime_type: Option<String>,
    pub headers: Vec<Header>,
    pub body: Option<PartBody>,
    pub parts: Vec<RawMessagePart>,
}

impl RawMessagePart {
    /// A leaf part whose body is already base64 encoded.
    pub fn leaf(mime_type: impl Into<String>, encoded: impl Into<String>) -> Self {
        let data: String = encoded.into();
        Self {
            mime_type: Some(mime_type.into()),
            body: Some(PartBody {
                size: data.len() as u64,
                data: Some(data),
            }),
            ..Self::default()
        }
    }

    /// A container part holding `parts` in order.
    pub fn multipart(mime_type: impl Into<String>, parts: Vec<RawMessagePart>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            parts,
            ..Self::default()
        }
    }

    /// Encoded body data, if any.
    pub fn data(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| b.data.as_deref())
    }

    /// Lowercased `type/subtype` with any parameters removed.
    pub fn essence(&self) -> Option<String> {
        self.mime_type.as_deref().map(|m| {
            m.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Top-level message: preview snippet, headers, and the root part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMessage {
    pub id: Option<String>,
    pub snippet: String,
    pub headers: Vec<Header>,
    pub payload: RawMessagePart,
}

impl RawMessage {
    /// First value of the header `name` (case-insensitive).
    ///
    /// Message-level headers are consulted before the payload's own headers.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .chain(self.payload.headers.iter())
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The `Subject` header, or `""` when absent.
    pub fn subject(&self) -> &str {
        self.header("subject").unwrap_or("")
    }
}
