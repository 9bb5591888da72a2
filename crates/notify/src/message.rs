use serde::{Deserialize, Serialize};

/// Formatting span inside a message, measured in UTF-16 code units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    TextLink,
}

/// One queued report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub entities: Vec<MessageEntity>,
}

const LINK_LABEL: &str = "link";

impl Message {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// `✅ {text} link`, with the trailing label linking to `scan_url + signature`
    pub fn success_with_link(text: &str, scan_url: &str, signature: &str) -> Self {
        let text = format!("✅ {text} {LINK_LABEL}");
        let label_len = utf16_len(LINK_LABEL);

        Self {
            entities: vec![MessageEntity {
                kind: EntityKind::TextLink,
                offset: utf16_len(&text) - label_len,
                length: label_len,
                url: Some(format!("{scan_url}{signature}")),
            }],
            text,
        }
    }
}

/// Queue of one wallet joined into a single deliverable message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposedMessage {
    pub text: String,
    pub entities: Vec<MessageEntity>,
}

impl ComposedMessage {
    /// The first line is separated from the rest by a blank line, later lines by a
    /// single newline. Entity offsets are shifted to their place in the joined text.
    pub fn compose(messages: &[Message]) -> Self {
        let mut composed = Self::default();

        for (i, message) in messages.iter().enumerate() {
            match i {
                0 => {}
                1 => composed.text.push_str("\n\n"),
                _ => composed.text.push('\n'),
            }

            let base = utf16_len(&composed.text);
            composed.text.push_str(&message.text);
            composed
                .entities
                .extend(message.entities.iter().map(|entity| MessageEntity {
                    offset: base + entity.offset,
                    ..entity.clone()
                }));
        }

        composed
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub(crate) fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
