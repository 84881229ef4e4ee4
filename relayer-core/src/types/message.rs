use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::DomainId;

/// Tag selecting which registered handler interprets a message payload.
///
/// An open set: new message kinds plug in by registering a handler under a
/// new tag, without the core learning anything about the payload layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageType(String);

impl MessageType {
    /// Construct a tag from any string-ish value.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The raw tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty tag never matches a handler and is ignored on registration.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for MessageType {
    fn from(tag: &str) -> Self {
        Self(tag.to_owned())
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded source-chain event addressed to a destination domain.
///
/// The payload is opaque bytes; only the destination handler selected by
/// `message_type` interprets it. `source` and `destination` must differ, and
/// `id` is expected to be unique per (source, nonce) — both are the
/// producing event handler's responsibility. Immutable after construction.
#[derive(Clone, Debug)]
pub struct Message {
    /// Domain where the message was initiated
    pub source: DomainId,
    /// Destination domain of the message
    pub destination: DomainId,
    /// Producer-assigned identifier, unique per (source, nonce)
    pub id: String,
    /// Tag selecting the destination handler
    pub message_type: MessageType,
    /// Opaque payload, interpreted only by the destination handler
    pub data: Vec<u8>,
    /// When the message was constructed, used for relay latency
    pub timestamp: SystemTime,
}

impl Message {
    /// Construct a message, stamping it with the current time.
    pub fn new(
        source: DomainId,
        destination: DomainId,
        id: impl Into<String>,
        message_type: MessageType,
        data: Vec<u8>,
    ) -> Self {
        Self {
            source,
            destination,
            id: id.into(),
            message_type,
            data,
            timestamp: SystemTime::now(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}=>{}, type {})",
            self.id, self.source, self.destination, self.message_type
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_tag_is_detected() {
        assert!(MessageType::new("").is_empty());
        assert!(!MessageType::new("fungibleTransfer").is_empty());
    }

    #[test]
    fn message_displays_route_and_type() {
        let msg = Message::new(1, 2, "1-7", MessageType::new("genericCall"), vec![]);
        assert_eq!(msg.to_string(), "1-7(1=>2, type genericCall)");
    }
}
