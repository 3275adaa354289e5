//! Opaque chat payloads.

use bytes::Bytes;

/// An immutable byte payload routed by the hub.
///
/// The hub never looks inside a message. Cloning shares the underlying
/// buffer, so fanning one message out to many mailboxes does not copy it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message(Bytes);

impl Message {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap into the shared buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for Message {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self(Bytes::from(text))
    }
}

impl From<&'static str> for Message {
    fn from(text: &'static str) -> Self {
        Self(Bytes::from_static(text.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_reads_back_as_str() {
        let msg = Message::from("hello");
        assert_eq!(msg.as_str(), Some("hello"));
        assert_eq!(msg.len(), 5);
    }

    #[test]
    fn binary_payload_is_not_text() {
        let msg = Message::from(vec![0xff, 0xfe, 0x00]);
        assert!(msg.as_str().is_none());
        assert_eq!(msg.as_bytes(), &[0xff, 0xfe, 0x00]);
    }

    #[test]
    fn empty_payload() {
        let msg = Message::from(String::new());
        assert!(msg.is_empty());
        assert_eq!(msg.as_str(), Some(""));
    }

    #[test]
    fn clone_shares_buffer() {
        let msg = Message::from(String::from("shared"));
        let copy = msg.clone();
        assert_eq!(msg.as_bytes().as_ptr(), copy.as_bytes().as_ptr());
        assert_eq!(msg, copy);
    }
}
