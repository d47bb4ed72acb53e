//! The unit of transfer on the bus.

/// A message travelling over the broker.
///
/// `event_type` is the routing discriminator; consumers never look inside the
/// payload before classifying the message by it.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Unique identifier for this message
    pub id: String,
    /// Stable type tag (e.g. "twitch_user.parse_requested")
    pub event_type: String,
    /// Serialized payload (bitcode for envelopes, anything for foreign producers)
    pub payload: Vec<u8>,
    /// Optional metadata (kind, causation id, ...)
    pub metadata: Option<Vec<(String, String)>>,
}

impl Message {
    /// Create a new message with the given type and payload.
    pub fn new(id: impl Into<String>, event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            payload,
            metadata: None,
        }
    }

    /// Create a message with a fresh v4 id and a bitcode-serialized payload.
    pub fn encode<T: serde::Serialize>(
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, bitcode::Error> {
        let bytes = bitcode::serialize(payload)?;
        Ok(Self::new(uuid::Uuid::new_v4().to_string(), event_type, bytes))
    }

    /// Decode the payload from bitcode binary format.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, bitcode::Error> {
        bitcode::deserialize(&self.payload)
    }

    /// Create a message with a string payload.
    pub fn with_string_payload(
        id: impl Into<String>,
        event_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self::new(id, event_type, payload.into().into_bytes())
    }

    /// Add metadata to the message.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Look up a metadata value by key.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}
