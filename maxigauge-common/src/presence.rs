use crate::config::PresenceFormat;

/// Presence state announced on the status topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online,
    Offline,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Offline => "offline",
        }
    }

    /// Encode the presence message in the given format.
    pub fn payload(&self, format: PresenceFormat) -> Vec<u8> {
        match format {
            PresenceFormat::Plain => self.as_str().as_bytes().to_vec(),
            PresenceFormat::Json => serde_json::json!({ "value": self.as_str() })
                .to_string()
                .into_bytes(),
        }
    }
}
