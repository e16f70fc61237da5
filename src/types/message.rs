//! Input message record

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One chat message from the upstream feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// ISO-like timestamp, passed through untouched
    pub timestamp: String,
    /// User id the message belongs to
    pub user: String,
    /// Message body. Missing, null or non-string values read as empty.
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
}

impl Message {
    pub fn new(
        timestamp: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            user: user.into(),
            text: text.into(),
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}
