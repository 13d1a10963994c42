//! Observer relay messages (Bot ↔ remote dashboard).
//!
//! Observers receive periodic actor stats and every reply the bot sends;
//! text they submit is treated as chat from a synthetic speaker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::PositionData;

/// Messages sent from an observer to the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Keep-alive; answered with `Pong`.
    Heartbeat,
    /// Free text to run through the command pipeline.
    Chat { text: String },
}

/// Messages sent from the bot to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Latest actor snapshot.
    Stats { stats: ActorStatsData },
    /// A reply the bot produced for a chat event.
    Reply { speaker: String, text: String },
    Pong,
    Error { code: String, message: String },
}

/// Actor stats pushed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorStatsData {
    pub name: String,
    pub position: PositionData,
    pub health: f32,
    pub stamina: u32,
    /// Player currently being followed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<String>,
    #[serde(default)]
    pub inventory: Vec<InventoryEntryData>,
    pub captured_at: DateTime<Utc>,
}

/// Summed quantity of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntryData {
    pub name: String,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_chat_uses_type_tag() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"Chat","text":"follow me"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Chat {
                text: "follow me".to_string()
            }
        );
    }

    #[test]
    fn reply_serializes_flat() {
        let json = serde_json::to_value(ServerMessage::Reply {
            speaker: "alex".to_string(),
            text: "Started following you".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "Reply");
        assert_eq!(json["speaker"], "alex");
    }
}
