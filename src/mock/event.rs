//! Matrix data shapes handed to and returned from the mocks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Matrix event as seen on the client-server API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixEvent {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub sender: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
    #[serde(default = "empty_content")]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_server_ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<Value>,
}

fn empty_content() -> Value {
    Value::Object(Default::default())
}

impl MatrixEvent {
    /// An `m.room.member` state event for `user_id`.
    pub fn member(room_id: &str, user_id: &str, membership: &str) -> Self {
        Self {
            event_id: String::new(),
            room_id: room_id.to_string(),
            sender: user_id.to_string(),
            event_type: "m.room.member".to_string(),
            state_key: Some(user_id.to_string()),
            content: serde_json::json!({ "membership": membership }),
            origin_server_ts: None,
            unsigned: None,
        }
    }

    /// Whether this is a state event (has a `state_key`).
    pub fn is_state(&self) -> bool {
        self.state_key.is_some()
    }
}

/// Response of `get_room_members`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMembers {
    pub chunk: Vec<MatrixEvent>,
}

/// A user's global profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displayname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
