//! Event types exchanged with connected clients.
//!
//! Defines the JSON protocol between the hub and browser clients:
//! - Client → Hub: join (`user`), chat (`message`), leave (`left`)
//! - Hub → Client: connection acknowledgement, chat rebroadcast, roster update
//!
//! The `payload` field is carried as an opaque [`serde_json::Value`]; only
//! clients interpret it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::errors::TransportError;

/// Human-readable text of the private acknowledgement sent on connect.
pub const CONNECTED_MESSAGE: &str = "<em><small>Connected to server</small></em>";

// ============================================
// Client → Hub Events
// ============================================

/// What a client is asking the hub to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InboundAction {
    /// Client announces its display name.
    #[serde(rename = "user")]
    Join,

    /// Client sends a chat message for everyone.
    Message,

    /// Client is leaving.
    #[serde(rename = "left")]
    Leave,

    /// Anything else, including a missing action.
    #[default]
    #[serde(other)]
    Unknown,
}

/// An event decoded from a client frame.
///
/// Every field is optional on the wire; absent or `null` strings decode as
/// empty and an absent payload as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundEvent {
    pub action: InboundAction,
    #[serde(deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub userrole: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub etype: String,
    pub payload: Value,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl InboundEvent {
    /// Decode one JSON frame.
    pub fn decode(frame: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Decode one JSON frame delivered as bytes.
    pub fn decode_slice(frame: &[u8]) -> Result<Self, TransportError> {
        Ok(serde_json::from_slice(frame)?)
    }

    /// Build a join event for the given display name.
    pub fn join(username: impl Into<String>) -> Self {
        Self {
            action: InboundAction::Join,
            username: username.into(),
            ..Default::default()
        }
    }

    /// Build a chat event carrying the given text.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            action: InboundAction::Message,
            message: text.into(),
            ..Default::default()
        }
    }

    /// Build a leave event.
    pub fn leave() -> Self {
        Self {
            action: InboundAction::Leave,
            ..Default::default()
        }
    }
}

// ============================================
// Hub → Client Events
// ============================================

/// Kind of event pushed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundAction {
    /// Private acknowledgement after the upgrade.
    Connected,

    /// Rebroadcast chat message.
    Message,

    /// Someone left; carries the new roster.
    UserLeft,
}

/// An event sent to one or all clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEvent {
    pub action: OutboundAction,
    pub message: String,
    pub userrole: String,
    pub etype: String,
    pub payload: Value,
    /// Sorted display labels. Only filled on roster-changing events.
    pub connect_users: Vec<String>,
}

impl OutboundEvent {
    /// The acknowledgement unicast to a freshly accepted connection.
    pub fn connected() -> Self {
        Self {
            action: OutboundAction::Connected,
            message: CONNECTED_MESSAGE.to_string(),
            userrole: String::new(),
            etype: String::new(),
            payload: Value::Null,
            connect_users: Vec::new(),
        }
    }

    /// Rebroadcast of a chat event; text, role, type tag and payload are
    /// copied verbatim.
    pub fn chat_message(source: &InboundEvent) -> Self {
        Self::passthrough(OutboundAction::Message, source, Vec::new())
    }

    /// Roster update after `source`'s connection left.
    pub fn user_left(source: &InboundEvent, roster: Vec<String>) -> Self {
        Self::passthrough(OutboundAction::UserLeft, source, roster)
    }

    fn passthrough(action: OutboundAction, source: &InboundEvent, roster: Vec<String>) -> Self {
        Self {
            action,
            message: source.message.clone(),
            userrole: source.userrole.clone(),
            etype: source.etype.clone(),
            payload: source.payload.clone(),
            connect_users: roster,
        }
    }

    /// Encode as one JSON text frame.
    pub fn encode(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|e| TransportError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inbound_decodes_all_known_actions() {
        let join = InboundEvent::decode(r#"{"action":"user","username":"alice"}"#).unwrap();
        assert_eq!(join.action, InboundAction::Join);
        assert_eq!(join.username, "alice");

        let msg = InboundEvent::decode(r#"{"action":"message","message":"hi"}"#).unwrap();
        assert_eq!(msg.action, InboundAction::Message);
        assert_eq!(msg.message, "hi");

        let left = InboundEvent::decode(r#"{"action":"left"}"#).unwrap();
        assert_eq!(left.action, InboundAction::Leave);
    }

    #[test]
    fn unrecognized_action_decodes_as_unknown() {
        let event = InboundEvent::decode(r#"{"action":"dance"}"#).unwrap();
        assert_eq!(event.action, InboundAction::Unknown);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let event = InboundEvent::decode("{}").unwrap();
        assert_eq!(event.action, InboundAction::Unknown);
        assert!(event.username.is_empty());
        assert_eq!(event.payload, Value::Null);
    }

    #[test]
    fn null_string_fields_decode_as_empty() {
        let event = InboundEvent::decode(
            r#"{"action":"message","username":null,"userrole":null,"message":"hi","etype":null,"payload":null}"#,
        )
        .unwrap();

        assert_eq!(event.action, InboundAction::Message);
        assert_eq!(event.message, "hi");
        assert!(event.username.is_empty());
        assert!(event.userrole.is_empty());
        assert!(event.etype.is_empty());
        assert_eq!(event.payload, Value::Null);
    }

    #[test]
    fn non_string_field_is_still_malformed() {
        let err = InboundEvent::decode(r#"{"action":"message","message":42}"#).unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn payload_is_kept_opaque() {
        let event = InboundEvent::decode(
            r#"{"action":"message","payload":{"x":[1,2,{"y":null}]}}"#,
        )
        .unwrap();
        assert_eq!(event.payload, json!({"x": [1, 2, {"y": null}]}));
    }

    #[test]
    fn malformed_frame_is_rejected() {
        let err = InboundEvent::decode("{not json").unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[test]
    fn decode_slice_accepts_bytes() {
        let event = InboundEvent::decode_slice(br#"{"action":"left"}"#).unwrap();
        assert_eq!(event.action, InboundAction::Leave);
    }

    #[test]
    fn chat_message_copies_fields_verbatim() {
        let source = InboundEvent {
            action: InboundAction::Message,
            username: "alice".into(),
            userrole: "admin".into(),
            message: "hi".into(),
            etype: "text".into(),
            payload: json!({"k": "v"}),
        };

        let out = OutboundEvent::chat_message(&source);
        assert_eq!(out.action, OutboundAction::Message);
        assert_eq!(out.message, "hi");
        assert_eq!(out.userrole, "admin");
        assert_eq!(out.etype, "text");
        assert_eq!(out.payload, json!({"k": "v"}));
        assert!(out.connect_users.is_empty());
    }

    #[test]
    fn outbound_serializes_wire_field_names() {
        let out = OutboundEvent::user_left(&InboundEvent::leave(), vec!["bob".into()]);
        let json: Value = serde_json::from_str(&out.encode().unwrap()).unwrap();
        assert_eq!(json["action"], "user_left");
        assert_eq!(json["connect_users"], json!(["bob"]));
        assert!(json.get("userrole").is_some());
        assert!(json.get("etype").is_some());
    }

    #[test]
    fn connected_acknowledgement_has_fixed_message() {
        let out = OutboundEvent::connected();
        let json: Value = serde_json::from_str(&out.encode().unwrap()).unwrap();
        assert_eq!(json["action"], "connected");
        assert_eq!(json["message"], CONNECTED_MESSAGE);
    }
}
