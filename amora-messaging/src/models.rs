use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::schema::messages;

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub date_read: Option<DateTime<Utc>>,
    pub sender_deleted: bool,
    pub recipient_deleted: bool,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub text: String,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
}

// --- Wire DTO ---

/// Identity fields a chat or inbox row needs, keyed by user id.
#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub image: Option<String>,
}

/// The flattened message shape clients receive, decoupled from the row:
/// message fields plus sender/recipient identity.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
    pub date_read: Option<DateTime<Utc>>,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_image: Option<String>,
    pub recipient_id: Uuid,
    pub recipient_name: String,
    pub recipient_image: Option<String>,
}

impl MessageDto {
    pub fn from_message(message: &Message, participants: &HashMap<Uuid, Participant>) -> Self {
        let sender = participants.get(&message.sender_id);
        let recipient = participants.get(&message.recipient_id);

        Self {
            id: message.id,
            text: message.text.clone(),
            created: message.created,
            date_read: message.date_read,
            sender_id: message.sender_id,
            sender_name: sender.map(|p| p.name.clone()).unwrap_or_default(),
            sender_image: sender.and_then(|p| p.image.clone()),
            recipient_id: message.recipient_id,
            recipient_name: recipient.map(|p| p.name.clone()).unwrap_or_default(),
            recipient_image: recipient.and_then(|p| p.image.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_wire_shape() {
        let sender_id = Uuid::now_v7();
        let recipient_id = Uuid::now_v7();
        let message = Message {
            id: Uuid::now_v7(),
            text: "hi".into(),
            sender_id,
            recipient_id,
            date_read: None,
            sender_deleted: false,
            recipient_deleted: false,
            created: Utc::now(),
        };
        let mut participants = HashMap::new();
        participants.insert(sender_id, Participant { name: "Alice".into(), image: None });
        participants.insert(recipient_id, Participant { name: "Bob".into(), image: Some("b.jpg".into()) });

        let dto = MessageDto::from_message(&message, &participants);
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["sender_name"], "Alice");
        assert_eq!(json["recipient_image"], "b.jpg");
        assert_eq!(json["date_read"], serde_json::Value::Null);
        // soft-delete flags are storage detail, not wire contract
        assert!(json.get("sender_deleted").is_none());
    }
}
