use serde::Serialize;
use uuid::Uuid;

use crate::clients::redis::RedisClient;

/// Event names on the wire. Persistence is authoritative; these are
/// best-effort UI nudges, so publish failures are logged and swallowed.
pub const MESSAGE_NEW: &str = "message:new";
pub const MESSAGES_READ: &str = "messages:read";
pub const LIKE_NEW: &str = "like:new";

const PRIVATE_PREFIX: &str = "private-";
const PAIR_PREFIX: &str = "chat-";

/// Channel private to one user. Only that user may subscribe.
pub fn private_channel(user_id: Uuid) -> String {
    format!("{PRIVATE_PREFIX}{user_id}")
}

/// Conversation channel for a pair of users. The name is independent of
/// which side asks: the lower id always comes first.
pub fn pair_channel(a: Uuid, b: Uuid) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{PAIR_PREFIX}{low}-{high}")
}

/// Whether `user_id` is allowed to subscribe to `channel`: its own private
/// channel, or a pair channel it participates in. Everything else is denied.
pub fn can_subscribe(user_id: Uuid, channel: &str) -> bool {
    if let Some(rest) = channel.strip_prefix(PRIVATE_PREFIX) {
        return rest.parse::<Uuid>().map(|id| id == user_id).unwrap_or(false);
    }

    if let Some(rest) = channel.strip_prefix(PAIR_PREFIX) {
        // "{uuid}-{uuid}": hyphenated uuids are 36 chars each, so the
        // separator position is fixed rather than searchable.
        if rest.len() != 73 || rest.as_bytes()[36] != b'-' {
            return false;
        }
        let (first, second) = (&rest[..36], &rest[37..]);
        return match (first.parse::<Uuid>(), second.parse::<Uuid>()) {
            (Ok(a), Ok(b)) => a == user_id || b == user_id,
            _ => false,
        };
    }

    false
}

#[derive(Debug, Serialize)]
struct Envelope<'a, T: Serialize> {
    event: &'a str,
    payload: &'a T,
}

#[derive(Clone)]
pub struct RealtimeClient {
    redis: RedisClient,
}

impl RealtimeClient {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    pub async fn publish<T: Serialize>(&self, channel: &str, event: &str, payload: &T) {
        let envelope = Envelope { event, payload };
        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, event = %event, "failed to serialize realtime event");
                return;
            }
        };

        match self.redis.publish(channel, &json).await {
            Ok(receivers) => {
                tracing::debug!(channel = %channel, event = %event, receivers, "realtime event published");
            }
            Err(e) => {
                tracing::error!(error = %e, channel = %channel, event = %event, "failed to publish realtime event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(n: u8) -> Uuid {
        Uuid::from_bytes([n; 16])
    }

    #[test]
    fn pair_channel_is_order_independent() {
        let a = uuid(1);
        let b = uuid(2);
        assert_eq!(pair_channel(a, b), pair_channel(b, a));
        assert!(pair_channel(a, b).starts_with("chat-"));
        assert!(pair_channel(a, b).contains(&a.to_string()));
        assert!(pair_channel(a, b).contains(&b.to_string()));
    }

    #[test]
    fn private_channel_subscription() {
        let me = uuid(7);
        let other = uuid(8);
        assert!(can_subscribe(me, &private_channel(me)));
        assert!(!can_subscribe(me, &private_channel(other)));
    }

    #[test]
    fn pair_channel_subscription() {
        let a = uuid(1);
        let b = uuid(2);
        let c = uuid(3);
        let channel = pair_channel(a, b);
        assert!(can_subscribe(a, &channel));
        assert!(can_subscribe(b, &channel));
        assert!(!can_subscribe(c, &channel));
    }

    #[test]
    fn malformed_channels_are_denied() {
        let me = uuid(1);
        assert!(!can_subscribe(me, "private-not-a-uuid"));
        assert!(!can_subscribe(me, "chat-garbage"));
        assert!(!can_subscribe(me, &format!("chat-{}", me)));
        assert!(!can_subscribe(me, "presence-global"));
        assert!(!can_subscribe(me, ""));
    }

    #[test]
    fn envelope_shape() {
        let envelope = Envelope { event: MESSAGES_READ, payload: &vec![uuid(1)] };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"event\":\"messages:read\""));
        assert!(json.contains("\"payload\":["));
    }
}
