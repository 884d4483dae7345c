use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::clients::realtime;
use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::models::{Message, MessageDto, NewMessage, Participant};
use crate::schema::{messages, users};
use crate::AppState;

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 50;

// --- Helpers ---

/// Load name/image for every distinct participant in one query.
fn load_participants(
    conn: &mut diesel::pg::PgConnection,
    user_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Participant>> {
    let rows: Vec<(Uuid, String, Option<String>)> = users::table
        .filter(users::id.eq_any(user_ids))
        .select((users::id, users::name, users::image))
        .load(conn)
        .map_err(AppError::Database)?;

    Ok(rows
        .into_iter()
        .map(|(id, name, image)| (id, Participant { name, image }))
        .collect())
}

fn to_dtos(
    conn: &mut diesel::pg::PgConnection,
    rows: &[Message],
) -> AppResult<Vec<MessageDto>> {
    let mut ids: Vec<Uuid> = rows
        .iter()
        .flat_map(|m| [m.sender_id, m.recipient_id])
        .collect();
    ids.sort();
    ids.dedup();

    let participants = load_participants(conn, &ids)?;
    Ok(rows.iter().map(|m| MessageDto::from_message(m, &participants)).collect())
}

/// Keyset pagination over a `limit + 1` fetch: when an extra row exists it
/// is removed from the page and its `created` becomes the next cursor.
fn page_with_cursor(
    mut rows: Vec<MessageDto>,
    limit: usize,
) -> (Vec<MessageDto>, Option<DateTime<Utc>>) {
    if rows.len() > limit {
        let extra = rows.split_off(limit);
        (rows, Some(extra[0].created))
    } else {
        (rows, None)
    }
}

/// Ids of messages the reader has not yet seen: sent to them, still unread.
/// The reader's own messages are never touched.
fn unread_ids(rows: &[Message], reader_id: Uuid) -> Vec<Uuid> {
    rows.iter()
        .filter(|m| m.recipient_id == reader_id && m.date_read.is_none())
        .map(|m| m.id)
        .collect()
}

// --- POST /messages ---

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub recipient_id: Uuid,
    pub text: String,
}

pub async fn create_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMessageRequest>,
) -> AppResult<Json<ApiResponse<MessageDto>>> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message text cannot be empty"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let recipient_exists: bool = users::table
        .find(req.recipient_id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);
    if !recipient_exists {
        return Err(AppError::new(ErrorCode::RecipientNotFound, "recipient not found"));
    }

    let new_message = NewMessage {
        text: text.to_string(),
        sender_id: user.id,
        recipient_id: req.recipient_id,
    };

    let message: Message = diesel::insert_into(messages::table)
        .values(&new_message)
        .get_result(&mut conn)
        .map_err(AppError::Database)?;

    let dto = to_dtos(&mut conn, std::slice::from_ref(&message))?
        .pop()
        .ok_or_else(|| AppError::internal("message DTO mapping produced no row"))?;

    // An open chat view listens on the pair channel; the recipient's global
    // notification listener on their private channel.
    let pair = realtime::pair_channel(user.id, req.recipient_id);
    state.realtime.publish(&pair, realtime::MESSAGE_NEW, &dto).await;
    state
        .realtime
        .publish(&realtime::private_channel(req.recipient_id), realtime::MESSAGE_NEW, &dto)
        .await;

    tracing::info!(sender = %user.id, recipient = %req.recipient_id, message_id = %message.id, "message created");

    Ok(Json(ApiResponse::ok(dto)))
}

// --- GET /messages/thread/:user_id ---

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub messages: Vec<MessageDto>,
    pub read_count: usize,
}

/// The conversation between the caller and `other_id`, oldest first. Every
/// unread message from the other party is marked read in one batch, and the
/// newly-read ids are announced on the pair channel.
pub async fn get_thread(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(other_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ThreadResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut rows: Vec<Message> = messages::table
        .filter(
            messages::sender_id.eq(user.id)
                .and(messages::recipient_id.eq(other_id))
                .and(messages::sender_deleted.eq(false))
                .or(messages::sender_id.eq(other_id)
                    .and(messages::recipient_id.eq(user.id))
                    .and(messages::recipient_deleted.eq(false))),
        )
        .order(messages::created.asc())
        .load(&mut conn)
        .map_err(AppError::Database)?;

    let newly_read = unread_ids(&rows, user.id);
    if !newly_read.is_empty() {
        let now = Utc::now();
        diesel::update(messages::table.filter(messages::id.eq_any(&newly_read)))
            .set(messages::date_read.eq(Some(now)))
            .execute(&mut conn)?;

        // Reflect the batch update in the rows already loaded
        for message in rows.iter_mut() {
            if newly_read.contains(&message.id) {
                message.date_read = Some(now);
            }
        }

        let pair = realtime::pair_channel(user.id, other_id);
        state.realtime.publish(&pair, realtime::MESSAGES_READ, &newly_read).await;
    }

    let dtos = to_dtos(&mut conn, &rows)?;

    Ok(Json(ApiResponse::ok(ThreadResponse {
        messages: dtos,
        read_count: newly_read.len(),
    })))
}

// --- GET /messages?container=inbox|outbox ---

#[derive(Debug, Deserialize)]
pub struct ContainerParams {
    #[serde(default)]
    pub container: Option<String>,
    /// RFC 3339 timestamp of the oldest row on the previous page
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ContainerResponse {
    pub messages: Vec<MessageDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<DateTime<Utc>>,
}

pub async fn list_messages(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContainerParams>,
) -> AppResult<Json<ApiResponse<ContainerResponse>>> {
    let outbox = matches!(params.container.as_deref(), Some("outbox"));
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let cursor = match params.cursor.as_deref() {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| AppError::new(ErrorCode::ValidationError, "cursor must be an RFC 3339 timestamp"))?,
        ),
        None => None,
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let mut query = if outbox {
        messages::table
            .filter(messages::sender_id.eq(user.id))
            .filter(messages::sender_deleted.eq(false))
            .into_boxed()
    } else {
        messages::table
            .filter(messages::recipient_id.eq(user.id))
            .filter(messages::recipient_deleted.eq(false))
            .into_boxed()
    };

    if let Some(cursor) = cursor {
        query = query.filter(messages::created.le(cursor));
    }

    let rows: Vec<Message> = query
        .order(messages::created.desc())
        .limit(limit as i64 + 1)
        .load(&mut conn)
        .map_err(AppError::Database)?;

    let dtos = to_dtos(&mut conn, &rows)?;
    let (page, next_cursor) = page_with_cursor(dtos, limit);

    Ok(Json(ApiResponse::ok(ContainerResponse {
        messages: page,
        next_cursor,
    })))
}

// --- DELETE /messages/:id?outbox=bool ---

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub outbox: bool,
}

/// Soft-deletes the caller's copy, then garbage-collects: every message of
/// the caller's that neither side can still see is physically removed.
pub async fn delete_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let message: Message = messages::table
        .find(message_id)
        .first(&mut conn)
        .optional()
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::new(ErrorCode::MessageNotFound, "message not found"))?;

    let owns_side = if params.outbox {
        message.sender_id == user.id
    } else {
        message.recipient_id == user.id
    };
    if !owns_side {
        return Err(AppError::forbidden("you can only delete your own copy of a message"));
    }

    let swept = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
        if params.outbox {
            diesel::update(messages::table.find(message_id))
                .set(messages::sender_deleted.eq(true))
                .execute(conn)?;
        } else {
            diesel::update(messages::table.find(message_id))
                .set(messages::recipient_deleted.eq(true))
                .execute(conn)?;
        }

        // Opportunistic sweep instead of a background job: delete volume is
        // low and the predicate is cheap with the flag indexes.
        diesel::delete(
            messages::table
                .filter(messages::sender_deleted.eq(true))
                .filter(messages::recipient_deleted.eq(true))
                .filter(
                    messages::sender_id.eq(user.id).or(messages::recipient_id.eq(user.id)),
                ),
        )
        .execute(conn)
    })?;

    tracing::info!(message_id = %message_id, user_id = %user.id, swept, "message deleted");

    Ok(Json(ApiResponse::ok("message deleted")))
}

// --- GET /messages/unread-count ---

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

pub async fn get_unread_count(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let count: i64 = messages::table
        .filter(messages::recipient_id.eq(user.id))
        .filter(messages::date_read.is_null())
        .filter(messages::recipient_deleted.eq(false))
        .count()
        .get_result(&mut conn)
        .map_err(AppError::Database)?;

    Ok(Json(ApiResponse::ok(UnreadCountResponse { count })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dto(created: DateTime<Utc>) -> MessageDto {
        MessageDto {
            id: Uuid::now_v7(),
            text: "hello".into(),
            created,
            date_read: None,
            sender_id: Uuid::now_v7(),
            sender_name: "a".into(),
            sender_image: None,
            recipient_id: Uuid::now_v7(),
            recipient_name: "b".into(),
            recipient_image: None,
        }
    }

    fn message(sender: Uuid, recipient: Uuid, read: bool) -> Message {
        Message {
            id: Uuid::now_v7(),
            text: "hello".into(),
            sender_id: sender,
            recipient_id: recipient,
            date_read: read.then(Utc::now),
            sender_deleted: false,
            recipient_deleted: false,
            created: Utc::now(),
        }
    }

    #[test]
    fn cursor_appears_only_when_an_extra_row_exists() {
        let base = Utc::now();
        let rows: Vec<MessageDto> = (0..11)
            .map(|i| dto(base - Duration::minutes(i)))
            .collect();
        let eleventh = rows[10].created;

        let (page, cursor) = page_with_cursor(rows, 10);
        assert_eq!(page.len(), 10);
        assert_eq!(cursor, Some(eleventh));

        let exact: Vec<MessageDto> = (0..10).map(|i| dto(base - Duration::minutes(i))).collect();
        let (page, cursor) = page_with_cursor(exact, 10);
        assert_eq!(page.len(), 10);
        assert_eq!(cursor, None);

        let (page, cursor) = page_with_cursor(vec![], 10);
        assert!(page.is_empty());
        assert_eq!(cursor, None);
    }

    #[test]
    fn unread_ids_only_cover_messages_sent_to_the_reader() {
        let me = Uuid::now_v7();
        let other = Uuid::now_v7();

        let incoming_unread = message(other, me, false);
        let incoming_read = message(other, me, true);
        let outgoing_unread = message(me, other, false);

        let rows = vec![incoming_unread.clone(), incoming_read, outgoing_unread];
        let ids = unread_ids(&rows, me);

        assert_eq!(ids, vec![incoming_unread.id]);
    }

    #[test]
    fn unread_ids_empty_thread() {
        let me = Uuid::now_v7();
        assert!(unread_ids(&[], me).is_empty());
    }
}
