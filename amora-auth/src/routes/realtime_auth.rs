use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use amora_shared::clients::realtime;
use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct RealtimeAuthRequest {
    pub channel: String,
}

#[derive(Debug, Serialize)]
pub struct RealtimeAuthResponse {
    pub channel: String,
    pub user_id: Uuid,
}

/// Authorizes a channel subscription against the caller's session: its own
/// private channel, or a pair channel it participates in.
pub async fn realtime_auth(
    user: AuthUser,
    Json(req): Json<RealtimeAuthRequest>,
) -> AppResult<Json<ApiResponse<RealtimeAuthResponse>>> {
    if !realtime::can_subscribe(user.id, &req.channel) {
        return Err(AppError::new(
            ErrorCode::ChannelForbidden,
            "you may not subscribe to this channel",
        ));
    }

    Ok(Json(ApiResponse::ok(RealtimeAuthResponse {
        channel: req.channel,
        user_id: user.id,
    })))
}
