use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, info};
use url::form_urlencoded;

use crate::error::RescheduleError;
use crate::handlers::{reject, verify_signature, AppState};
use crate::models::slack::InteractionCallback;

/// Form field carrying the JSON callback.
const PAYLOAD_FIELD: &str = "payload";

/// Pulls the JSON callback out of an `application/x-www-form-urlencoded` body.
pub fn decode_callback(body: &[u8]) -> Result<InteractionCallback, RescheduleError> {
    let payload = form_urlencoded::parse(body)
        .find(|(key, _)| key == PAYLOAD_FIELD)
        .map(|(_, value)| value)
        .ok_or_else(|| RescheduleError::Transport("body has no payload field".to_string()))?;

    serde_json::from_str(&payload)
        .map_err(|err| RescheduleError::Transport(format!("invalid callback JSON: {}", err)))
}

// Interactive message callback handler
pub async fn handle_interaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, StatusCode> {
    let body = body
        .map_err(|err| reject(RescheduleError::Transport(format!("unreadable body: {}", err))))?;
    verify_signature(&state, &headers, &body)?;

    let callback = decode_callback(&body).map_err(reject)?;
    state.verifier.verify_token(&callback.token).map_err(reject)?;

    info!(
        "Received {} callback from @{} in channel {}",
        callback.callback_id, callback.user.name, callback.channel.id
    );

    let ack = state.rescheduler.acknowledge(&callback).map_err(reject)?;

    if let Some(action) = ack.follow_up {
        debug!("Queueing follow-up for {:?}", action);
        let rescheduler = Arc::clone(&state.rescheduler);
        let InteractionCallback {
            user,
            channel,
            original_message,
            ..
        } = callback;

        state.follow_ups.submit(channel.id, async move {
            rescheduler.follow_up(&user, &original_message, action).await
        });
    }

    Ok(match ack.reply {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::OK.into_response(),
    })
}
