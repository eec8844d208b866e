use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{debug, info};

use crate::error::RescheduleError;
use crate::handlers::{header, reject, verify_signature, AppState};
use crate::models::slack::{EventEnvelope, SlackEvent};

/// Present when Slack redelivers an event we were slow to acknowledge.
const RETRY_HEADER: &str = "x-slack-retry-num";

// Events API handler, the entry point for `@bot search` commands
pub async fn handle_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, StatusCode> {
    let body = body
        .map_err(|err| reject(RescheduleError::Transport(format!("unreadable body: {}", err))))?;
    verify_signature(&state, &headers, &body)?;

    let envelope: EventEnvelope = serde_json::from_slice(&body)
        .map_err(|err| reject(RescheduleError::Transport(format!("invalid event JSON: {}", err))))?;

    match envelope {
        EventEnvelope::UrlVerification { token, challenge } => {
            state.verifier.verify_token(&token).map_err(reject)?;
            info!("Answering URL verification challenge");
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        EventEnvelope::EventCallback { token, event } => {
            state.verifier.verify_token(&token).map_err(reject)?;

            if let Some(retry) = header(&headers, RETRY_HEADER) {
                debug!("Ignoring redelivered event (retry {})", retry);
                return Ok(StatusCode::OK.into_response());
            }

            let SlackEvent::Message(event) = event else {
                debug!("Ignoring non-message event");
                return Ok(StatusCode::OK.into_response());
            };

            if let Some(command) = state.commands.accepts(&event) {
                info!("Received {:?} from {} in channel {}", command, event.user, event.channel);
                let commands = Arc::clone(&state.commands);
                state.follow_ups.submit(event.channel, async move {
                    commands.handle(command).await.map(Some)
                });
            }
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::Other => Ok(StatusCode::OK.into_response()),
    }
}
