use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use tracing::{error, warn};

use crate::auth::SlackVerifier;
use crate::error::RescheduleError;
use crate::services::commands::CommandHandler;
use crate::services::follow_up::FollowUpSender;
use crate::services::interaction::Rescheduler;

pub mod events;
pub mod health;
pub mod interaction;


// AppState struct containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    pub rescheduler: Arc<Rescheduler>,
    pub commands: Arc<CommandHandler>,
    pub follow_ups: FollowUpSender,
    pub verifier: SlackVerifier,
}

const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const SIGNATURE_HEADER: &str = "x-slack-signature";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Checks the request signature against the raw body.
fn verify_signature(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), StatusCode> {
    state
        .verifier
        .verify_signature(
            header(headers, TIMESTAMP_HEADER),
            header(headers, SIGNATURE_HEADER),
            body,
        )
        .map_err(reject)
}

/// Logs a request-level failure and maps it to its status code.
fn reject(err: RescheduleError) -> StatusCode {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Rejecting request: {}", err);
    } else {
        warn!("Rejecting request: {}", err);
    }
    status
}
