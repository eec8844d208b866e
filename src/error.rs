use axum::http::StatusCode;
use thiserror::Error;

use crate::models::meeting::MeetingShape;

/// Failures talking to the Garoon REST API.
#[derive(Debug, Error)]
pub enum GroupwareError {
    #[error("request to groupware failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("groupware responded with status {status}: {body}")]
    Api { status: u16, body: String },
}

/// Failures posting to the chat API.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to chat API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat API rejected the message: {0}")]
    Api(String),
}

/// Malformed selection tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("expected {expected} fields in token, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("token field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("invalid instant in token: {0}")]
    InvalidInstant(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything that can stop an interaction or a command.
#[derive(Debug, Error)]
pub enum RescheduleError {
    #[error("malformed request: {0}")]
    Transport(String),

    #[error("unauthorized: {0}")]
    Auth(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("groupware call failed: {0}")]
    Upstream(#[from] GroupwareError),

    #[error("unsupported meeting shape: {0}")]
    UnsupportedMeetingShape(MeetingShape),

    #[error("meeting {id} not found: {source}")]
    MeetingNotFound {
        id: String,
        #[source]
        source: GroupwareError,
    },

    #[error("room `{0}` not found")]
    RoomNotFound(String),

    #[error("room `{0}` does not belong to a facility group")]
    NoRoomGroup(String),

    #[error("failed to list rooms in facility group {group_id}: {source}")]
    GroupLookupFailed {
        group_id: String,
        #[source]
        source: GroupwareError,
    },

    #[error("failed to update meeting {id}: {source}")]
    UpdateFailed {
        id: String,
        #[source]
        source: GroupwareError,
    },

    #[error("failed to post reply: {0}")]
    Chat(#[from] ChatError),
}

impl RescheduleError {
    /// Status returned when the error surfaces at the HTTP boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RescheduleError::Auth(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
