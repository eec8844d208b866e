//! Selection tokens carried in the `value` of interactive options.
//!
//! The chat transport stores the outbound message and hands the chosen value
//! back on the next callback, so these strings are the only state kept between
//! requests.

use chrono::{DateTime, FixedOffset};

use crate::error::TokenError;
use crate::models::common::format_value;

const SEPARATOR: char = ',';

/// `meetingID,subject` - the subject may itself contain commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelection {
    pub meeting_id: String,
    pub subject: String,
}

impl TargetSelection {
    pub fn new(meeting_id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            meeting_id: meeting_id.into(),
            subject: subject.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}{}{}", self.meeting_id, SEPARATOR, self.subject)
    }

    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let Some((meeting_id, subject)) = token.split_once(SEPARATOR) else {
            return Err(TokenError::FieldCount {
                expected: 2,
                found: 1,
            });
        };
        if meeting_id.is_empty() {
            return Err(TokenError::EmptyField("meeting id"));
        }

        Ok(Self::new(meeting_id, subject))
    }
}

/// `meetingID,start,end,roomID` with RFC 3339 instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSelection {
    pub meeting_id: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub room_id: String,
}

impl TimeSelection {
    pub fn encode(&self) -> String {
        format!(
            "{id}{sep}{start}{sep}{end}{sep}{room}",
            id = self.meeting_id,
            sep = SEPARATOR,
            start = format_value(&self.start),
            end = format_value(&self.end),
            room = self.room_id,
        )
    }

    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let fields: Vec<&str> = token.split(SEPARATOR).collect();
        let [meeting_id, start, end, room_id] = fields.as_slice() else {
            return Err(TokenError::FieldCount {
                expected: 4,
                found: fields.len(),
            });
        };

        if meeting_id.is_empty() {
            return Err(TokenError::EmptyField("meeting id"));
        }
        if room_id.is_empty() {
            return Err(TokenError::EmptyField("room id"));
        }

        Ok(Self {
            meeting_id: meeting_id.to_string(),
            start: parse_instant(start)?,
            end: parse_instant(end)?,
            room_id: room_id.to_string(),
        })
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<FixedOffset>, TokenError> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| TokenError::InvalidInstant(format!("{raw}: {e}")))
}
