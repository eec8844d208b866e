use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::models::common::{rfc3339, EventTime};

/// A schedule event as stored in Garoon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    pub start: EventTime,
    // Start-only events come back without an end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub is_start_only: bool,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default, rename = "facilities")]
    pub rooms: Vec<Room>,
}

impl Meeting {
    /// Meetings we cannot move: no fixed end, or more than one room.
    pub fn unsupported_shape(&self) -> Option<MeetingShape> {
        if self.is_all_day || self.is_start_only || self.end.is_none() {
            Some(MeetingShape::OpenEnded)
        } else if self.rooms.len() > 1 {
            Some(MeetingShape::MultipleRooms)
        } else {
            None
        }
    }

    /// Length of the meeting in whole minutes, rounded to the nearest minute.
    pub fn duration_minutes(&self) -> Option<i64> {
        let end = self.end.as_ref()?;
        let seconds = (end.date_time - self.start.date_time).num_seconds();
        Some((seconds as f64 / 60.0).round() as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingShape {
    OpenEnded,
    MultipleRooms,
}

impl std::fmt::Display for MeetingShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingShape::OpenEnded => write!(f, "all-day or start-only meeting"),
            MeetingShape::MultipleRooms => write!(f, "meeting with multiple rooms"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(rename = "type", default = "default_attendee_type")]
    pub kind: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_attendee_type() -> String {
    "USER".to_string()
}

impl Attendee {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: default_attendee_type(),
            id: id.into(),
            code: None,
            name: None,
        }
    }
}

/// A meeting room ("facility" in Garoon).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, rename = "facilityGroup", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl Room {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomRef {
    pub id: String,
}

/// One business day's searchable span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "rfc3339")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "rfc3339")]
    pub end: DateTime<FixedOffset>,
}

/// How the candidate rooms combine in an availability search. The search
/// only ever asks for one room out of the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomMatch {
    #[serde(rename = "OR")]
    Any,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub time_ranges: Vec<TimeWindow>,
    pub time_interval: i64,
    pub attendees: Vec<Attendee>,
    #[serde(rename = "facilities")]
    pub rooms: Vec<RoomRef>,
    #[serde(rename = "facilitySearchCondition")]
    pub room_match: RoomMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub start: EventTime,
    pub end: EventTime,
    #[serde(rename = "facility")]
    pub room: Room,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTimesResponse {
    #[serde(default)]
    pub available_times: Vec<AvailableSlot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<Meeting>,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsResponse {
    #[serde(default, rename = "facilities")]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub has_next: bool,
}
