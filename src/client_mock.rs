use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::auth::SlackVerifier;
use crate::chat::ChatPoster;
use crate::client::Groupware;
use crate::error::{ChatError, GroupwareError};
use crate::models::common::EventTime;
use crate::models::meeting::{AvailabilityQuery, AvailableSlot, Attendee, Meeting, Room};
use crate::models::slack::Attachment;
use crate::handlers::AppState;
use crate::services::commands::CommandHandler;
use crate::services::follow_up::spawn_follow_up_worker;
use crate::services::interaction::{Clock, Rescheduler};

pub const VERIFICATION_TOKEN: &str = "verify";
pub const OWNER_ID: &str = "UOWNER";
pub const BOT_ID: &str = "UBOT";
pub const CHANNEL_ID: &str = "C1";

fn instant(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap()
}

pub fn room(id: &str, name: &str, code: &str, group_id: &str) -> Room {
    Room {
        id: id.to_string(),
        name: name.to_string(),
        code: code.to_string(),
        group_id: Some(group_id.to_string()),
    }
}

pub fn slot(start: &str, minutes: i64, room: Room) -> AvailableSlot {
    let start = instant(start);
    AvailableSlot {
        start: EventTime::new(start),
        end: EventTime::new(start + Duration::minutes(minutes)),
        room,
    }
}

/// A one-room meeting with two attendees.
pub fn meeting(id: &str, subject: &str, start: &str, minutes: i64) -> Meeting {
    let start = instant(start);
    Meeting {
        id: id.to_string(),
        subject: subject.to_string(),
        start: EventTime {
            date_time: start,
            time_zone: "Asia/Tokyo".to_string(),
        },
        end: Some(EventTime {
            date_time: start + Duration::minutes(minutes),
            time_zone: "Asia/Tokyo".to_string(),
        }),
        is_all_day: false,
        is_start_only: false,
        attendees: vec![Attendee::user("u1"), Attendee::user("u2")],
        rooms: vec![room("r1", "Room 1", "R-01", "g1")],
    }
}

pub fn fixed_clock(now: &str) -> Clock {
    let now = instant(now);
    Arc::new(move || now)
}

/// In-memory stand-in for Garoon.
///
/// Availability answers are keyed by the start of the queried window, so tests
/// can script what each per-day query returns.
#[derive(Default)]
pub struct InMemoryGroupware {
    meetings: Mutex<HashMap<String, Meeting>>,
    rooms: Mutex<Vec<Room>>,
    availability: Mutex<HashMap<DateTime<FixedOffset>, Vec<AvailableSlot>>>,
    failing_windows: Mutex<Vec<DateTime<FixedOffset>>>,
    queries: Mutex<Vec<AvailabilityQuery>>,
    updates: Mutex<Vec<Meeting>>,
    reject_updates: Mutex<bool>,
}

impl InMemoryGroupware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_meeting(&self, meeting: Meeting) {
        self.meetings
            .lock()
            .unwrap()
            .insert(meeting.id.clone(), meeting);
    }

    pub fn add_room(&self, room: Room) {
        self.rooms.lock().unwrap().push(room);
    }

    pub fn set_available(&self, window_start: &str, slots: Vec<AvailableSlot>) {
        self.availability
            .lock()
            .unwrap()
            .insert(instant(window_start), slots);
    }

    pub fn fail_window(&self, window_start: &str) {
        self.failing_windows
            .lock()
            .unwrap()
            .push(instant(window_start));
    }

    pub fn reject_updates(&self) {
        *self.reject_updates.lock().unwrap() = true;
    }

    pub fn queries(&self) -> Vec<AvailabilityQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<Meeting> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl Groupware for InMemoryGroupware {
    async fn find_event(&self, id: &str) -> Result<Meeting, GroupwareError> {
        self.meetings
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| GroupwareError::Api {
                status: 404,
                body: format!("event {} not found", id),
            })
    }

    async fn update_event(&self, meeting: &Meeting) -> Result<Meeting, GroupwareError> {
        if *self.reject_updates.lock().unwrap() {
            return Err(GroupwareError::Api {
                status: 400,
                body: "facility is already reserved".to_string(),
            });
        }
        self.updates.lock().unwrap().push(meeting.clone());
        self.add_meeting(meeting.clone());
        Ok(meeting.clone())
    }

    async fn search_events(
        &self,
        keyword: &str,
        _range_start: DateTime<FixedOffset>,
    ) -> Result<Vec<Meeting>, GroupwareError> {
        let mut found: Vec<Meeting> = self
            .meetings
            .lock()
            .unwrap()
            .values()
            .filter(|meeting| meeting.subject.contains(keyword))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn search_available_times(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<AvailableSlot>, GroupwareError> {
        self.queries.lock().unwrap().push(query.clone());

        let window_start = query.time_ranges[0].start;
        if self.failing_windows.lock().unwrap().contains(&window_start) {
            return Err(GroupwareError::Api {
                status: 500,
                body: "search failed".to_string(),
            });
        }

        Ok(self
            .availability
            .lock()
            .unwrap()
            .get(&window_start)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_rooms_by_name(&self, name: &str) -> Result<Vec<Room>, GroupwareError> {
        Ok(self
            .rooms
            .lock()
            .unwrap()
            .iter()
            .filter(|room| room.name == name)
            .cloned()
            .collect())
    }

    async fn list_rooms_in_group(&self, group_id: &str) -> Result<Vec<Room>, GroupwareError> {
        Ok(self
            .rooms
            .lock()
            .unwrap()
            .iter()
            .filter(|room| room.group_id.as_deref() == Some(group_id))
            .cloned()
            .collect())
    }
}

/// Chat poster that hands every posted attachment to a channel.
pub struct RecordingChat {
    tx: mpsc::UnboundedSender<(String, Attachment)>,
}

impl RecordingChat {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(String, Attachment)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ChatPoster for RecordingChat {
    async fn post_attachment(
        &self,
        channel: &str,
        attachment: &Attachment,
    ) -> Result<(), ChatError> {
        self.tx
            .send((channel.to_string(), attachment.clone()))
            .map_err(|_| ChatError::Api("recorder closed".to_string()))
    }
}

/// Application state wired to `groupware`, with every post captured.
///
/// Must be called inside a runtime since it starts the follow-up worker.
pub fn app_state(
    groupware: Arc<InMemoryGroupware>,
    signing_secret: Option<&str>,
) -> (Arc<AppState>, mpsc::UnboundedReceiver<(String, Attachment)>) {
    let clock = fixed_clock("2019-01-06T10:00:00+09:00");
    let (chat, posted) = RecordingChat::new();
    let (follow_ups, _worker) = spawn_follow_up_worker(Arc::new(chat));

    let state = AppState {
        rescheduler: Arc::new(
            Rescheduler::new(groupware.clone(), OWNER_ID, HashSet::new()).with_clock(clock.clone()),
        ),
        commands: Arc::new(CommandHandler::new(
            groupware,
            BOT_ID,
            Some(CHANNEL_ID.to_string()),
            clock,
        )),
        follow_ups,
        verifier: SlackVerifier::new(VERIFICATION_TOKEN, signing_secret.map(str::to_string)),
    };
    (Arc::new(state), posted)
}
