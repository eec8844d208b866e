use futures::future::try_join_all;
use tracing::{debug, info};

use crate::client::Groupware;
use crate::error::RescheduleError;
use crate::models::meeting::{
    AvailabilityQuery, AvailableSlot, Meeting, MeetingShape, Room, RoomMatch, RoomRef, TimeWindow,
};

/// Free slots for the meeting's attendees in any of `rooms`, across all `windows`.
///
/// One query is issued per window. Any failing query fails the whole search.
/// Results are ordered by start instant, then room code, no matter which
/// response arrived first.
pub async fn search_available_slots<I>(
    groupware: &dyn Groupware,
    meeting: &Meeting,
    rooms: &[Room],
    windows: I,
) -> Result<Vec<AvailableSlot>, RescheduleError>
where
    I: IntoIterator<Item = TimeWindow>,
{
    let duration = meeting
        .duration_minutes()
        .ok_or(RescheduleError::UnsupportedMeetingShape(MeetingShape::OpenEnded))?;
    let room_refs: Vec<RoomRef> = rooms
        .iter()
        .map(|room| RoomRef {
            id: room.id.clone(),
        })
        .collect();

    let queries: Vec<AvailabilityQuery> = windows
        .into_iter()
        .map(|window| AvailabilityQuery {
            time_ranges: vec![window],
            time_interval: duration,
            attendees: meeting.attendees.clone(),
            rooms: room_refs.clone(),
            room_match: RoomMatch::Any,
        })
        .collect();

    debug!(
        "Searching {} window(s) for {}-minute slots of meeting {}",
        queries.len(),
        duration,
        meeting.id
    );

    let pages = try_join_all(
        queries
            .iter()
            .map(|query| groupware.search_available_times(query)),
    )
    .await?;

    let mut slots: Vec<AvailableSlot> = pages.into_iter().flatten().collect();
    sort_slots(&mut slots);

    info!("Found {} available slot(s) for meeting {}", slots.len(), meeting.id);
    Ok(slots)
}

/// Start instant ascending, then room code ascending.
pub fn sort_slots(slots: &mut [AvailableSlot]) {
    slots.sort_by(|a, b| {
        a.start
            .date_time
            .cmp(&b.start.date_time)
            .then_with(|| a.room.code.cmp(&b.room.code))
    });
}
