use tracing::info;

use crate::client::Groupware;
use crate::error::RescheduleError;
use crate::models::common::EventTime;
use crate::models::meeting::{Meeting, Room};
use crate::services::token::TimeSelection;

/// Moves a meeting to the selected slot and room.
///
/// The meeting is fetched fresh, its start, end and rooms are overwritten and the
/// whole event is written back. Nothing guards against the slot having been
/// taken since the search ran; a rejected update is returned as an error.
pub async fn reschedule_meeting(
    groupware: &dyn Groupware,
    selection: &TimeSelection,
) -> Result<Meeting, RescheduleError> {
    let mut meeting = groupware
        .find_event(&selection.meeting_id)
        .await
        .map_err(|source| RescheduleError::MeetingNotFound {
            id: selection.meeting_id.clone(),
            source,
        })?;

    meeting.start = EventTime {
        date_time: selection.start,
        ..meeting.start
    };
    let time_zone = meeting
        .end
        .as_ref()
        .map(|end| end.time_zone.clone())
        .unwrap_or_else(|| meeting.start.time_zone.clone());
    meeting.end = Some(EventTime {
        date_time: selection.end,
        time_zone,
    });
    meeting.rooms = vec![Room::with_id(selection.room_id.clone())];

    let updated = groupware
        .update_event(&meeting)
        .await
        .map_err(|source| RescheduleError::UpdateFailed {
            id: meeting.id.clone(),
            source,
        })?;

    info!(
        "Rescheduled meeting {} to {} in room {}",
        meeting.id, selection.start, selection.room_id
    );
    Ok(updated)
}
