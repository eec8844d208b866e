use std::collections::HashSet;

use tracing::{debug, info};

use crate::client::Groupware;
use crate::error::RescheduleError;
use crate::models::meeting::Room;

/// Rooms that may stand in for the meeting's current room.
///
/// The current room is looked up by name to find its facility group; every
/// room of that group whose code is not excluded is a candidate. A meeting
/// without a room yields no candidates.
pub async fn resolve_rooms(
    groupware: &dyn Groupware,
    current: &[Room],
    excluded_codes: &HashSet<String>,
) -> Result<Vec<Room>, RescheduleError> {
    let Some(room) = current.first() else {
        debug!("Meeting has no room, nothing to substitute");
        return Ok(Vec::new());
    };

    let matches = groupware.find_rooms_by_name(&room.name).await?;
    let Some(found) = matches.first() else {
        return Err(RescheduleError::RoomNotFound(room.name.clone()));
    };
    let Some(group_id) = found.group_id.clone() else {
        return Err(RescheduleError::NoRoomGroup(room.name.clone()));
    };

    let siblings = groupware
        .list_rooms_in_group(&group_id)
        .await
        .map_err(|source| RescheduleError::GroupLookupFailed {
            group_id: group_id.clone(),
            source,
        })?;

    let candidates: Vec<Room> = siblings
        .into_iter()
        .filter(|sibling| !excluded_codes.contains(&sibling.code))
        .collect();

    info!(
        "Found {} candidate room(s) in facility group {} for `{}`",
        candidates.len(),
        group_id,
        room.name
    );
    Ok(candidates)
}
