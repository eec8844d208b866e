use crate::models::common::format_readable;
use crate::models::meeting::AvailableSlot;
use crate::models::slack::{ActionOption, Attachment, ACTION_SELECT_TIME};
use crate::services::token::TimeSelection;

pub const NO_CANDIDATES_TITLE: &str = "Could not find a date to reschedule.";
pub const CHOOSE_CANDIDATE_TITLE: &str = "Which schedule would you like?";

/// What to show for a list of rescheduling candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates {
    pub title: String,
    pub text: String,
    /// Present only when the acting user may commit a reschedule.
    pub options: Option<Vec<ActionOption>>,
}

impl Candidates {
    pub fn into_attachment(self, base: Attachment) -> Attachment {
        let attachment = Attachment {
            title: self.title,
            text: self.text,
            ..base
        };

        match self.options {
            Some(options) => attachment.with_menu(ACTION_SELECT_TIME, options),
            None => attachment,
        }
    }
}

/// Lists every slot; only the owner gets a menu to pick one.
pub fn present_candidates(
    meeting_id: &str,
    slots: &[AvailableSlot],
    acting_user_id: &str,
    owner_id: &str,
) -> Candidates {
    if slots.is_empty() {
        return Candidates {
            title: NO_CANDIDATES_TITLE.to_string(),
            text: String::new(),
            options: None,
        };
    }

    let labels: Vec<String> = slots.iter().map(slot_label).collect();
    let text: String = labels.iter().map(|label| format!("{label}\n")).collect();

    if acting_user_id != owner_id {
        return Candidates {
            title: format!("{} schedules found.", slots.len()),
            text,
            options: None,
        };
    }

    let options = slots
        .iter()
        .zip(labels)
        .map(|(slot, label)| ActionOption {
            text: label,
            value: TimeSelection {
                meeting_id: meeting_id.to_string(),
                start: slot.start.date_time,
                end: slot.end.date_time,
                room_id: slot.room.id.clone(),
            }
            .encode(),
        })
        .collect();

    Candidates {
        title: CHOOSE_CANDIDATE_TITLE.to_string(),
        text,
        options: Some(options),
    }
}

fn slot_label(slot: &AvailableSlot) -> String {
    format!("{} {}", format_readable(&slot.start.date_time), slot.room.name)
}
