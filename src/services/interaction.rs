//! Three-step reschedule conversation driven by interactive callbacks.
//!
//! `selectTarget` picks the meeting and answers with candidate slots,
//! `selectTime` commits one of them, and `cancel` ends the conversation at
//! either step. Which step we are in is implied by the action name; all other
//! state rides along in the option values.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use tracing::{error, info, warn};

use crate::client::Groupware;
use crate::error::RescheduleError;
use crate::models::common::format_readable;
use crate::models::meeting::MeetingShape;
use crate::models::slack::{
    Attachment, InteractionCallback, Message, SlackUser, ACTION_CANCEL, ACTION_SELECT_TARGET,
    ACTION_SELECT_TIME,
};
use crate::services::availability::search_available_slots;
use crate::services::presenter::present_candidates;
use crate::services::reschedule::reschedule_meeting;
use crate::services::rooms::resolve_rooms;
use crate::services::time_windows::plan_windows;
use crate::services::token::{TargetSelection, TimeSelection};

pub const NOT_PERMITTED_TITLE: &str = ":x: You are not permitted.";
pub const RESCHEDULED_TITLE: &str = "The schedule has been rescheduled! :white_check_mark:";
pub const RESCHEDULE_FAILED_TITLE: &str = ":x: Failed to reschedule the schedule.";
pub const OPEN_ENDED_TITLE: &str = "Meetings without an end time are not supported.";
pub const MULTIPLE_ROOMS_TITLE: &str = "Meetings with multiple rooms are not supported.";

/// Source of "now" for planning search windows.
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().fixed_offset())
}

/// The action carried by an interactive callback, with its token decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectTarget(TargetSelection),
    SelectTime(TimeSelection),
    Cancel,
    Unknown(String),
}

impl Action {
    pub fn from_callback(callback: &InteractionCallback) -> Result<Self, RescheduleError> {
        let action = callback
            .actions
            .first()
            .ok_or_else(|| RescheduleError::Transport("callback carries no action".to_string()))?;

        let selected_value = || {
            action
                .selected_options
                .first()
                .map(|option| option.value.as_str())
                .ok_or_else(|| {
                    RescheduleError::Transport(format!("no option selected for {}", action.name))
                })
        };

        match action.name.as_str() {
            ACTION_SELECT_TARGET => Ok(Action::SelectTarget(TargetSelection::decode(
                selected_value()?,
            )?)),
            ACTION_SELECT_TIME => Ok(Action::SelectTime(TimeSelection::decode(
                selected_value()?,
            )?)),
            ACTION_CANCEL => Ok(Action::Cancel),
            other => Ok(Action::Unknown(other.to_string())),
        }
    }
}

/// What to answer synchronously, and what to keep doing afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgement {
    /// Replacement for the original message; `None` answers with an empty 200.
    pub reply: Option<Message>,
    pub follow_up: Option<Action>,
}

pub struct Rescheduler {
    groupware: Arc<dyn Groupware>,
    owner_id: String,
    excluded_room_codes: HashSet<String>,
    clock: Clock,
}

impl std::fmt::Debug for Rescheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rescheduler")
            .field("owner_id", &self.owner_id)
            .field("excluded_room_codes", &self.excluded_room_codes)
            .finish_non_exhaustive()
    }
}

impl Rescheduler {
    pub fn new(
        groupware: Arc<dyn Groupware>,
        owner_id: impl Into<String>,
        excluded_room_codes: HashSet<String>,
    ) -> Self {
        Self {
            groupware,
            owner_id: owner_id.into(),
            excluded_room_codes,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Decides the immediate answer to a callback.
    pub fn acknowledge(
        &self,
        callback: &InteractionCallback,
    ) -> Result<Acknowledgement, RescheduleError> {
        let action = Action::from_callback(callback)?;

        let notice = match &action {
            Action::SelectTarget(target) => {
                format!(":ok: {} was selected.\nPlease wait.", target.subject)
            }
            Action::SelectTime(time) => {
                format!(":ok: {} was selected.\nPlease wait.", format_readable(&time.start))
            }
            Action::Cancel => {
                info!("@{} canceled the reschedule", callback.user.name);
                return Ok(Acknowledgement {
                    reply: None,
                    follow_up: Some(action),
                });
            }
            Action::Unknown(name) => {
                warn!("Invalid action was submitted: {}", name);
                return Ok(Acknowledgement {
                    reply: None,
                    follow_up: None,
                });
            }
        };

        Ok(Acknowledgement {
            reply: Some(accepted_notice(&callback.original_message, notice)),
            follow_up: Some(action),
        })
    }

    /// The slow half of a callback; the returned attachment is posted to the channel.
    pub async fn follow_up(
        &self,
        user: &SlackUser,
        original: &Message,
        action: Action,
    ) -> Result<Option<Attachment>, RescheduleError> {
        let base = original
            .attachments
            .first()
            .map(Attachment::cleared)
            .ok_or_else(|| {
                RescheduleError::Transport("no attachments in original message".to_string())
            })?;

        let attachment = match action {
            Action::SelectTarget(target) => self.offer_candidates(&user.id, &target, base).await?,
            Action::SelectTime(time) => self.commit(&user.id, &time, base).await,
            Action::Cancel => Attachment {
                title: format!("@{} canceled.", user.name),
                ..base
            },
            Action::Unknown(name) => {
                warn!("Invalid action was submitted: {}", name);
                return Ok(None);
            }
        };

        Ok(Some(attachment))
    }

    async fn offer_candidates(
        &self,
        acting_user_id: &str,
        target: &TargetSelection,
        base: Attachment,
    ) -> Result<Attachment, RescheduleError> {
        let groupware = self.groupware.as_ref();
        let meeting = groupware
            .find_event(&target.meeting_id)
            .await
            .map_err(|source| RescheduleError::MeetingNotFound {
                id: target.meeting_id.clone(),
                source,
            })?;

        if let Some(shape) = meeting.unsupported_shape() {
            info!("Meeting {} cannot be rescheduled: {}", meeting.id, shape);
            let title = match shape {
                MeetingShape::OpenEnded => OPEN_ENDED_TITLE,
                MeetingShape::MultipleRooms => MULTIPLE_ROOMS_TITLE,
            };
            return Ok(Attachment {
                title: title.to_string(),
                ..base
            });
        }

        let Some(end) = meeting.end.as_ref() else {
            return Err(RescheduleError::UnsupportedMeetingShape(MeetingShape::OpenEnded));
        };

        let rooms = resolve_rooms(groupware, &meeting.rooms, &self.excluded_room_codes).await?;
        let now = (self.clock)();
        let windows = plan_windows(&end.date_time, &now);
        let slots = search_available_slots(groupware, &meeting, &rooms, windows).await?;

        Ok(present_candidates(&meeting.id, &slots, acting_user_id, &self.owner_id)
            .into_attachment(base))
    }

    async fn commit(&self, acting_user_id: &str, time: &TimeSelection, base: Attachment) -> Attachment {
        let title = if acting_user_id != self.owner_id {
            warn!(
                "User {} tried to reschedule meeting {} without permission",
                acting_user_id, time.meeting_id
            );
            NOT_PERMITTED_TITLE
        } else {
            match reschedule_meeting(self.groupware.as_ref(), time).await {
                Ok(_) => RESCHEDULED_TITLE,
                Err(err) => {
                    error!("Failed to update the event: {}", err);
                    RESCHEDULE_FAILED_TITLE
                }
            }
        };

        Attachment {
            title: title.to_string(),
            ..base
        }
    }
}

/// The original message, controls stripped, with `text` in place of its content.
pub fn accepted_notice(original: &Message, text: String) -> Message {
    let mut message = original.clone();
    message.replace_original = true;
    message.response_type = Some("in_channel".to_string());

    if message.attachments.is_empty() {
        message.attachments.push(Attachment::default());
    }
    let first = &mut message.attachments[0];
    first.actions.clear();
    first.text = text;

    message
}
