use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Action names carried by interactive attachments
pub const ACTION_SELECT_TARGET: &str = "selectTarget";
pub const ACTION_SELECT_TIME: &str = "selectTime";
pub const ACTION_CANCEL: &str = "cancel";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub callback_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<AttachmentAction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    /// Keeps styling and callback id but drops content and controls.
    pub fn cleared(&self) -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            fields: Vec::new(),
            actions: Vec::new(),
            ..self.clone()
        }
    }

    /// A select menu followed by a danger-styled cancel button.
    pub fn with_menu(mut self, action_name: &str, options: Vec<ActionOption>) -> Self {
        self.actions = vec![
            AttachmentAction {
                name: action_name.to_string(),
                kind: "select".to_string(),
                options,
                ..AttachmentAction::default()
            },
            AttachmentAction::cancel_button(),
        ];
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentField {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub short: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentAction {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub style: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ActionOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_options: Vec<ActionOption>,
}

impl AttachmentAction {
    pub fn cancel_button() -> Self {
        Self {
            name: ACTION_CANCEL.to_string(),
            kind: "button".to_string(),
            text: "Cancel".to_string(),
            style: "danger".to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOption {
    pub text: String,
    pub value: String,
}

/// A chat message as Slack hands it back inside an interaction callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replace_original: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackChannel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Payload Slack posts when someone clicks a button or picks a menu option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionCallback {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub user: SlackUser,
    #[serde(default)]
    pub channel: SlackChannel,
    #[serde(default)]
    pub original_message: Message,
    #[serde(default)]
    pub actions: Vec<AttachmentAction>,
    #[serde(default)]
    pub action_ts: String,
    #[serde(default)]
    pub message_ts: String,
    #[serde(default)]
    pub response_url: String,
}

/// Envelopes delivered to the Events API endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    UrlVerification {
        #[serde(default)]
        token: String,
        challenge: String,
    },
    EventCallback {
        #[serde(default)]
        token: String,
        event: SlackEvent,
    },
    #[serde(other)]
    Other,
}

/// Inner event of an `event_callback`. A mention of the bot arrives both as
/// `message` and as `app_mention`; only the former is acted on.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    pub attachments: Vec<&'a Attachment>,
}

#[derive(Debug, Deserialize)]
pub struct PostMessageResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
