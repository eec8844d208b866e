use std::sync::Arc;

use tracing::{debug, info};

use crate::client::Groupware;
use crate::error::RescheduleError;
use crate::models::common::format_readable;
use crate::models::slack::{ActionOption, Attachment, MessageEvent, ACTION_SELECT_TARGET};
use crate::services::interaction::Clock;
use crate::services::token::TargetSelection;

pub const USAGE_HINT: &str = "Would you mind ordering like `@rescheduler search Foo`?";
pub const TARGET_TITLE: &str = "Which schedule do you intend? :calendar:";

/// A mention addressed to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Usage,
}

impl Command {
    /// `None` when the text does not start with a mention of `bot_id`.
    pub fn parse(text: &str, bot_id: &str) -> Option<Self> {
        let mention = format!("<@{}> ", bot_id);
        if !text.starts_with(&mention) {
            return None;
        }

        let words: Vec<&str> = text.trim().split(' ').skip(1).collect();
        match words.as_slice() {
            ["search", keyword] if !keyword.is_empty() => Some(Command::Search(keyword.to_string())),
            _ => Some(Command::Usage),
        }
    }
}

/// Answers `@bot search <keyword>` with a menu of matching meetings.
pub struct CommandHandler {
    groupware: Arc<dyn Groupware>,
    bot_id: String,
    channel_id: Option<String>,
    clock: Clock,
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("bot_id", &self.bot_id)
            .field("channel_id", &self.channel_id)
            .finish_non_exhaustive()
    }
}

impl CommandHandler {
    pub fn new(
        groupware: Arc<dyn Groupware>,
        bot_id: impl Into<String>,
        channel_id: Option<String>,
        clock: Clock,
    ) -> Self {
        Self {
            groupware,
            bot_id: bot_id.into(),
            channel_id,
            clock,
        }
    }

    /// Whether the event is a mention we should answer.
    pub fn accepts(&self, event: &MessageEvent) -> Option<Command> {
        if event.bot_id.is_some() || event.subtype.is_some() {
            return None;
        }
        if let Some(channel_id) = &self.channel_id {
            if &event.channel != channel_id {
                debug!("Ignoring message from channel {}", event.channel);
                return None;
            }
        }
        Command::parse(&event.text, &self.bot_id)
    }

    pub async fn handle(&self, command: Command) -> Result<Attachment, RescheduleError> {
        let keyword = match command {
            Command::Search(keyword) => keyword,
            Command::Usage => {
                return Ok(Attachment {
                    text: USAGE_HINT.to_string(),
                    color: "#00bfff".to_string(),
                    ..Attachment::default()
                })
            }
        };

        let events = self
            .groupware
            .search_events(&keyword, (self.clock)())
            .await?;
        info!("Found {} schedule(s) matching `{}`", events.len(), keyword);

        if events.is_empty() {
            return Ok(Attachment {
                title: format!("No schedule matched `{}`.", keyword),
                color: "#32cd32".to_string(),
                ..Attachment::default()
            });
        }

        let options = events
            .iter()
            .map(|event| ActionOption {
                text: format!("{} {}", format_readable(&event.start.date_time), event.subject),
                value: TargetSelection::new(event.id.clone(), event.subject.clone()).encode(),
            })
            .collect();

        Ok(Attachment {
            title: TARGET_TITLE.to_string(),
            color: "#32cd32".to_string(),
            callback_id: "target".to_string(),
            ..Attachment::default()
        }
        .with_menu(ACTION_SELECT_TARGET, options))
    }
}
