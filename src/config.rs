use std::collections::HashSet;
use std::env;

use dotenv::dotenv;
use tracing::info;

use crate::error::ConfigError;

/// Runtime settings, read from the environment (optionally via `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Bot user token used to post messages.
    pub slack_bot_token: String,
    /// Shared token Slack embeds in interactive payloads.
    pub slack_verification_token: String,
    pub slack_signing_secret: Option<String>,
    /// Bot user ID; only messages mentioning it are answered.
    pub slack_bot_id: String,
    /// When set, the bot only answers in this channel.
    pub slack_channel_id: Option<String>,
    /// The only user allowed to commit a reschedule.
    pub slack_owner_id: String,
    pub slack_api_endpoint: Option<String>,
    pub garoon_subdomain: String,
    pub garoon_user: String,
    pub garoon_password: String,
    pub garoon_api_endpoint: Option<String>,
    /// Facility codes never offered as substitute rooms.
    pub excluded_room_codes: HashSet<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let port = match optional("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("`{}` is not a port number", raw),
            })?,
            None => 3000,
        };

        let excluded_room_codes =
            parse_room_codes(&optional("GAROON_EXCLUDING_FACILITY_CODE").unwrap_or_default());
        if !excluded_room_codes.is_empty() {
            info!("Excluding {} facility code(s) from room search", excluded_room_codes.len());
        }

        Ok(Self {
            port,
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            slack_verification_token: required("SLACK_VERIFICATION_TOKEN")?,
            slack_signing_secret: optional("SLACK_SIGNING_SECRET"),
            slack_bot_id: required("SLACK_BOT_ID")?,
            slack_channel_id: optional("SLACK_CHANNEL_ID"),
            slack_owner_id: required("SLACK_USER_ID")?,
            slack_api_endpoint: optional("SLACK_API_ENDPOINT"),
            garoon_subdomain: required("GAROON_SUBDOMAIN")?,
            garoon_user: required("GAROON_USER")?,
            garoon_password: required("GAROON_PASSWORD")?,
            garoon_api_endpoint: optional("GAROON_API_ENDPOINT"),
            excluded_room_codes,
        })
    }
}

/// Splits a comma-separated code list, ignoring blanks.
pub fn parse_room_codes(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}
