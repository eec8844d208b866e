//! Garoon Rescheduler
//!
//! A Slack bot that moves a Garoon meeting to a free slot in the coming business
//! week. Someone asks `@rescheduler search <keyword>`, picks one of the matching
//! meetings, and the bot offers every slot where all attendees and a room from
//! the same facility group are free. The configured owner can then commit one.
//!
//! # Modules
//!
//! - `client`: `GaroonClient` and the `Groupware` trait it implements
//! - `chat`: `SlackClient` for posting follow-up replies
//! - `auth`: Garoon credentials and Slack request verification
//! - `services`: window planning, room resolution, availability search and the
//!   interaction flow
//! - `handlers` / `routes`: the axum HTTP surface
//!
//! # Statelessness
//!
//! Nothing is kept between requests. Every menu option carries the state the
//! next step needs, and Garoon is re-read at every step.

pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod client_mock;
#[cfg(test)]
mod client_test;

// Re-export the main API types for ease of use
pub use auth::{GaroonAuth, SlackVerifier};
pub use chat::{ChatPoster, SlackClient};
pub use client::{GaroonClient, Groupware};
pub use config::Config;
pub use error::RescheduleError;
pub use handlers::AppState;
pub use routes::create_router;
