pub mod common;
pub mod meeting;
pub mod slack;
