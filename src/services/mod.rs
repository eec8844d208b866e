pub mod availability;
pub mod commands;
pub mod follow_up;
pub mod interaction;
pub mod presenter;
pub mod reschedule;
pub mod rooms;
pub mod time_windows;
pub mod token;
