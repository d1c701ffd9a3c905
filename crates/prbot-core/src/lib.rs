//! Core logic for the open pull request bot.
//!
//! This crate is framework-agnostic. Telegram and GitHub live behind ports
//! (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod report;
pub mod repos;
pub mod router;
pub mod scheduler;
pub mod security;
pub mod source;

pub use errors::{Error, Result};
