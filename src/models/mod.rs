//! Core data models for study-buddy.

mod config;
mod error;
mod question;

pub use config::*;
pub use error::*;
pub use question::*;
