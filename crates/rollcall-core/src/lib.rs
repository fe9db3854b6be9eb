//! Shared configuration, errors and schedule time handling for the attendance service.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;
