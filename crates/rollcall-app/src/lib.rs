//! HTTP surface of the attendance tracker.

pub mod app;
pub mod config;
pub mod db_handler;
pub mod error;
pub mod services;
