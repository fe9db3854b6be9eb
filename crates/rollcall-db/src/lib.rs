//! Postgres persistence for classes, rosters, schedules and attendance.

pub mod db;
pub mod error;
pub mod model;
