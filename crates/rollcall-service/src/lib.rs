//! Attendance recording, session finalization and the request-level services
//! built on top of the store.

pub mod class;
pub mod error;
pub mod face;
pub mod finalizer;
pub mod holiday;
pub mod recorder;
pub mod report;
pub mod schedule;
pub mod session;
pub mod store;
pub mod student;
