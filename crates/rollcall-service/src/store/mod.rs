//! Store operations consumed by the recorder and the finalizer.
//!
//! The trait is the seam between the attendance core and Postgres, so the
//! sweep can be driven against any backend that honours the same upsert rule.

use std::collections::BTreeSet;
use std::future::Future;

use chrono::{NaiveDate, NaiveTime};

use rollcall_db::error::DbResult;
use rollcall_db::model::attendance::{AttendanceRecord, NewAttendance};

use crate::session::ClassSession;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgAttendanceStore;

pub trait AttendanceStore: Send + Sync {
    /// Unfinalized sessions occurring on `today` whose end time is before `now`.
    fn finalization_candidates(
        &self,
        today: NaiveDate,
        now: NaiveTime,
    ) -> impl Future<Output = DbResult<Vec<ClassSession>>> + Send;

    fn is_holiday(&self, date: NaiveDate) -> impl Future<Output = DbResult<bool>> + Send;

    /// Student IDs enrolled in the class.
    fn roster(&self, class_id: i32) -> impl Future<Output = DbResult<BTreeSet<i32>>> + Send;

    /// Student IDs recorded present for the class on `date`.
    fn present_students(
        &self,
        class_id: i32,
        date: NaiveDate,
    ) -> impl Future<Output = DbResult<BTreeSet<i32>>> + Send;

    fn is_enrolled(
        &self,
        class_id: i32,
        student_id: i32,
    ) -> impl Future<Output = DbResult<bool>> + Send;

    /// Insert-or-merge keyed on `(class_id, student_id, session_date)`:
    /// `present` is OR-ed, `confidence` is maxed, `method`/`recorded_at` are replaced.
    fn upsert_attendance(
        &self,
        write: NewAttendance,
    ) -> impl Future<Output = DbResult<AttendanceRecord>> + Send;

    /// Idempotently marks the occurrence of `schedule_id` on `date` finalized.
    fn mark_finalized(
        &self,
        schedule_id: i32,
        date: NaiveDate,
    ) -> impl Future<Output = DbResult<()>> + Send;
}
