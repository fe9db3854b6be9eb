use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};

use rollcall_db::db::DbProvider;
use rollcall_db::db::connection::DbPool;
use rollcall_db::db::query::{attendance, enrollment, holiday, schedule};
use rollcall_db::error::DbResult;
use rollcall_db::model::attendance::{AttendanceRecord, NewAttendance};

use super::AttendanceStore;
use crate::session::ClassSession;

/// `AttendanceStore` backed by the pooled Postgres connection.
#[derive(Clone)]
pub struct PgAttendanceStore {
    pool: DbPool,
}

impl PgAttendanceStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl std::fmt::Debug for PgAttendanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgAttendanceStore")
            .field("state", &self.pool.state())
            .finish()
    }
}

impl AttendanceStore for PgAttendanceStore {
    async fn finalization_candidates(
        &self,
        today: NaiveDate,
        now: NaiveTime,
    ) -> DbResult<Vec<ClassSession>> {
        let mut conn = self.pool.get_connection().await?;
        let rows = schedule::finalization_candidates(&mut conn, today, now).await?;
        Ok(rows
            .iter()
            .filter_map(|row| ClassSession::resolve(row, today))
            .collect())
    }

    async fn is_holiday(&self, date: NaiveDate) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;
        Ok(holiday::is_holiday(&mut conn, date).await?)
    }

    async fn roster(&self, class_id: i32) -> DbResult<BTreeSet<i32>> {
        let mut conn = self.pool.get_connection().await?;
        let ids = enrollment::roster_ids(&mut conn, class_id).await?;
        Ok(ids.into_iter().collect())
    }

    async fn present_students(&self, class_id: i32, date: NaiveDate) -> DbResult<BTreeSet<i32>> {
        let mut conn = self.pool.get_connection().await?;
        let ids = attendance::present_student_ids(&mut conn, class_id, date).await?;
        Ok(ids.into_iter().collect())
    }

    async fn is_enrolled(&self, class_id: i32, student_id: i32) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;
        Ok(enrollment::is_enrolled(&mut conn, class_id, student_id).await?)
    }

    async fn upsert_attendance(&self, write: NewAttendance) -> DbResult<AttendanceRecord> {
        let mut conn = self.pool.get_connection().await?;
        Ok(attendance::upsert_attendance(&mut conn, &write).await?)
    }

    async fn mark_finalized(&self, schedule_id: i32, date: NaiveDate) -> DbResult<()> {
        let mut conn = self.pool.get_connection().await?;
        let inserted = schedule::mark_finalized(&mut conn, schedule_id, date).await?;
        if inserted == 0 {
            tracing::debug!(schedule_id, session_date = %date, "Session already finalized");
        }
        Ok(())
    }
}
