//! Attendance reports: the roster for a date, per-student statistics and the
//! dates a class has attendance for.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use rollcall_db::db::connection::DbConnection;
use rollcall_db::db::enums::{AttendanceMethod, AttendanceStatus};
use rollcall_db::db::query::{attendance, enrollment};
use rollcall_db::model::attendance::AttendanceRecord;
use rollcall_db::model::student::Student;

use crate::class::get_class;
use crate::error::ServiceResult;

/// Minimum attendance percentage for the "above threshold" report.
pub const ABOVE_THRESHOLD_PERCENT: f64 = 75.0;

/// One enrolled student's attendance on a date. Students without a record are
/// reported absent with no method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub id: i32,
    pub student_id: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub present: bool,
    pub status: AttendanceStatus,
    pub method: Option<AttendanceMethod>,
    pub confidence: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStats {
    pub id: i32,
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub total_present: i64,
    pub total_sessions: i64,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionDateSummary {
    pub session_date: NaiveDate,
    pub present_count: i64,
    pub total_students: i64,
}

/// ## Summary
/// Percentage of `sessions` attended, rounded to two decimals; 0 without sessions.
#[must_use]
pub fn attendance_percentage(present: i64, sessions: i64) -> f64 {
    let (Ok(present), Ok(sessions)) = (u32::try_from(present), u32::try_from(sessions)) else {
        return 0.0;
    };
    if sessions == 0 {
        return 0.0;
    }
    let raw = f64::from(present) * 100.0 / f64::from(sessions);
    (raw * 100.0).round() / 100.0
}

/// Joins a name-ordered roster with the date's attendance rows.
#[must_use]
pub fn build_roster(students: Vec<Student>, records: Vec<AttendanceRecord>) -> Vec<RosterEntry> {
    let mut by_student: HashMap<i32, AttendanceRecord> =
        records.into_iter().map(|r| (r.student_id, r)).collect();

    students
        .into_iter()
        .map(|student| {
            let record = by_student.remove(&student.id);
            let present = record.as_ref().is_some_and(|r| r.present);
            RosterEntry {
                id: student.id,
                student_id: student.student_code,
                name: student.name,
                photo_url: student.photo_url,
                present,
                status: AttendanceStatus::from_present(present),
                method: record.as_ref().map(|r| r.method),
                confidence: record.as_ref().map(|r| r.confidence),
                recorded_at: record.map(|r| r.recorded_at),
            }
        })
        .collect()
}

/// Computes per-student statistics, ordered by percentage descending, then name.
#[must_use]
pub fn build_stats(
    students: Vec<Student>,
    present_counts: &[(i32, i64)],
    total_sessions: i64,
) -> Vec<StudentStats> {
    let counts: HashMap<i32, i64> = present_counts.iter().copied().collect();

    let mut stats: Vec<StudentStats> = students
        .into_iter()
        .map(|student| {
            let total_present = counts.get(&student.id).copied().unwrap_or(0);
            StudentStats {
                id: student.id,
                student_id: student.student_code,
                name: student.name,
                email: student.email,
                total_present,
                total_sessions,
                attendance_percentage: attendance_percentage(total_present, total_sessions),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.attendance_percentage
            .total_cmp(&a.attendance_percentage)
            .then_with(|| a.name.cmp(&b.name))
    });
    stats
}

#[must_use]
pub fn above_threshold(stats: Vec<StudentStats>) -> Vec<StudentStats> {
    stats
        .into_iter()
        .filter(|s| s.attendance_percentage >= ABOVE_THRESHOLD_PERCENT)
        .collect()
}

/// ## Summary
/// Roster of a class on `date` with each student's attendance.
///
/// ## Errors
/// Returns `NotFound` for an unknown class, `StoreUnavailable` if a query fails.
pub async fn class_roster(
    conn: &mut DbConnection<'_>,
    class_id: i32,
    date: NaiveDate,
) -> ServiceResult<Vec<RosterEntry>> {
    get_class(conn, class_id).await?;
    let students = roster(conn, class_id).await?;
    let records = attendance::for_class_on(conn, class_id, date).await?;
    Ok(build_roster(students, records))
}

/// ## Errors
/// Returns `NotFound` for an unknown class, `StoreUnavailable` if a query fails.
pub async fn class_stats(conn: &mut DbConnection<'_>, class_id: i32) -> ServiceResult<Vec<StudentStats>> {
    get_class(conn, class_id).await?;
    let students = roster(conn, class_id).await?;
    let present_counts = attendance::present_counts(conn, class_id).await?;
    let total_sessions = attendance::session_count(conn, class_id).await?;
    Ok(build_stats(students, &present_counts, total_sessions))
}

/// ## Errors
/// Returns `NotFound` for an unknown class, `StoreUnavailable` if a query fails.
pub async fn students_above_threshold(
    conn: &mut DbConnection<'_>,
    class_id: i32,
) -> ServiceResult<Vec<StudentStats>> {
    Ok(above_threshold(class_stats(conn, class_id).await?))
}

/// ## Summary
/// Dates with at least one present student, newest first, with the roster size.
///
/// ## Errors
/// Returns `NotFound` for an unknown class, `StoreUnavailable` if a query fails.
pub async fn attendance_dates(
    conn: &mut DbConnection<'_>,
    class_id: i32,
) -> ServiceResult<Vec<SessionDateSummary>> {
    get_class(conn, class_id).await?;
    let total_students = i64::try_from(enrollment::roster_ids(conn, class_id).await?.len()).unwrap_or(i64::MAX);
    Ok(attendance::present_counts_by_date(conn, class_id)
        .await?
        .into_iter()
        .map(|(session_date, present_count)| SessionDateSummary {
            session_date,
            present_count,
            total_students,
        })
        .collect())
}

async fn roster(conn: &mut DbConnection<'_>, class_id: i32) -> ServiceResult<Vec<Student>> {
    Ok(enrollment::roster_students(conn, class_id)
        .await?
        .into_iter()
        .map(|(student, _)| student)
        .collect())
}
