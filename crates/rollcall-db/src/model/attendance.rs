use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::{enums::AttendanceMethod, schema};

/// The unique attendance fact for one student in one class on one date.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::attendance)]
#[diesel(check_for_backend(Pg))]
pub struct AttendanceRecord {
    pub id: i32,
    pub class_id: i32,
    pub student_id: i32,
    pub session_date: chrono::NaiveDate,
    pub present: bool,
    /// Generated from `present`: "present" or "absent".
    pub status: String,
    pub method: AttendanceMethod,
    pub confidence: f64,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for an attendance upsert. `status` is generated by the database.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = schema::attendance)]
pub struct NewAttendance {
    pub class_id: i32,
    pub student_id: i32,
    pub session_date: chrono::NaiveDate,
    pub present: bool,
    pub method: AttendanceMethod,
    pub confidence: f64,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}
