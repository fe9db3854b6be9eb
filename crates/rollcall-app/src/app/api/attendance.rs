use chrono::NaiveDate;
use salvo::prelude::*;
use serde::{Deserialize, Serialize};

use rollcall_core::constants::ATTENDANCE_ROUTE_COMPONENT;
use rollcall_db::db::DbProvider;
use rollcall_db::db::enums::AttendanceMethod;
use rollcall_db::model::attendance::AttendanceRecord;
use rollcall_service::recorder::{RecordAttendance, validate_confidence};
use rollcall_service::report::{self, RosterEntry, SessionDateSummary, StudentStats};
use rollcall_service::student::{StudentRef, resolve_student};

use super::{json_body, path_date, path_id};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::services::get_services_from_depot;

/// Body of `POST /api/attendance/record` as sent by recognition, QR and manual clients.
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub class_id: i32,
    /// Internal ID or display code such as `STU001`.
    pub student_id: StudentRef,
    pub session_date: NaiveDate,
    pub method: Option<AttendanceMethod>,
    pub confidence: Option<f64>,
    pub present: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub success: bool,
    pub attendance: AttendanceRecord,
}

#[handler]
async fn record_attendance(req: &mut Request, depot: &mut Depot) -> AppResult<Json<RecordResponse>> {
    let body: RecordRequest = json_body(req).await?;
    validate_confidence(body.confidence)?;
    let services = get_services_from_depot(depot)?;
    let reference = body.student_id.normalized();

    let student = {
        let db = get_db_from_depot(depot)?;
        let mut conn = db.get_connection().await?;
        resolve_student(&mut conn, &reference).await?
    };
    tracing::debug!(%reference, student_id = student.id, "Resolved student reference");

    let request = RecordAttendance {
        class_id: body.class_id,
        student_id: student.id,
        session_date: body.session_date,
        present: body.present.unwrap_or(true),
        method: body.method.unwrap_or(AttendanceMethod::Face),
        confidence: body.confidence,
    };
    let attendance = services.recorder.record(request).await?;

    Ok(Json(RecordResponse {
        success: true,
        attendance,
    }))
}

#[handler]
async fn roster_on_date(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<RosterEntry>>> {
    let class_id = path_id(req, "class_id")?;
    let date = path_date(req, "date")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(report::class_roster(&mut conn, class_id, date).await?))
}

#[handler]
async fn class_stats(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<StudentStats>>> {
    let class_id = path_id(req, "class_id")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(report::class_stats(&mut conn, class_id).await?))
}

#[handler]
async fn above_threshold(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<StudentStats>>> {
    let class_id = path_id(req, "class_id")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(report::students_above_threshold(&mut conn, class_id).await?))
}

#[handler]
async fn attendance_dates(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Vec<SessionDateSummary>>> {
    let class_id = path_id(req, "class_id")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(report::attendance_dates(&mut conn, class_id).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(ATTENDANCE_ROUTE_COMPONENT)
        .push(Router::with_path("record").post(record_attendance))
        .push(
            Router::with_path("class/{class_id}")
                .push(Router::with_path("date/{date}").get(roster_on_date))
                .push(Router::with_path("stats/above75").get(above_threshold))
                .push(Router::with_path("stats").get(class_stats))
                .push(Router::with_path("dates").get(attendance_dates)),
        )
}
