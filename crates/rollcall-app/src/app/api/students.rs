use salvo::prelude::*;
use serde::Serialize;

use rollcall_core::constants::STUDENTS_ROUTE_COMPONENT;
use rollcall_db::db::DbProvider;
use rollcall_db::model::student::Student;
use rollcall_service::student::{self, CreateStudent};

use super::{json_body, path_id};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;
use crate::services::get_services_from_depot;

#[derive(Debug, Serialize)]
pub struct StudentCreated {
    pub success: bool,
    pub student: Student,
}

#[derive(Debug, Serialize)]
pub struct StudentDeleted {
    pub success: bool,
    pub message: String,
    /// Whether the face service confirmed removal; `None` when no service is configured.
    pub face_unenrolled: Option<bool>,
}

#[handler]
async fn list_students(depot: &mut Depot) -> AppResult<Json<Vec<Student>>> {
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(student::list_students(&mut conn).await?))
}

#[handler]
async fn create_student(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<StudentCreated>> {
    let body: CreateStudent = json_body(req).await?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;

    let created = student::create_student(&mut conn, &body).await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(StudentCreated {
        success: true,
        student: created,
    }))
}

#[handler]
async fn get_student(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Student>> {
    let student_id = path_id(req, "id")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(student::get_student(&mut conn, student_id).await?))
}

/// Deletes the student, then removes their face encoding on a best-effort basis.
#[handler]
async fn delete_student(req: &mut Request, depot: &mut Depot) -> AppResult<Json<StudentDeleted>> {
    let student_id = path_id(req, "id")?;
    let db = get_db_from_depot(depot)?;
    let deleted = {
        let mut conn = db.get_connection().await?;
        student::delete_student(&mut conn, student_id).await?
    };

    let face_unenrolled = match get_services_from_depot(depot)?.face.as_ref() {
        Some(face) => match face.unenroll(&deleted.student_code).await {
            Ok(()) => Some(true),
            Err(e) => {
                tracing::warn!(student_code = %deleted.student_code, error = %e, "Face unenroll failed");
                Some(false)
            }
        },
        None => None,
    };

    Ok(Json(StudentDeleted {
        success: true,
        message: "Student deleted".to_string(),
        face_unenrolled,
    }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(STUDENTS_ROUTE_COMPONENT)
        .get(list_students)
        .post(create_student)
        .push(
            Router::with_path("{id}")
                .get(get_student)
                .delete(delete_student),
        )
}
