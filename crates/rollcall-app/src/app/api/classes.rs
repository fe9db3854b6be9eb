use salvo::prelude::*;
use serde::{Deserialize, Serialize};

use rollcall_core::constants::CLASSES_ROUTE_COMPONENT;
use rollcall_db::db::DbProvider;
use rollcall_db::model::class::Class;
use rollcall_service::class::{self, ClassSummary, CreateClass, EnrolledStudent};

use super::{json_body, path_id};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct ClassCreated {
    pub success: bool,
    pub class: Class,
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub student_id: i32,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[handler]
async fn list_classes(depot: &mut Depot) -> AppResult<Json<Vec<ClassSummary>>> {
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(class::list_classes(&mut conn).await?))
}

#[handler]
async fn create_class(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<ClassCreated>> {
    let body: CreateClass = json_body(req).await?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;

    let created = class::create_class(&mut conn, &body).await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(ClassCreated {
        success: true,
        class: created,
    }))
}

#[handler]
async fn get_class(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Class>> {
    let class_id = path_id(req, "id")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(class::get_class(&mut conn, class_id).await?))
}

#[handler]
async fn delete_class(req: &mut Request, depot: &mut Depot) -> AppResult<Json<MessageResponse>> {
    let class_id = path_id(req, "id")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;

    class::delete_class(&mut conn, class_id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Class deleted".to_string(),
    }))
}

#[handler]
async fn enroll_student(req: &mut Request, depot: &mut Depot) -> AppResult<Json<MessageResponse>> {
    let class_id = path_id(req, "id")?;
    let body: EnrollRequest = json_body(req).await?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;

    let newly_enrolled = class::enroll_student(&mut conn, class_id, body.student_id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: if newly_enrolled {
            "Student enrolled successfully".to_string()
        } else {
            "Student already enrolled".to_string()
        },
    }))
}

#[handler]
async fn class_students(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<EnrolledStudent>>> {
    let class_id = path_id(req, "id")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(class::class_students(&mut conn, class_id).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CLASSES_ROUTE_COMPONENT)
        .get(list_classes)
        .post(create_class)
        .push(
            Router::with_path("{id}")
                .get(get_class)
                .delete(delete_class)
                .push(Router::with_path("enroll").post(enroll_student))
                .push(Router::with_path("students").get(class_students)),
        )
}
