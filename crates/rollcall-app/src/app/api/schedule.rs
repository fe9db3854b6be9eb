use salvo::prelude::*;
use serde::Serialize;

use rollcall_core::clock::Clock;
use rollcall_core::constants::SCHEDULE_ROUTE_COMPONENT;
use rollcall_db::db::DbProvider;
use rollcall_db::model::schedule::ClassSchedule;
use rollcall_service::finalizer::{SweepOutcome, SweepReport};
use rollcall_service::schedule::{self, CreateSchedule, ScheduleFields, ScheduleView, TodaySchedule};

use super::{json_body, path_id};
use crate::db_handler::get_db_from_depot;
use crate::error::{AppError, AppResult};
use crate::services::get_services_from_depot;

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub success: bool,
    pub schedule: ClassSchedule,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[handler]
async fn create_schedule(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<ScheduleResponse>> {
    let body: CreateSchedule = json_body(req).await?;
    body.fields.validate()?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;

    let created = schedule::create_schedule(&mut conn, &body).await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(ScheduleResponse {
        success: true,
        schedule: created,
    }))
}

#[handler]
async fn class_schedules(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<ScheduleView>>> {
    let class_id = path_id(req, "class_id")?;
    let today = get_services_from_depot(depot)?.clock.today();
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(schedule::list_for_class(&mut conn, class_id, today).await?))
}

#[handler]
async fn update_schedule(req: &mut Request, depot: &mut Depot) -> AppResult<Json<ScheduleResponse>> {
    let schedule_id = path_id(req, "id")?;
    let body: ScheduleFields = json_body(req).await?;
    body.validate()?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;

    let updated = schedule::update_schedule(&mut conn, schedule_id, &body).await?;

    Ok(Json(ScheduleResponse {
        success: true,
        schedule: updated,
    }))
}

#[handler]
async fn delete_schedule(req: &mut Request, depot: &mut Depot) -> AppResult<Json<SuccessResponse>> {
    let schedule_id = path_id(req, "id")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    schedule::delete_schedule(&mut conn, schedule_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[handler]
async fn today_schedules(depot: &mut Depot) -> AppResult<Json<Vec<TodaySchedule>>> {
    let today = get_services_from_depot(depot)?.clock.today();
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(schedule::list_today(&mut conn, today).await?))
}

/// Runs one finalization sweep now, outside the timer.
#[handler]
async fn finalize_now(depot: &mut Depot) -> AppResult<Json<SweepReport>> {
    let services = get_services_from_depot(depot)?;
    tracing::info!("Manual finalization sweep requested");
    match services.finalizer.sweep().await? {
        SweepOutcome::Completed(report) => Ok(Json(report)),
        SweepOutcome::Skipped => Err(AppError::SweepInProgress),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SCHEDULE_ROUTE_COMPONENT)
        .post(create_schedule)
        .push(Router::with_path("today").get(today_schedules))
        .push(Router::with_path("finalize").post(finalize_now))
        .push(Router::with_path("class/{class_id}").get(class_schedules))
        .push(
            Router::with_path("{id}")
                .put(update_schedule)
                .delete(delete_schedule),
        )
}
