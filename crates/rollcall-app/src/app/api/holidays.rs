use salvo::prelude::*;
use serde::Serialize;

use rollcall_core::constants::HOLIDAYS_ROUTE_COMPONENT;
use rollcall_db::db::DbProvider;
use rollcall_db::model::holiday::Holiday;
use rollcall_service::holiday::{self, CreateHoliday};

use super::{json_body, path_date};
use crate::db_handler::get_db_from_depot;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct HolidayResponse {
    pub success: bool,
    pub holiday: Holiday,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[handler]
async fn list_holidays(depot: &mut Depot) -> AppResult<Json<Vec<Holiday>>> {
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(holiday::list_holidays(&mut conn).await?))
}

#[handler]
async fn add_holiday(req: &mut Request, depot: &mut Depot) -> AppResult<Json<HolidayResponse>> {
    let body: CreateHoliday = json_body(req).await?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    Ok(Json(HolidayResponse {
        success: true,
        holiday: holiday::add_holiday(&mut conn, body).await?,
    }))
}

#[handler]
async fn remove_holiday(req: &mut Request, depot: &mut Depot) -> AppResult<Json<SuccessResponse>> {
    let date = path_date(req, "date")?;
    let db = get_db_from_depot(depot)?;
    let mut conn = db.get_connection().await?;
    holiday::remove_holiday(&mut conn, date).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(HOLIDAYS_ROUTE_COMPONENT)
        .get(list_holidays)
        .post(add_holiday)
        .push(Router::with_path("{date}").delete(remove_holiday))
}
