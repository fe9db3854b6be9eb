mod attendance;
mod classes;
mod health;
mod holidays;
mod schedule;
mod students;

use chrono::NaiveDate;
use salvo::{Request, Router};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

// Re-export route constants from core
pub use rollcall_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, ATTENDANCE_ROUTE_PREFIX, CLASSES_ROUTE_PREFIX,
    HOLIDAYS_ROUTE_PREFIX, SCHEDULE_ROUTE_PREFIX, STUDENTS_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the full router: `/health` plus the JSON API under `/api`.
#[must_use]
pub fn routes() -> Router {
    Router::new().push(health::routes()).push(
        Router::with_path(API_ROUTE_COMPONENT)
            .push(classes::routes())
            .push(students::routes())
            .push(attendance::routes())
            .push(schedule::routes())
            .push(holidays::routes()),
    )
}

/// ## Summary
/// Reads a numeric path parameter.
///
/// ## Errors
/// Returns `BadRequest` if the parameter is missing or not an integer.
fn path_id(req: &Request, name: &str) -> AppResult<i32> {
    req.param::<String>(name)
        .and_then(|raw| raw.parse::<i32>().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {name}")))
}

/// ## Summary
/// Reads a `YYYY-MM-DD` path parameter.
///
/// ## Errors
/// Returns `BadRequest` if the parameter is missing or not a date.
fn path_date(req: &Request, name: &str) -> AppResult<NaiveDate> {
    req.param::<String>(name)
        .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {name}, expected YYYY-MM-DD")))
}

/// ## Summary
/// Parses the JSON request body.
///
/// ## Errors
/// Returns `BadRequest` describing the parse failure.
async fn json_body<T: DeserializeOwned>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>().await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to parse request body");
        AppError::BadRequest(format!("Invalid request body: {e}"))
    })
}
