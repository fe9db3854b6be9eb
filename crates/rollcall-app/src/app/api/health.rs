use chrono::{DateTime, Utc};
use salvo::prelude::*;
use serde::Serialize;

use rollcall_core::constants::SERVICE_NAME;
use rollcall_db::db::DbProvider;

use crate::db_handler::get_db_from_depot;
use crate::services::get_services_from_depot;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: &'static str,
    pub face_service: &'static str,
    pub sweep_running: bool,
}

/// Reports process liveness; dependency checks never fail the request.
#[handler]
async fn health(depot: &mut Depot) -> Json<HealthResponse> {
    let database = match get_db_from_depot(depot) {
        Ok(db) => match db.get_connection().await {
            Ok(_conn) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Health check could not reach the database");
                "unavailable"
            }
        },
        Err(_) => "not_configured",
    };

    let (face_service, sweep_running) = match get_services_from_depot(depot) {
        Ok(services) => {
            let face = match &services.face {
                Some(client) if client.health().await => "ok",
                Some(_) => "unavailable",
                None => "disabled",
            };
            (face, services.finalizer.is_sweeping())
        }
        Err(_) => ("disabled", false),
    };

    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        timestamp: Utc::now(),
        database,
        face_service,
        sweep_running,
    })
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("health").get(health)
}
