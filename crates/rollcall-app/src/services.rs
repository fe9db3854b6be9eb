//! Long-lived services shared by every request: the recorder, the finalizer,
//! the clock and the optional face-service client.

use std::sync::Arc;

use salvo::async_trait;

use rollcall_core::clock::Clock;
use rollcall_core::error::CoreError;
use rollcall_service::face::FaceServiceClient;
use rollcall_service::finalizer::SessionFinalizer;
use rollcall_service::recorder::AttendanceRecorder;
use rollcall_service::store::PgAttendanceStore;

use crate::error::AppResult;

#[derive(Debug)]
pub struct AppServices {
    pub recorder: AttendanceRecorder<PgAttendanceStore>,
    pub finalizer: Arc<SessionFinalizer<PgAttendanceStore>>,
    pub clock: Arc<dyn Clock>,
    pub face: Option<FaceServiceClient>,
}

pub struct ServicesHandler {
    pub services: Arc<AppServices>,
}

#[async_trait]
impl salvo::Handler for ServicesHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.services));
    }
}

/// ## Summary
/// Retrieves the shared services from the depot.
///
/// ## Errors
/// Returns an error if the services were not injected.
pub fn get_services_from_depot(depot: &salvo::Depot) -> AppResult<Arc<AppServices>> {
    depot
        .obtain::<Arc<AppServices>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Services not found in depot").into())
}
