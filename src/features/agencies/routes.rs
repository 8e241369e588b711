use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::agencies::handlers;
use crate::features::agencies::services::AgencyService;

/// Agency directory for signed-in users
pub fn routes(service: Arc<AgencyService>) -> Router {
    Router::new()
        .route("/api/agencies", get(handlers::list_agencies))
        .route("/api/agencies/{id}", get(handlers::get_agency))
        .with_state(service)
}

/// Agency administration, nested under `/api/admin`
pub fn admin_routes(service: Arc<AgencyService>) -> Router {
    Router::new()
        .route("/agencies", post(handlers::create_agency))
        .route(
            "/agencies/{id}",
            put(handlers::update_agency).delete(handlers::delete_agency),
        )
        .with_state(service)
}
