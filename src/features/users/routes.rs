use crate::features::users::handlers::{profile_handler, user_admin_handler};
use crate::features::users::services::UserProfileService;
use axum::{
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<UserProfileService>) -> Router {
    Router::new()
        .route(
            "/api/users/me",
            get(profile_handler::get_profile)
                .post(profile_handler::register_profile)
                .patch(profile_handler::update_profile),
        )
        .with_state(service)
}

/// Admin user management, nested under `/api/admin`
pub fn admin_routes(service: Arc<UserProfileService>) -> Router {
    Router::new()
        .route("/users", get(user_admin_handler::list_users))
        .route("/users/{id}", patch(user_admin_handler::update_user_access))
        .with_state(service)
}
