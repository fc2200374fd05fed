pub mod auth;
pub mod extract;
pub mod graduates;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::web::state::AppState;

/// Builds the `/api` router. CORS, Swagger UI and static files are layered on
/// by the binary.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(rest::health_handler))
        .route(
            "/api/clubs",
            get(rest::list_clubs_handler).post(rest::create_club_handler),
        )
        .route("/api/years", get(rest::list_years_handler))
        .route(
            "/api/locations",
            get(rest::list_locations_handler).post(rest::create_location_handler),
        )
        .route(
            "/api/industries",
            get(rest::list_industries_handler).post(rest::create_industry_handler),
        )
        .route(
            "/api/students",
            get(rest::list_students_handler).post(rest::create_student_handler),
        )
        .route(
            "/api/graduate-locations",
            get(graduates::graduate_locations_handler),
        )
        .route("/api/statistics", get(graduates::statistics_handler))
        .route("/api/graduate-map", get(graduates::graduate_map_handler))
        .route("/api/register", post(auth::register_handler))
        .route("/api/login", post(auth::login_handler))
        .route("/api/logout", post(auth::logout_handler))
        .route("/api/verify-session", post(auth::verify_session_handler))
        .with_state(app_state)
}
