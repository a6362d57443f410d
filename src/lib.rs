pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full application router.
///
/// Registration and login are public; everything else resolves an
/// [`middleware::AuthUser`] from the session token before running.
pub fn app(pool: PgPool) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health))
        // Authentication
        .route("/api/users/login", post(handlers::users::login))
        .route("/api/users/me", get(handlers::users::me))
        // Tutors
        .route(
            "/api/tutors",
            post(handlers::tutors::register).get(handlers::tutors::list),
        )
        .route(
            "/api/tutors/:id",
            get(handlers::tutors::get_by_id)
                .put(handlers::tutors::update)
                .delete(handlers::tutors::delete),
        )
        .route("/api/tutors/:id/patients", get(handlers::tutors::patients_of))
        // Patients
        .route(
            "/api/patients",
            post(handlers::patients::register).get(handlers::patients::list),
        )
        .route(
            "/api/patients/:id",
            get(handlers::patients::get_by_id)
                .put(handlers::patients::update)
                .delete(handlers::patients::delete),
        )
        // Employees
        .route(
            "/api/employees",
            post(handlers::employees::register).get(handlers::employees::list),
        )
        .route(
            "/api/employees/:id",
            get(handlers::employees::get_by_id)
                .put(handlers::employees::update)
                .delete(handlers::employees::delete),
        );

    if config::config().server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(pool)
}
