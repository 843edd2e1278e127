use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, auth, routes};

pub fn create(app_state: AppState) -> Router<()> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(Any);

    Router::new()
        .route("/", get(|| async { "timesheet-api" }))
        .nest("/auth", auth::router())
        .nest("/users", routes::users::router())
        .nest("/project-codes", routes::project_codes::router())
        .nest("/assignments", routes::assignments::router())
        .nest("/timesheets", routes::timesheets::router())
        .nest("/approvals", routes::approvals::router())
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
