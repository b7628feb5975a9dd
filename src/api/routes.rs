use crate::AppState;
use crate::api::{cors::cors_middleware, handlers};
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub fn create_router() -> Router<AppState> {
    let dashboard = Router::new()
        .route(
            "/projects",
            get(handlers::dashboard::list_projects).post(handlers::dashboard::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::dashboard::get_project).delete(handlers::dashboard::delete_project),
        )
        .route(
            "/tasks",
            get(handlers::dashboard::list_tasks).post(handlers::dashboard::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::dashboard::get_task)
                .patch(handlers::dashboard::update_task)
                .delete(handlers::dashboard::delete_task),
        )
        .route(
            "/tasks/{id}/status",
            put(handlers::dashboard::set_task_status),
        )
        .route(
            "/team",
            get(handlers::dashboard::list_team).post(handlers::dashboard::add_team_member),
        )
        .route("/team/summary", get(handlers::dashboard::team_summary))
        .route("/team/{id}", delete(handlers::dashboard::remove_team_member))
        .route(
            "/notes",
            get(handlers::dashboard::list_notes).post(handlers::dashboard::create_note),
        )
        .route(
            "/notes/{id}",
            get(handlers::dashboard::get_note)
                .put(handlers::dashboard::update_note)
                .delete(handlers::dashboard::delete_note),
        );

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/chat", post(handlers::chat::chat))
        .nest("/dashboard", dashboard)
}

/// Full application: API routes under `/api`, the legacy function path for
/// the chat proxy, and the shared middleware stack.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config_manager.config().server.body_limit_bytes;

    Router::new()
        .nest("/api", create_router())
        .route("/functions/v1/gemini-chat", post(handlers::chat::chat))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}
