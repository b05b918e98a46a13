use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub const ALLOW_HEADERS: &str = "Content-Type,Authorization,true";
pub const ALLOW_METHODS: &str = "GET,PUT,POST,DELETE,OPTIONS";

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    // a known path hit with the wrong method answers with the same envelope as an unknown path
    Router::new()
        .route("/health", get(|| async { "ok" }).fallback(handlers::not_found))
        .route("/categories", get(handlers::get_categories).fallback(handlers::not_found))
        .route(
            "/categories/:id/questions",
            get(handlers::get_questions_by_category).fallback(handlers::not_found),
        )
        .route("/questions", post(handlers::search_questions).fallback(handlers::not_found))
        .route("/questions/add", post(handlers::add_question).fallback(handlers::not_found))
        .route(
            "/questions/:id",
            get(handlers::get_questions)
                .delete(handlers::delete_question)
                .fallback(handlers::not_found),
        )
        .route("/quizzes", post(handlers::play_quiz).fallback(handlers::not_found))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            // header layers sit outside cors so preflight answers carry them too
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOW_HEADERS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOW_METHODS),
                ))
                .layer(cors),
        )
}
