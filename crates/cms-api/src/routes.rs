//! Router assembly

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::error::ApiError;
use crate::handlers::{admin, articles, auth, health, menus, navigation, pages};
use crate::middleware::admin_gate;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let api_routes = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/pages", get(pages::list_pages).post(pages::create_page))
        .route(
            "/api/pages/{id}",
            get(pages::get_page)
                .put(pages::update_page)
                .delete(pages::delete_page),
        )
        .route("/api/menu", get(menus::list_menus).post(menus::create_menu))
        .route(
            "/api/menu/{id}",
            get(menus::get_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route(
            "/api/menu/{id}/pages/{page_id}",
            post(menus::attach_page).delete(menus::detach_page),
        )
        .route("/api/navigation", get(navigation::navigation))
        .route(
            "/api/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route("/api/articles/{slug}", get(articles::get_article));

    // Admin paths come from configuration; the gate layer below covers them.
    let admin_settings = &state.config.admin;
    let admin_routes = Router::new()
        .route(&admin_settings.prefix, get(admin::overview))
        .route(&admin_settings.login_path, get(admin::login_hint));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(admin_routes)
        // Unknown admin paths still pass through the gate before the 404
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), admin_gate))
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}
