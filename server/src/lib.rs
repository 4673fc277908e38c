use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use catalog::persist::{load_catalog, CatalogPaths};
use catalog::{recommend, search, Catalog, RecommendError, SearchHit};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod pages;

/// Raw `key=value` pairs. Repeated keys are kept so the first one can win.
type Fields = Vec<(String, String)>;

fn first_value(fields: Fields, key: &str) -> Option<String> {
    fields.into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

/// Load the catalog from `data_dir` and build the router. Fails if any artifact is missing or corrupt.
pub fn build_app(data_dir: String) -> Result<Router> {
    let paths = CatalogPaths::new(&data_dir);
    let catalog = load_catalog(&paths).with_context(|| format!("loading catalog from {data_dir}"))?;
    Ok(router(Arc::new(catalog)))
}

pub fn router(catalog: Arc<Catalog>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(AnyOrigin).allow_methods(AnyOrigin).allow_headers(AnyOrigin)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(AnyOrigin).allow_headers(AnyOrigin)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(AnyOrigin).allow_methods(AnyOrigin).allow_headers(AnyOrigin),
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/recommend", get(recommend_form_handler).post(recommend_handler))
        .fallback(not_found_handler)
        .with_state(AppState { catalog })
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
}

pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::index_page(state.catalog.popular()))
}

pub async fn search_handler(State(state): State<AppState>, params: Result<Query<Fields>, QueryRejection>) -> Json<Vec<SearchHit>> {
    let query = match params {
        Ok(Query(fields)) => first_value(fields, "query"),
        Err(e) => {
            tracing::debug!(error = %e, "unreadable search query string");
            None
        }
    };
    let hits = search(&state.catalog, query.as_deref());
    tracing::debug!(?query, hits = hits.len(), "search");
    Json(hits)
}

pub async fn recommend_form_handler() -> Html<String> {
    Html(pages::recommend_form())
}

pub async fn recommend_handler(State(state): State<AppState>, form: Result<Form<Fields>, FormRejection>) -> Html<String> {
    let book_name = match form {
        Ok(Form(fields)) => first_value(fields, "book_name"),
        Err(e) => {
            tracing::debug!(error = %e, "unreadable recommend form");
            None
        }
    };
    let book_name = match book_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Html(pages::error_page(pages::MSG_EMPTY_TITLE)),
    };

    match recommend(&state.catalog, &book_name) {
        Ok(recs) => Html(pages::recommendations_page(&book_name, &recs)),
        Err(RecommendError::NotFound { title }) => {
            tracing::debug!(%title, "no similarity row for title");
            Html(pages::error_page(pages::MSG_BOOK_NOT_FOUND))
        }
        Err(e) => {
            tracing::error!(error = %e, book = %book_name, "recommendation failed");
            Html(pages::error_page(pages::MSG_INTERNAL))
        }
    }
}

pub async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::error_page(pages::MSG_PAGE_NOT_FOUND)))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(%detail, "handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::error_page(pages::MSG_INTERNAL))).into_response()
}
