use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use apify_client::ApifyClient;
use sand_collect::{parse_query_date, parse_query_limit, QueryCollector, TweetSource};
use sand_common::{Config, SandError};
use sand_corpus::QueryFilter;

mod templates;
use templates::*;

// --- App State ---

struct AppState<S> {
    collector: QueryCollector<S>,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sand=info".parse()?)
                .add_directive("apify_client=info".parse()?),
        )
        .init();

    let config = Config::web_from_env()?;
    config.log_redacted();

    let state = Arc::new(AppState {
        collector: QueryCollector::new(ApifyClient::new(config.apify_token.clone())),
    });

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("sand web server starting on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app<S: TweetSource + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/collect", get(collect::<S>))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Method and path only; query strings carry handles and topics
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

// --- Handlers ---

async fn form_page() -> impl IntoResponse {
    Html(render_collect_form())
}

#[derive(Deserialize)]
struct CollectParams {
    handle: Option<String>,
    topic: Option<String>,
    from: Option<String>,
    to: Option<String>,
    limit: Option<String>,
}

async fn collect<S: TweetSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<CollectParams>,
) -> Response {
    let Some(handle) = params.handle.filter(|h| !h.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "no handle provided");
    };

    let filter = match build_filter(&params.topic, &params.from, &params.to, &params.limit) {
        Ok(filter) => filter,
        Err(e) => return sand_error_response(e),
    };

    match state.collector.run(&handle, &filter).await {
        Ok(result) => {
            info!(handle = %result.handle, tweets = result.tweets.len(), "Collect request served");
            Json(result).into_response()
        }
        Err(e) => {
            warn!(handle = %handle, error = %e, "Collect request failed");
            sand_error_response(e)
        }
    }
}

fn build_filter(
    topic: &Option<String>,
    from: &Option<String>,
    to: &Option<String>,
    limit: &Option<String>,
) -> Result<QueryFilter, SandError> {
    Ok(QueryFilter::new(
        topic.as_deref(),
        parse_query_date(from.as_deref())?,
        parse_query_date(to.as_deref())?,
        parse_query_limit(limit.as_deref())?,
    ))
}

fn sand_error_response(e: SandError) -> Response {
    match e {
        SandError::Validation(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        SandError::Scraping(msg) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &msg),
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
