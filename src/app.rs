//! HTTP routes for the web application and the monitor.

use crate::app_state::{AppState, SharedAppState};
use crate::cli::CommandLineArgs;
use crate::diagnostics::JobRecord;
use crate::error::TrendsError;
use crate::metrics;
use crate::models::{TrendQuery, TrendSeries};
use crate::processor::DatasetStatus;
use crate::validated_query::ValidatedQuery;

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tracing::{event, Level};

/// Page template. `{{ diagnostics_url }}` is replaced when rendering.
const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Placeholder for the diagnostics URL in [INDEX_TEMPLATE].
const DIAGNOSTICS_URL_PLACEHOLDER: &str = "{{ diagnostics_url }}";

/// Trend server Service type alias
///
/// A [Router] wrapped to trim trailing slashes from request paths.
pub type Service = NormalizePath<Router>;

/// Create the shared application state.
///
/// Loads the dataset immediately if eager loading is enabled.
pub async fn init(args: &CommandLineArgs) -> Result<SharedAppState, TrendsError> {
    let state = Arc::new(AppState::new(args));
    if args.eager_load {
        state.processor.load().await?;
    }
    Ok(state)
}

/// Returns a [Service] for the web application.
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn service(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Returns a [Service] for the monitor.
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn monitor_service(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(monitor_router(state))
}

/// Returns a [axum::Router] for the web application.
///
/// The router is populated with all routes as well as the following middleware:
///
/// * a [tower_http::trace::TraceLayer] for tracing requests and responses, which also records
///   request metrics
fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/trends", get(trends))
        .layer(
            TraceLayer::new_for_http()
                .on_request(metrics::request_counter)
                .on_response(metrics::record_response_metrics),
        )
        .with_state(state)
}

/// Returns a [axum::Router] for the monitor.
fn monitor_router(state: SharedAppState) -> Router {
    Router::new()
        .route("/", get(monitor_status))
        .route("/jobs", get(jobs))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Escape text for inclusion in HTML content or attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the page with a diagnostics URL.
fn render_index(diagnostics_url: &str) -> String {
    INDEX_TEMPLATE.replace(DIAGNOSTICS_URL_PLACEHOLDER, &escape_html(diagnostics_url))
}

/// Page render handler.
async fn index(State(state): State<SharedAppState>) -> Html<String> {
    let diagnostics_url = state.processor.diagnostics_url();
    event!(
        Level::DEBUG,
        "Diagnostics URL sent to template: {}",
        diagnostics_url
    );
    Html(render_index(&diagnostics_url))
}

/// Trend query handler.
///
/// Returns the trend series as JSON, or an error response.
///
/// # Arguments
///
/// * `state`: Shared application state
/// * `query`: Validated trend query
async fn trends(
    State(state): State<SharedAppState>,
    ValidatedQuery(query): ValidatedQuery<TrendQuery>,
) -> Result<Json<TrendSeries>, TrendsError> {
    let _task_permit = state.resource_manager.task().await?;
    let series = state.processor.get_trends(&query).await?;
    Ok(Json(series))
}

/// Body of the monitor's status response.
#[derive(Serialize)]
struct MonitorStatus {
    dataset: DatasetStatus,
    jobs: Vec<JobRecord>,
}

async fn monitor_status(State(state): State<SharedAppState>) -> Json<MonitorStatus> {
    Json(MonitorStatus {
        dataset: state.processor.status(),
        jobs: state.processor.jobs().recent(),
    })
}

async fn jobs(State(state): State<SharedAppState>) -> Json<Vec<JobRecord>> {
    Json(state.processor.jobs().recent())
}
