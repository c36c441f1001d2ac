// src/server.rs
//
// The public surface: one GET route per metric plus a health check, all
// CORS-open so the badge can call cross-origin from any page.

use std::sync::Arc;

use reqwest::Client;
use tracing::error;
use warp::http::StatusCode;
use warp::{reject::Rejection, reply::Reply, Filter};

use crate::cache::TableCache;
use crate::config::Config;
use crate::metrics::Metric;
use crate::resolve::resolve_metric;

/// Everything a request handler needs, cloned into each route.
#[derive(Clone)]
pub struct ServerState {
    pub client: Client,
    pub cache: Arc<TableCache>,
    pub config: Arc<Config>,
}

impl ServerState {
    pub fn new(client: Client, config: Config) -> Self {
        ServerState {
            client,
            cache: Arc::new(TableCache::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

/// The full route tree. Unknown paths fall through to warp's 404.
pub fn routes(
    state: ServerState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET"]);

    health
        .or(metric_route(Metric::NationalDebt, state.clone()))
        .or(metric_route(Metric::Deficit, state.clone()))
        .or(metric_route(Metric::Interest, state.clone()))
        .or(metric_route(Metric::Procurement, state.clone()))
        .or(metric_route(Metric::Payroll, state))
        .with(cors)
}

fn metric_route(
    metric: Metric,
    state: ServerState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path(metric.endpoint())
        .and(warp::path::end())
        .and(warp::get())
        .and_then(move || {
            let state = state.clone();
            async move { metric_reply(metric, state).await }
        })
}

/// Resolve and serve one metric. Failures become a 500 with the error text;
/// the client treats any non-200 as a miss and falls back.
async fn metric_reply(metric: Metric, state: ServerState) -> Result<impl Reply, Rejection> {
    match resolve_metric(&state.client, &state.cache, &state.config, metric).await {
        Ok(value) => Ok(warp::reply::with_status(
            warp::reply::json(&value),
            StatusCode::OK,
        )),
        Err(e) => {
            error!(metric = metric.as_str(), error = %e, "metric resolution failed");
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({ "error": e.to_string() })),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "fiscalmon"
    })))
}
