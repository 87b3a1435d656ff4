//! HTTP handler functions for the agro-report API.

use actix_web::{HttpResponse, web};
use agro_report_analytics::AggregateError;
use agro_report_analytics::engine::aggregate;
use agro_report_analytics_models::{AggregationMode, ChartQuery};
use agro_report_server_models::{ApiHealth, ChartQueryParams, LabelMenuParams};
use agro_report_taxonomy::{Analysis, sources};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/menu/analyses`
///
/// Lists the available analysis types.
pub async fn menu_analyses() -> HttpResponse {
    HttpResponse::Ok().json(Analysis::all())
}

/// `GET /api/menu/sources`
///
/// Lists the research institutions and organizations that supply data.
pub async fn menu_sources() -> HttpResponse {
    HttpResponse::Ok().json(sources())
}

/// `GET /api/menu/labels?analysis=`
///
/// Lists the labels valid within one analysis. Unknown or missing analysis
/// is a client error, not a crash.
pub async fn menu_labels(params: web::Query<LabelMenuParams>) -> HttpResponse {
    let Some(name) = params.analysis.as_deref().filter(|a| !a.trim().is_empty()) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "required parameter missing: analysis"
        }));
    };

    match Analysis::from_name(name) {
        Some(analysis) => HttpResponse::Ok().json(analysis.labels()),
        None => HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("invalid or unknown analysis: {name}")
        })),
    }
}

/// `GET /api/charts/sum`
pub async fn chart_sum(
    state: web::Data<AppState>,
    params: web::Query<ChartQueryParams>,
) -> HttpResponse {
    run_chart(&state, params.into_inner(), AggregationMode::Sum).await
}

/// `GET /api/charts/percentage`
///
/// Percentage-of-bucket shares: shares within one bucket sum to ~100.
pub async fn chart_percentage(
    state: web::Data<AppState>,
    params: web::Query<ChartQueryParams>,
) -> HttpResponse {
    run_chart(&state, params.into_inner(), AggregationMode::BucketShare).await
}

/// `GET /api/charts/percentage-total`
///
/// Percentage-of-query shares: shares across the whole result sum to ~100.
pub async fn chart_percentage_total(
    state: web::Data<AppState>,
    params: web::Query<ChartQueryParams>,
) -> HttpResponse {
    run_chart(&state, params.into_inner(), AggregationMode::GrandTotalShare).await
}

/// `GET /api/charts/label-share`
pub async fn chart_label_share(
    state: web::Data<AppState>,
    params: web::Query<ChartQueryParams>,
) -> HttpResponse {
    run_chart(&state, params.into_inner(), AggregationMode::LabelShare).await
}

/// Runs one aggregation and translates engine errors into status codes:
/// `Validation` → 400, `NotFound` → 404, `Upstream` → 500.
async fn run_chart(
    state: &web::Data<AppState>,
    params: ChartQueryParams,
    mode: AggregationMode,
) -> HttpResponse {
    let query: ChartQuery = params.into();
    let today = chrono::Utc::now().date_naive();

    match aggregate(state.db.as_ref(), mode, &query, today).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e @ AggregateError::Validation(_)) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
        Err(e @ AggregateError::NotFound) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() }))
        }
        Err(e @ AggregateError::Upstream(_)) => {
            log::error!("Chart aggregation failed: {e:?}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to aggregate observations"
            }))
        }
    }
}
