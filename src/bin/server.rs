//! Section Solver HTTP Server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use section_solver::prelude::*;

const DEFAULT_PORT: u16 = 8086;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    sections: Vec<SectionRequest>,
}

#[derive(Debug, Serialize)]
struct SectionResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<SectionResultData>,
}

#[derive(Debug, Serialize)]
struct SectionResultData {
    element_type: ElementType,
    properties: SectionProperties,
    form_factor_y: f64,
    form_factor_z: f64,
    principal_angle: f64,
    principal_moments: [f64; 2],
    radius_of_gyration_y: f64,
    radius_of_gyration_z: f64,
    /// Row-major 12x12 offset/rotation transform
    transform: Vec<Vec<f64>>,
    warnings: Vec<SectionWarning>,
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    success: bool,
    results: Vec<SectionResponse>,
}

impl From<SectionResult<SectionAnalysis>> for SectionResponse {
    fn from(result: SectionResult<SectionAnalysis>) -> Self {
        match result {
            Ok(analysis) => Self {
                success: true,
                error: None,
                results: Some(result_data(analysis)),
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
                results: None,
            },
        }
    }
}

fn result_data(analysis: SectionAnalysis) -> SectionResultData {
    let props = analysis.properties;
    let (i1, i2) = props.principal_moments();
    let transform = analysis
        .transform
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();

    SectionResultData {
        element_type: analysis.element_type,
        form_factor_y: props.form_factor_y(),
        form_factor_z: props.form_factor_z(),
        principal_angle: props.principal_angle(),
        principal_moments: [i1, i2],
        radius_of_gyration_y: props.ry(),
        radius_of_gyration_z: props.rz(),
        properties: props,
        transform,
        warnings: analysis.warnings,
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn section_properties(Json(request): Json<SectionRequest>) -> impl IntoResponse {
    log::info!(
        "section request: {} / {} via {:?}",
        request.geometry.kind(),
        request.element_type,
        request.strategy
    );
    // The Q9 solve is CPU bound; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || request.evaluate()).await;
    let response = match result {
        Ok(result) => SectionResponse::from(result),
        Err(e) => SectionResponse {
            success: false,
            error: Some(format!("section worker failed: {}", e)),
            results: None,
        },
    };
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(response))
}

async fn section_properties_batch(Json(request): Json<BatchRequest>) -> impl IntoResponse {
    log::info!("batch request: {} sections", request.sections.len());
    match tokio::task::spawn_blocking(move || compute_all(&request.sections)).await {
        Ok(results) => {
            let results: Vec<SectionResponse> = results.into_iter().map(SectionResponse::from).collect();
            (
                StatusCode::OK,
                Json(BatchResponse {
                    success: results.iter().all(|r| r.success),
                    results,
                }),
            )
        }
        Err(e) => {
            log::error!("batch worker failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BatchResponse {
                    success: false,
                    results: Vec::new(),
                }),
            )
        }
    }
}

fn server_port() -> u16 {
    match std::env::var("SECTION_SERVER_PORT") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid SECTION_SERVER_PORT '{}'", value);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/section-properties", post(section_properties))
        .route("/api/v1/section-properties/batch", post(section_properties_batch))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port()));
    println!("Section Solver Server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Section:      POST /api/v1/section-properties");
    println!("  Batch:        POST /api/v1/section-properties/batch");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
