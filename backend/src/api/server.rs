//! HTTP Server for the attendance API.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                               |
//! |--------|---------------|-------------------------------------------|
//! | GET    | `/`           | Welcome message                           |
//! | GET    | `/attendance` | Fetch the export and return nested JSON   |
//! | GET    | `/health`     | Health check                              |
//! | GET    | `/api/logs`   | SSE stream of pipeline logs               |
//!
//! Each `/attendance` request runs the whole fetch and transform pipeline;
//! requests share nothing but the HTTP client.

use axum::{
    extract::State,
    http::{header, HeaderName, Method},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use std::{
    convert::Infallible,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use super::logs::{RequestLog, LOG_BROADCASTER};
use super::types::{ApiError, HealthResponse};
use crate::error::ServerError;
use crate::fetch::{FetchOptions, SourceFetcher};
use crate::transform::pipeline::generate_attendance;

/// Body of `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to SGS Academy Attendance API 🚀";

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

/// Response header carrying the id that tags a request's log entries
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Server bind address and export location
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub fetch: FetchOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            fetch: FetchOptions::default(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Handler state: the export fetcher, nothing mutable.
#[derive(Debug, Clone)]
pub struct AppState {
    fetcher: SourceFetcher,
}

impl AppState {
    pub fn new(fetcher: SourceFetcher) -> Self {
        Self { fetcher }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, REQUEST_ID_HEADER]);

    Router::new()
        .route("/", get(home))
        .route("/attendance", get(attendance))
        .route("/health", get(health))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let fetcher = SourceFetcher::new(config.fetch.clone())?;
    let app = build_router(AppState::new(fetcher));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    println!("🚀 Attendance server running on http://{}", addr);
    println!("   GET /            - Welcome message");
    println!("   GET /attendance  - Attendance grouped by date and class");
    println!("   GET /health      - Health check");
    println!("   GET /api/logs    - SSE log stream");
    println!();
    println!("📄 Source: {}", config.fetch.source_url);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn home() -> &'static str {
    WELCOME_MESSAGE
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "sgs-attendance".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source_url: state.fetcher.source_url().to_string(),
    })
}

/// Fetch, clean and group the export for this request only.
async fn attendance(State(state): State<AppState>) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let log = RequestLog::new(&request_id);
    log.info("GET /attendance");

    let response = match generate_attendance(&state.fetcher, log).await {
        Ok(result) => {
            log.success(format!(
                "Served {} dates from {} rows",
                result.report.len(),
                result.csv_info.row_count
            ));
            Json(result.report).into_response()
        }
        Err(e) => {
            log.error(format!("{} failure: {}", e.kind(), e));
            ApiError::from(e).into_response()
        }
    };

    ([(REQUEST_ID_HEADER, request_id)], response).into_response()
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers just skip what they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
