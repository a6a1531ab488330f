//! Matchbook exchange service.
//!
//! REST intake and market data plus a WebSocket event stream over the
//! in-memory matching core. Symbols are registered at startup and the books
//! are optionally seeded with initial liquidity.

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower_http::cors::CorsLayer;
use tracing::info;

mod config;
mod exchange;
mod seed;
mod types;
mod websocket;

use config::Config;
use exchange::{Exchange, ExchangeError, DEFAULT_TRADE_LIMIT};
use types::*;

const DEFAULT_SNAPSHOT_DEPTH: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let exchange = Arc::new(Exchange::new(&config));

    seed::seed_books(&exchange, config.seed_levels).await;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/symbols", get(list_symbols))
        .route("/symbols/:symbol/orderbook", get(get_orderbook))
        .route("/symbols/:symbol/trades", get(get_trades))
        .route("/orders", post(place_order))
        .route("/ws", get(event_stream))
        .layer(CorsLayer::permissive())
        .with_state(AppState { exchange });

    let addr = config.socket_addr_string();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("matchbook exchange service starting on http://{}", addr);
    info!("symbols: {}", config.symbols.join(", "));
    info!("endpoints:");
    info!("  GET  /health - Health check");
    info!("  GET  /symbols - List available symbols");
    info!("  GET  /symbols/:symbol/orderbook - Aggregated book snapshot");
    info!("  GET  /symbols/:symbol/trades - Recent trades");
    info!("  POST /orders - Place an order");
    info!("  WS   /ws - Order event stream");

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Clone)]
struct AppState {
    exchange: Arc<Exchange>,
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "matchbook-exchange",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }))
}

async fn list_symbols(State(state): State<AppState>) -> impl IntoResponse {
    Json(SymbolsResponse {
        symbols: state.exchange.list_symbols(),
    })
}

async fn get_orderbook(
    Path(symbol): Path<String>,
    Query(params): Query<SnapshotQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ExchangeError> {
    let depth = params.depth.unwrap_or(DEFAULT_SNAPSHOT_DEPTH);
    let snapshot = state.exchange.get_snapshot(&symbol, depth).await?;
    Ok(Json(snapshot))
}

async fn get_trades(
    Path(symbol): Path<String>,
    Query(params): Query<TradesQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ExchangeError> {
    let limit = params.limit.unwrap_or(DEFAULT_TRADE_LIMIT);
    let trades = state.exchange.recent_trades(&symbol, limit).await?;
    Ok(Json(trades))
}

async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ExchangeError> {
    let response = state.exchange.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn event_stream(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| websocket::handle_stream(socket, params.symbol, state))
}

impl IntoResponse for ExchangeError {
    fn into_response(self) -> Response {
        let status = match self {
            ExchangeError::UnknownSymbol => StatusCode::NOT_FOUND,
            ExchangeError::Validation(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}
