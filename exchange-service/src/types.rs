//! API types for REST and WebSocket interfaces.

use matchbook::{BookSnapshot, Order, OrderId, OrderKind, Side, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request to place a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub symbol: String,
    pub side: Side,
    #[serde(default = "default_kind")]
    pub kind: OrderKind,
    /// Required for limit orders; ignored for market orders
    #[serde(default)]
    pub price: Option<Decimal>,
    pub qty: Decimal,
}

fn default_kind() -> OrderKind {
    OrderKind::Limit
}

/// Response after placing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub order_id: OrderId,
    /// True if the order executed at least one trade
    pub filled: bool,
    pub trades: Vec<Trade>,
}

/// List of available trading symbols.
#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
}

/// Query parameters for snapshot requests.
#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub depth: Option<usize>,
}

/// Query parameters for recent-trades requests.
#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<usize>,
}

/// Query parameters for WebSocket subscriptions.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Restrict the stream to a single symbol
    pub symbol: Option<String>,
}

/// Change event published after every accepted order.
///
/// The snapshot is taken under the book lock immediately after the match, so
/// per symbol the event sequence mirrors the commit sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub symbol: String,
    /// The order as accepted, with post-match `remaining`
    pub order: Order,
    pub trades: Vec<Trade>,
    pub snapshot: BookSnapshot,
}

/// WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    OrderEvent(OrderEvent),
    Ping { timestamp: u64 },
    Pong { timestamp: u64 },
}
