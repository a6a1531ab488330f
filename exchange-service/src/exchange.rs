//! Multi-symbol order book registry and order intake.
//!
//! One `OrderBook` per symbol, fixed at startup. The symbol map is a
//! `DashMap`, so lookups across symbols never contend; each book sits behind
//! its own async `RwLock` so matching is serialised per symbol while
//! different symbols match in parallel. Snapshot and trade reads take the
//! read lock, order processing the write lock.
//!
//! Change events are enqueued on a broadcast channel *while the write lock
//! is held* (a non-blocking memory operation, not I/O), so per symbol the
//! event sequence equals the commit sequence. Socket writes happen later in
//! per-subscriber tasks.

use dashmap::DashMap;
use matchbook::{BookSnapshot, Order, OrderBook, OrderId, OrderKind, Trade};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};

use crate::config::Config;
use crate::types::{OrderEvent, PlaceOrderRequest, PlaceOrderResponse};

/// Default window for the recent-trades endpoint.
pub const DEFAULT_TRADE_LIMIT: usize = 200;

/// Capacity of the event broadcast channel; slow subscribers that fall more
/// than this far behind are disconnected.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Errors surfaced to callers of the exchange.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("symbol not found")]
    UnknownSymbol,

    #[error("{0}")]
    Validation(String),
}

/// Central exchange: symbol registry, arrival sequencing, and event fan-out.
pub struct Exchange {
    /// Symbols in listing order
    symbols: Vec<String>,

    /// Symbol -> lock-protected order book
    books: DashMap<String, RwLock<OrderBook>>,

    /// Global arrival-sequence counter; the time component of priority
    next_seq: AtomicU64,

    /// Change event fan-out; one receiver per subscriber
    events: broadcast::Sender<OrderEvent>,

    /// Depth of the snapshot embedded in change events
    snapshot_depth: usize,
}

impl Exchange {
    /// Builds the registry from configuration. Books exist for the process
    /// lifetime; symbols cannot be added afterwards.
    pub fn new(config: &Config) -> Self {
        let books = DashMap::new();
        for symbol in &config.symbols {
            books.insert(
                symbol.clone(),
                RwLock::new(OrderBook::with_trade_capacity(
                    symbol.clone(),
                    config.trade_history,
                )),
            );
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            symbols: config.symbols.clone(),
            books,
            next_seq: AtomicU64::new(1),
            events,
            snapshot_depth: config.snapshot_depth,
        }
    }

    /// Subscribes to change events.
    ///
    /// # Returns
    /// A broadcast receiver that sees events for all symbols, per-symbol in
    /// commit order. Dropping the receiver detaches the subscriber; a
    /// receiver that lags past the channel capacity is disconnected on its
    /// next receive.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.events.subscribe()
    }

    /// Returns all trading symbols supported by the exchange.
    ///
    /// # Returns
    /// Symbol strings in listing order. The set is fixed at startup, so the
    /// ordering is stable across calls.
    pub fn list_symbols(&self) -> Vec<String> {
        self.symbols.clone()
    }

    /// Retrieves an aggregated depth snapshot for a trading symbol.
    ///
    /// # Arguments
    /// * `symbol` - Trading symbol to query (e.g., "SYM1")
    /// * `depth` - Maximum number of price levels to return per side
    ///
    /// # Returns
    /// * `Ok(BookSnapshot)` - Bids descending, asks ascending, each level
    ///   carrying the summed remaining quantity, plus the last traded price
    /// * `Err(ExchangeError::UnknownSymbol)` - Symbol is not registered
    ///
    /// # Concurrency
    /// Takes the book's read lock: concurrent snapshot reads proceed in
    /// parallel, while order processing on the same book is excluded for
    /// the duration. The returned view is consistent; it can never observe
    /// a partially applied match.
    pub async fn get_snapshot(
        &self,
        symbol: &str,
        depth: usize,
    ) -> Result<BookSnapshot, ExchangeError> {
        let book_lock = self.books.get(symbol).ok_or(ExchangeError::UnknownSymbol)?;
        let book = book_lock.read().await;
        Ok(book.snapshot(depth))
    }

    /// Returns the most recent trades for a trading symbol.
    ///
    /// # Arguments
    /// * `symbol` - Trading symbol to query
    /// * `limit` - Maximum number of trades to return
    ///
    /// # Returns
    /// * `Ok(Vec<Trade>)` - Up to `limit` trades, oldest first (most recent
    ///   last), drawn from the book's bounded in-memory ring
    /// * `Err(ExchangeError::UnknownSymbol)` - Symbol is not registered
    ///
    /// # Concurrency
    /// Read lock, as for [`Exchange::get_snapshot`].
    pub async fn recent_trades(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Trade>, ExchangeError> {
        let book_lock = self.books.get(symbol).ok_or(ExchangeError::UnknownSymbol)?;
        let book = book_lock.read().await;
        Ok(book.recent_trades(limit))
    }

    /// Validates the request, materialises an order, matches it under the
    /// book's write lock, and publishes the change event.
    ///
    /// # Arguments
    /// * `req` - Order details: user, symbol, side, kind, price, quantity
    ///
    /// # Returns
    /// * `Ok(PlaceOrderResponse)` - The new order's id, whether any trades
    ///   executed, and the trades themselves
    /// * `Err(ExchangeError::UnknownSymbol)` - Symbol is not registered
    /// * `Err(ExchangeError::Validation)` - Non-positive quantity, or a
    ///   limit order without a positive price
    ///
    /// # Order Processing
    /// 1. Validation failures abort before any state mutation
    /// 2. The order id and arrival sequence are allocated only once
    ///    validation has passed
    /// 3. The write lock is held across matching, the event snapshot, and
    ///    the event enqueue, so the event stream mirrors the commit order
    /// 4. The unmatched remainder of a market order is dropped; the
    ///    response reports only the trades that executed
    ///
    /// # Concurrency
    /// Orders for different symbols match in parallel. Orders for the same
    /// symbol are serialised by the book's write lock, in lock acquisition
    /// order.
    pub async fn place_order(
        &self,
        req: PlaceOrderRequest,
    ) -> Result<PlaceOrderResponse, ExchangeError> {
        let book_lock = self
            .books
            .get(&req.symbol)
            .ok_or(ExchangeError::UnknownSymbol)?;

        if req.qty <= Decimal::ZERO {
            return Err(ExchangeError::Validation(
                "qty must be positive".to_string(),
            ));
        }

        let price = match req.kind {
            OrderKind::Limit => match req.price {
                Some(p) if p > Decimal::ZERO => Some(p),
                _ => {
                    return Err(ExchangeError::Validation(
                        "limit orders require a positive price".to_string(),
                    ))
                }
            },
            // Any price supplied with a market order is ignored.
            OrderKind::Market => None,
        };

        let arrival_seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut order = Order::new(
            OrderId::new(),
            req.user_id,
            req.symbol.clone(),
            req.side,
            req.kind,
            price,
            req.qty,
            arrival_seq,
        );

        let trades = {
            let mut book = book_lock.write().await;
            let trades = book.process_order(&mut order);

            // Snapshot and enqueue under the lock so the event stream
            // mirrors the commit order. Send only fails with zero
            // subscribers, which is fine.
            let snapshot = book.snapshot(self.snapshot_depth);
            let _ = self.events.send(OrderEvent {
                symbol: req.symbol,
                order: order.clone(),
                trades: trades.clone(),
                snapshot,
            });

            trades
        };

        Ok(PlaceOrderResponse {
            order_id: order.id,
            filled: !trades.is_empty(),
            trades,
        })
    }
}
