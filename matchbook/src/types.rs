//! Core data types for the order book.
//!
//! Prices and quantities are `rust_decimal::Decimal`: exact arithmetic (no
//! float dust thresholds) and a total order, which the priority queue needs.
//! Time priority comes from `arrival_seq`, a monotonic counter assigned at
//! intake; wall-clock timestamps on trades are informational only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Order side - Buy (bid) or Sell (ask).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// Order execution type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Execute only at the limit price or better; may rest in the book
    Limit,
    /// Execute immediately at best available prices; never rests
    Market,
}

/// Unique order identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique trade identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeId(pub Uuid);

/// Complete order specification.
///
/// `remaining` is the only field that mutates after construction; it starts
/// at `qty` and decreases monotonically as fills execute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    /// Limit price; `None` for market orders
    pub price: Option<Decimal>,
    pub qty: Decimal,
    pub remaining: Decimal,
    /// Monotonic intake counter; the time component of price-time priority
    pub arrival_seq: u64,
}

impl Order {
    /// Creates a new order with `remaining = qty`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        user_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        kind: OrderKind,
        price: Option<Decimal>,
        qty: Decimal,
        arrival_seq: u64,
    ) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            symbol: symbol.into(),
            side,
            kind,
            price,
            qty,
            remaining: qty,
            arrival_seq,
        }
    }

    /// Whether this order is willing to trade against a resting order at
    /// `resting_price`. Market orders accept any price; limit orders accept
    /// prices at or better than their limit.
    pub fn crosses(&self, resting_price: Decimal) -> bool {
        match self.kind {
            OrderKind::Market => true,
            OrderKind::Limit => match (self.side, self.price) {
                (Side::Buy, Some(limit)) => limit >= resting_price,
                (Side::Sell, Some(limit)) => limit <= resting_price,
                (_, None) => false,
            },
        }
    }

    /// True once the order has no quantity left to trade.
    pub fn is_filled(&self) -> bool {
        self.remaining <= Decimal::ZERO
    }
}

/// Trade execution record. Created when two orders match; never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: String,
    /// Execution price (always the resting maker's price)
    pub price: Decimal,
    pub qty: Decimal,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    /// Wall-clock execution time, milliseconds since epoch
    pub ts_ms: u64,
}

impl Trade {
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        qty: Decimal,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
    ) -> Self {
        Self {
            id: TradeId(Uuid::new_v4()),
            symbol: symbol.into(),
            price,
            qty,
            buy_order_id,
            sell_order_id,
            ts_ms: unix_millis(),
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_starts_fully_unfilled() {
        let o = Order::new(
            OrderId::new(),
            "alice",
            "SYM1",
            Side::Buy,
            OrderKind::Limit,
            Some(dec!(101.50)),
            dec!(25),
            1,
        );

        assert_eq!(o.remaining, o.qty);
        assert!(!o.is_filled());
        assert!(o.crosses(dec!(101.50)));
        assert!(o.crosses(dec!(100)));
        assert!(!o.crosses(dec!(102)));
    }

    #[test]
    fn market_order_crosses_any_price() {
        let o = Order::new(
            OrderId::new(),
            "bob",
            "SYM1",
            Side::Sell,
            OrderKind::Market,
            None,
            dec!(5),
            2,
        );

        assert!(o.crosses(dec!(0.01)));
        assert!(o.crosses(dec!(1000000)));
    }
}
