//! Multi-symbol limit order book core with price-time priority matching.
//!
//! Core features:
//! - Price-time priority matching (best price first, then arrival order)
//! - Partial fills, maker pricing, limit and market orders
//! - Aggregated depth snapshots and a bounded trade history
//!
//! The matching loop is synchronous and purely in-memory; callers serialise
//! mutations per book (the service wraps each book in an async RwLock).

pub mod queue;
pub mod types;

pub use queue::SideQueue;
pub use types::{Order, OrderId, OrderKind, Side, Trade, TradeId};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Default capacity of the in-memory trade ring. Must stay at or above the
/// largest read window served by the trades endpoint.
pub const DEFAULT_TRADE_CAPACITY: usize = 1000;

/// One aggregated price level of a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub price: Decimal,
    pub qty: Decimal,
}

/// Point-in-time aggregated view of a book.
///
/// Bids are sorted by price descending, asks ascending; every level carries
/// the summed remaining quantity of the live orders resting at that price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
    /// Last traded price, if any trade has executed
    pub last_price: Option<Decimal>,
}

/// Single-symbol order book: two priority queues plus a bounded trade log.
///
/// One instance per symbol. Not thread-safe; wrap in a lock for concurrent
/// access and hold it across `process_order` and any snapshot that must
/// observe the same state.
pub struct OrderBook {
    symbol: String,
    pub bids: SideQueue,
    pub asks: SideQueue,
    trades: VecDeque<Trade>,
    trade_capacity: usize,
    last_price: Option<Decimal>,
}

impl OrderBook {
    /// Creates an empty book for `symbol` with the default trade capacity.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_trade_capacity(symbol, DEFAULT_TRADE_CAPACITY)
    }

    /// Creates an empty book with an explicit trade history capacity.
    pub fn with_trade_capacity(symbol: impl Into<String>, trade_capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            bids: SideQueue::new(Side::Buy),
            asks: SideQueue::new(Side::Sell),
            trades: VecDeque::new(),
            trade_capacity: trade_capacity.max(1),
            last_price: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Last traded price, if any.
    pub fn last_price(&self) -> Option<Decimal> {
        self.last_price
    }

    /// Best (highest) resting bid price.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    /// Best (lowest) resting ask price.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    /// Matches `taker` against the opposite side of the book, greedily and
    /// in priority order, and returns the trades produced.
    ///
    /// Each fill executes at the resting maker's price and decrements both
    /// orders' `remaining`. A partially filled maker keeps its queue
    /// priority. On return, any unfilled limit remainder rests on the
    /// taker's own side of the book; a market remainder is dropped.
    ///
    /// The taker is mutated in place so the caller observes its post-match
    /// `remaining`.
    pub fn process_order(&mut self, taker: &mut Order) -> Vec<Trade> {
        debug_assert_eq!(taker.symbol, self.symbol);
        let mut trades = Vec::new();

        loop {
            if taker.is_filled() {
                break;
            }

            let fill = {
                let opp = match taker.side {
                    Side::Buy => &mut self.asks,
                    Side::Sell => &mut self.bids,
                };

                let Some(best_price) = opp.best_price() else {
                    break; // no liquidity on the opposite side
                };

                // Stale top guard: the book itself never inserts an
                // exhausted order, but an entry pushed through the public
                // queue is discarded here rather than matched.
                if opp.peek().is_some_and(Order::is_filled) {
                    opp.pop();
                    continue;
                }

                if !taker.crosses(best_price) {
                    break; // price gate failed
                }

                let Some((maker_price, mut maker)) = opp.pop() else {
                    break;
                };

                let qty = taker.remaining.min(maker.remaining);
                taker.remaining -= qty;
                maker.remaining -= qty;
                let maker_id = maker.id;

                // Restore a partially filled maker; same (price, seq) puts
                // it back at the head of its level.
                if !maker.is_filled() {
                    opp.push(maker_price, maker);
                }

                (maker_price, qty, maker_id)
            };

            let (price, qty, maker_id) = fill;
            let (buy_order_id, sell_order_id) = match taker.side {
                Side::Buy => (taker.id, maker_id),
                Side::Sell => (maker_id, taker.id),
            };

            let trade = Trade::new(self.symbol.clone(), price, qty, buy_order_id, sell_order_id);
            self.last_price = Some(price);
            self.record_trade(trade.clone());
            trades.push(trade);
        }

        // Rest the limit remainder on its own side. Market remainders are
        // dropped; market orders never rest.
        if !taker.is_filled() && taker.kind == OrderKind::Limit {
            if let Some(price) = taker.price {
                match taker.side {
                    Side::Buy => self.bids.push(price, taker.clone()),
                    Side::Sell => self.asks.push(price, taker.clone()),
                }
            }
        }

        trades
    }

    /// Aggregates up to `depth` best price levels per side.
    ///
    /// Levels sum the remaining quantity of live orders at each price;
    /// exhausted entries are skipped and empty levels never appear.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let bids = aggregate_levels(&self.bids)
            .into_iter()
            .rev()
            .take(depth)
            .map(|(price, qty)| Level { price, qty })
            .collect();

        let asks = aggregate_levels(&self.asks)
            .into_iter()
            .take(depth)
            .map(|(price, qty)| Level { price, qty })
            .collect();

        BookSnapshot {
            bids,
            asks,
            last_price: self.last_price,
        }
    }

    /// Last `n` trades, oldest first (most recent last).
    pub fn recent_trades(&self, n: usize) -> Vec<Trade> {
        let skip = self.trades.len().saturating_sub(n);
        self.trades.iter().skip(skip).cloned().collect()
    }

    fn record_trade(&mut self, trade: Trade) {
        if self.trades.len() >= self.trade_capacity {
            self.trades.pop_front();
        }
        self.trades.push_back(trade);
    }
}

fn aggregate_levels(queue: &SideQueue) -> BTreeMap<Decimal, Decimal> {
    let mut levels = BTreeMap::new();
    for (price, order) in queue.iter() {
        if !order.is_filled() {
            *levels.entry(price).or_insert(Decimal::ZERO) += order.remaining;
        }
    }
    levels
}

#[cfg(test)]
mod ob_tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(
        side: Side,
        kind: OrderKind,
        price: Option<Decimal>,
        qty: Decimal,
        seq: u64,
    ) -> Order {
        Order::new(OrderId::new(), "trader", "SYM1", side, kind, price, qty, seq)
    }

    /// Crossing orders with partial fills; price-time priority across two
    /// makers at one level.
    #[test]
    fn crossing_and_partials() {
        let mut book = OrderBook::new("SYM1");

        // Two asks at the same price; the first has time priority.
        let mut ask1 = order(Side::Sell, OrderKind::Limit, Some(dec!(100)), dec!(50), 1);
        let mut ask2 = order(Side::Sell, OrderKind::Limit, Some(dec!(100)), dec!(40), 2);
        book.process_order(&mut ask1);
        book.process_order(&mut ask2);

        // Crossing bid fills 50 from ask1, then 20 from ask2.
        let mut bid = order(Side::Buy, OrderKind::Limit, Some(dec!(100)), dec!(70), 3);
        let trades = book.process_order(&mut bid);

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].sell_order_id, ask1.id);
        assert_eq!(trades[0].qty, dec!(50));
        assert_eq!(trades[1].sell_order_id, ask2.id);
        assert_eq!(trades[1].qty, dec!(20));

        // Ask2 has 20 remaining on the book; the taker is exhausted.
        assert_eq!(book.best_ask(), Some(dec!(100)));
        assert_eq!(book.asks.len(), 1);
        assert!(bid.is_filled());
    }

    /// Non-crossing orders rest in the book and the spread stays positive.
    #[test]
    fn non_crossing_rests() {
        let mut book = OrderBook::new("SYM1");

        let mut ask = order(Side::Sell, OrderKind::Limit, Some(dec!(105)), dec!(10), 1);
        book.process_order(&mut ask);

        let mut bid = order(Side::Buy, OrderKind::Limit, Some(dec!(104)), dec!(10), 2);
        let trades = book.process_order(&mut bid);

        assert!(trades.is_empty());
        assert_eq!(book.best_bid(), Some(dec!(104)));
        assert_eq!(book.best_ask(), Some(dec!(105)));
    }

    /// Trades always execute at the resting maker's price, not the taker's.
    #[test]
    fn trades_at_maker_price() {
        let mut book = OrderBook::new("SYM1");

        let mut ask = order(Side::Sell, OrderKind::Limit, Some(dec!(110)), dec!(5), 1);
        book.process_order(&mut ask);

        let mut bid = order(Side::Buy, OrderKind::Limit, Some(dec!(115)), dec!(5), 2);
        let trades = book.process_order(&mut bid);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, dec!(110));
        assert_eq!(book.last_price(), Some(dec!(110)));
    }

    /// A market order consumes liquidity and its remainder is discarded.
    #[test]
    fn market_remainder_never_rests() {
        let mut book = OrderBook::new("SYM1");

        let mut ask = order(Side::Sell, OrderKind::Limit, Some(dec!(100)), dec!(1), 1);
        book.process_order(&mut ask);

        let mut market = order(Side::Buy, OrderKind::Market, None, dec!(5), 2);
        let trades = book.process_order(&mut market);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].qty, dec!(1));
        assert_eq!(market.remaining, dec!(4));
        assert!(book.bids.is_empty());
        assert!(book.asks.is_empty());
    }

    /// An exhausted entry at the top of a queue is discarded, never
    /// matched. The book's own matching never inserts one, so this drives
    /// the queue directly.
    #[test]
    fn exhausted_top_of_queue_is_skipped() {
        let mut book = OrderBook::new("SYM1");

        let mut stale = order(Side::Sell, OrderKind::Limit, Some(dec!(100)), dec!(5), 1);
        stale.remaining = Decimal::ZERO;
        book.asks.push(dec!(100), stale);

        let mut live = order(Side::Sell, OrderKind::Limit, Some(dec!(101)), dec!(5), 2);
        book.process_order(&mut live);

        // The bid crosses the stale 100 level first; the guard must pop it
        // and match the live ask behind it at 101.
        let mut bid = order(Side::Buy, OrderKind::Limit, Some(dec!(101)), dec!(5), 3);
        let trades = book.process_order(&mut bid);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].sell_order_id, live.id);
        assert_eq!(trades[0].price, dec!(101));
        assert!(book.asks.is_empty(), "stale entry must be discarded");
        assert!(bid.is_filled());
    }

    /// The trade ring drops its oldest entries once full.
    #[test]
    fn trade_history_is_bounded() {
        let mut book = OrderBook::with_trade_capacity("SYM1", 3);

        for seq in 0..5u64 {
            let mut ask = order(
                Side::Sell,
                OrderKind::Limit,
                Some(dec!(100)),
                dec!(1),
                seq * 2,
            );
            book.process_order(&mut ask);
            let mut bid = order(
                Side::Buy,
                OrderKind::Limit,
                Some(dec!(100)),
                dec!(1),
                seq * 2 + 1,
            );
            book.process_order(&mut bid);
        }

        let trades = book.recent_trades(10);
        assert_eq!(trades.len(), 3);
        // recent_trades clamps to the requested window as well
        assert_eq!(book.recent_trades(2).len(), 2);
    }
}
