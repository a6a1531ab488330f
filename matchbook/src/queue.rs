//! Per-side priority queue over (price, arrival sequence, order).
//!
//! A binary heap whose ordering is configured by the side it serves:
//! - Bids: highest price is best
//! - Asks: lowest price is best
//! Ties at a price are broken by arrival sequence, earliest first. The
//! direction lives in the comparator, not in a negated key.
//!
//! There is no remove-by-id, and the book never inserts an exhausted order:
//! a fully filled maker is simply not re-pushed. The matching loop still
//! discards a zero-`remaining` entry if one surfaces at the top. A partially
//! filled order re-pushed with its original (price, seq) pair lands back at
//! the exact priority it held.

use crate::types::{Order, Side};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Entry {
    side: Side,
    price: Decimal,
    seq: u64,
    order: Order,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.price == other.price && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: "greater" surfaces first.
        let by_price = match self.side {
            Side::Buy => self.price.cmp(&other.price),
            Side::Sell => other.price.cmp(&self.price),
        };
        by_price.then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue for one side of the book.
pub struct SideQueue {
    side: Side,
    heap: BinaryHeap<Entry>,
}

impl SideQueue {
    /// Creates an empty queue for the given side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            heap: BinaryHeap::new(),
        }
    }

    /// Inserts an order at `price`. O(log n).
    pub fn push(&mut self, price: Decimal, order: Order) {
        self.heap.push(Entry {
            side: self.side,
            price,
            seq: order.arrival_seq,
            order,
        });
    }

    /// Price of the best entry, if any. O(1).
    pub fn best_price(&self) -> Option<Decimal> {
        self.heap.peek().map(|e| e.price)
    }

    /// Best order without removing it. O(1).
    pub fn peek(&self) -> Option<&Order> {
        self.heap.peek().map(|e| &e.order)
    }

    /// Removes and returns the best entry as (price, order). O(log n).
    pub fn pop(&mut self) -> Option<(Decimal, Order)> {
        self.heap.pop().map(|e| (e.price, e.order))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Visits every entry in arbitrary order; used for snapshot aggregation,
    /// which sorts by price level afterwards.
    pub fn iter(&self) -> impl Iterator<Item = (Decimal, &Order)> {
        self.heap.iter().map(|e| (e.price, &e.order))
    }
}
