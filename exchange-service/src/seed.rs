//! Startup liquidity seeder.
//!
//! Places randomized limit orders on both sides of every book so the
//! service has depth from the first request. Seeds go through the ordinary
//! intake path: they are plain limit orders, subject to matching, and their
//! placement order determines their time priority.

use matchbook::{OrderKind, Side};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::exchange::Exchange;
use crate::types::PlaceOrderRequest;

const SEED_USER: &str = "seed";

/// Seeds `levels` orders per side into every registered book.
pub async fn seed_books(exchange: &Exchange, levels: usize) {
    if levels == 0 {
        return;
    }

    let mut placed = 0usize;
    for symbol in exchange.list_symbols() {
        for i in 0..levels {
            let offset = Decimal::from(i as u32);

            // Bids around 100..110, asks around 110..120; cents precision.
            // The rng handle is not Send, so keep it out of await scope.
            let (bid_price, ask_price) = {
                let mut rng = rand::thread_rng();
                (
                    Decimal::new(rng.gen_range(10_000..11_000), 2) + offset,
                    Decimal::new(rng.gen_range(11_000..12_000), 2) + offset,
                )
            };

            let bid = PlaceOrderRequest {
                user_id: SEED_USER.to_string(),
                symbol: symbol.clone(),
                side: Side::Buy,
                kind: OrderKind::Limit,
                price: Some(bid_price),
                qty: Decimal::from(10 + i as u32),
            };
            let ask = PlaceOrderRequest {
                user_id: SEED_USER.to_string(),
                symbol: symbol.clone(),
                side: Side::Sell,
                kind: OrderKind::Limit,
                price: Some(ask_price),
                qty: Decimal::from(8 + i as u32),
            };

            for req in [bid, ask] {
                match exchange.place_order(req).await {
                    Ok(_) => placed += 1,
                    Err(e) => warn!("seed order rejected: {}", e),
                }
            }
        }
    }

    info!(
        "seeded {} orders across {} symbols",
        placed,
        exchange.list_symbols().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_config() -> Config {
        Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            symbols: vec!["SYM1".to_string(), "SYM2".to_string()],
            snapshot_depth: 10,
            trade_history: 1000,
            seed_levels: 5,
        }
    }

    #[tokio::test]
    async fn seeding_gives_every_book_depth() {
        let config = test_config();
        let exchange = Exchange::new(&config);

        seed_books(&exchange, config.seed_levels).await;

        for symbol in exchange.list_symbols() {
            let snap = exchange.get_snapshot(&symbol, 10).await.unwrap();
            // Overlapping seed prices may have matched, but at least one
            // side of the book always ends up with resting depth.
            assert!(
                !snap.bids.is_empty() || !snap.asks.is_empty(),
                "{} has no depth after seeding",
                symbol
            );
        }
    }

    #[tokio::test]
    async fn zero_levels_disables_seeding() {
        let exchange = Exchange::new(&test_config());

        seed_books(&exchange, 0).await;

        let snap = exchange.get_snapshot("SYM1", 10).await.unwrap();
        assert!(snap.bids.is_empty() && snap.asks.is_empty());
    }
}
