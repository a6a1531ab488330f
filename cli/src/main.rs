use clap::{Parser, Subcommand};
use matchbook::{OrderKind, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "matchbook-cli")]
#[command(about = "Matchbook CLI - Command line client for the exchange")]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place an order
    Submit {
        #[arg(short, long, default_value = "cli")]
        user: String,
        #[arg(short = 's', long)]
        symbol: String,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(short = 'k', long, default_value = "limit", value_parser = parse_kind)]
        kind: OrderKind,
        #[arg(short = 'p', long)]
        price: Option<Decimal>,
        #[arg(short = 'q', long)]
        qty: Decimal,
    },
    /// List available symbols
    Symbols,
    /// Show the aggregated book for a symbol
    Book {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "10")]
        depth: usize,
    },
    /// Show recent trades for a symbol
    Trades {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Check service health
    Health,
}

#[derive(Serialize)]
struct PlaceOrderRequest {
    user_id: String,
    symbol: String,
    side: Side,
    kind: OrderKind,
    price: Option<Decimal>,
    qty: Decimal,
}

#[derive(Deserialize)]
struct PlaceOrderResponse {
    order_id: String,
    filled: bool,
    trades: Vec<Trade>,
}

#[derive(Deserialize)]
struct Trade {
    price: Decimal,
    qty: Decimal,
}

#[derive(Deserialize)]
struct SymbolsResponse {
    symbols: Vec<String>,
}

#[derive(Deserialize)]
struct Level {
    price: Decimal,
    qty: Decimal,
}

#[derive(Deserialize)]
struct BookSnapshot {
    bids: Vec<Level>,
    asks: Vec<Level>,
    last_price: Option<Decimal>,
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.to_lowercase().as_str() {
        "buy" | "bid" => Ok(Side::Buy),
        "sell" | "ask" => Ok(Side::Sell),
        _ => Err(format!("Invalid side: {}. Use 'buy' or 'sell'", s)),
    }
}

fn parse_kind(s: &str) -> Result<OrderKind, String> {
    match s.to_lowercase().as_str() {
        "limit" => Ok(OrderKind::Limit),
        "market" => Ok(OrderKind::Market),
        _ => Err(format!("Invalid kind: {}. Use 'limit' or 'market'", s)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Submit {
            user,
            symbol,
            side,
            kind,
            price,
            qty,
        } => {
            let request = PlaceOrderRequest {
                user_id: user,
                symbol,
                side,
                kind,
                price,
                qty,
            };

            let response = client
                .post(format!("{}/orders", cli.server))
                .json(&request)
                .send()
                .await?;

            if response.status().is_success() {
                let result: PlaceOrderResponse = response.json().await?;

                println!("Order ID: {}", result.order_id);
                println!("Filled: {}", result.filled);

                if !result.trades.is_empty() {
                    println!("Trades executed: {}", result.trades.len());
                    for trade in result.trades {
                        println!("  {} @ {}", trade.qty, trade.price);
                    }
                }
            } else {
                println!("Error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }

        Commands::Symbols => {
            let response = client
                .get(format!("{}/symbols", cli.server))
                .send()
                .await?;

            if response.status().is_success() {
                let symbols: SymbolsResponse = response.json().await?;
                for symbol in symbols.symbols {
                    println!("{}", symbol);
                }
            } else {
                println!("Error: {}", response.status());
            }
        }

        Commands::Book { symbol, depth } => {
            let response = client
                .get(format!(
                    "{}/symbols/{}/orderbook?depth={}",
                    cli.server, symbol, depth
                ))
                .send()
                .await?;

            if response.status().is_success() {
                let book: BookSnapshot = response.json().await?;

                println!("Book for {}", symbol);
                println!("\nAsks:");
                for (i, level) in book.asks.iter().enumerate().rev() {
                    println!("  {}: {} @ {}", i + 1, level.qty, level.price);
                }
                println!("\nBids:");
                for (i, level) in book.bids.iter().enumerate() {
                    println!("  {}: {} @ {}", i + 1, level.qty, level.price);
                }
                if let Some(ltp) = book.last_price {
                    println!("\nLast traded price: {}", ltp);
                }
            } else {
                println!("Error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }

        Commands::Trades { symbol, limit } => {
            let response = client
                .get(format!(
                    "{}/symbols/{}/trades?limit={}",
                    cli.server, symbol, limit
                ))
                .send()
                .await?;

            if response.status().is_success() {
                let trades: Vec<Trade> = response.json().await?;
                println!("Recent trades for {} ({}):", symbol, trades.len());
                for trade in trades {
                    println!("  {} @ {}", trade.qty, trade.price);
                }
            } else {
                println!("Error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.server))
                .send()
                .await?;

            if response.status().is_success() {
                let health: serde_json::Value = response.json().await?;
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("Error: {}", response.status());
            }
        }
    }

    Ok(())
}
