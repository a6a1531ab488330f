//! Configuration for the exchange service.
//!
//! Defaults work out of the box; override via environment variables:
//!
//! - `MATCHBOOK_BIND_ADDR`      (default: "0.0.0.0")
//! - `MATCHBOOK_PORT`           (default: "8080")
//! - `MATCHBOOK_SYMBOLS`        (comma-separated, default: "SYM1,...,SYM10")
//! - `MATCHBOOK_SNAPSHOT_DEPTH` (default: "10")
//! - `MATCHBOOK_TRADE_HISTORY`  (default: "1000")
//! - `MATCHBOOK_SEED_LEVELS`    (default: "5"; "0" disables seeding)

use std::env;
use std::str::FromStr;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to
    pub bind_addr: String,

    /// TCP port to listen on
    pub port: u16,

    /// Trading symbols, in listing order; the registry is fixed at startup
    pub symbols: Vec<String>,

    /// Price levels per side embedded in change events and served by default
    pub snapshot_depth: usize,

    /// Capacity of each book's in-memory trade ring
    pub trade_history: usize,

    /// Seed orders per side placed at startup; 0 disables seeding
    pub seed_levels: usize,
}

impl Config {
    /// Construct a `Config` from environment variables, falling back to
    /// reasonable defaults.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let bind_addr =
            env::var("MATCHBOOK_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = read_env_or_default("MATCHBOOK_PORT", 8080u16)?;

        let symbols: Vec<String> = env::var("MATCHBOOK_SYMBOLS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| (1..=10).map(|i| format!("SYM{i}")).collect());

        let snapshot_depth = read_env_or_default("MATCHBOOK_SNAPSHOT_DEPTH", 10usize)?;
        let trade_history = read_env_or_default("MATCHBOOK_TRADE_HISTORY", 1000usize)?;
        let seed_levels = read_env_or_default("MATCHBOOK_SEED_LEVELS", 5usize)?;

        Ok(Config {
            bind_addr,
            port,
            symbols,
            snapshot_depth,
            trade_history,
            seed_levels,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match env::var(key) {
        Ok(val) => Ok(val.parse::<T>()?),
        Err(_) => Ok(default),
    }
}
