//! Demo 1: Kline Stream
//!
//! Showcases: lazy connect, per-topic acknowledgements, resubscription after
//! reconnect
//!
//! Run: cargo run --bin kline_stream -- BTC/USDT ETH/USDT
//! Logs: RUST_LOG=mexc_ws=debug cargo run --bin kline_stream

use colored::*;
use mexc_sdk::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut pairs = std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<CurrencyPair>())
        .collect::<Result<Vec<_>, _>>()?;
    if pairs.is_empty() {
        pairs = vec![CurrencyPair::new("BTC", "USDT"), CurrencyPair::new("ETH", "USDT")];
    }

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  KLINE STREAM".cyan().bold());
    println!("{}", "  1 minute candles, Ctrl+C to stop".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let hooks = Hooks::new()
        .on_connect(|info| {
            let label = if info.is_reconnection { "Reconnected" } else { "Connected" };
            println!("  {} {} to {}", "●".green(), label.green(), info.endpoint);
        })
        .on_disconnect(|reason| {
            println!("  {} Disconnected: {:?}", "●".red(), reason);
        })
        .on_subscription(|event| match event {
            SubscriptionEvent::Subscribed { key, .. } => {
                println!("  {} Subscribed {}", "✓".green(), key.dimmed());
            }
            SubscriptionEvent::Rejected { key, code, .. } => {
                println!("  {} Rejected {} (code {})", "✗".red(), key, code);
            }
            _ => {}
        });

    let client = PublicClient::builder().with_hooks(hooks).build_public()?;

    for pair in pairs {
        client
            .subscribe_kline(pair, Interval::Min1, |ohlc| {
                let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
                let close = if ohlc.close >= ohlc.open {
                    ohlc.close.to_string().green()
                } else {
                    ohlc.close.to_string().red()
                };
                println!(
                    "  {} {:<10} o={} h={} l={} c={} vol={}",
                    format!("[{}]", timestamp).dimmed(),
                    ohlc.pair.to_string().cyan(),
                    ohlc.open,
                    ohlc.high,
                    ohlc.low,
                    close,
                    ohlc.volume
                );
            })
            .await?;
    }

    tokio::signal::ctrl_c().await?;
    println!();
    println!("  {} unsubscribing and closing", "Shutting down:".dimmed());
    client.close().await;

    Ok(())
}
