//! Demo 2: Private Order Stream
//!
//! Showcases: listen key retrieval, keep-alive, private order updates
//!
//! Requires MEXC_API_KEY and MEXC_SECRET_KEY.
//! Run: cargo run --bin order_stream

use colored::*;
use mexc_sdk::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  PRIVATE ORDER STREAM".cyan().bold());
    println!("{}", "  Place or cancel orders on MEXC to see updates".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let credentials = Credentials::from_env()?;
    let client = PrivateClient::connect(credentials).await?;
    println!("  {} listen key obtained", "●".green());

    client
        .subscribe_orders(|order| {
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            let side = match order.action {
                OrderAction::Buy => "BUY ".green(),
                OrderAction::Sell => "SELL".red(),
            };
            println!(
                "  {} {} {:<10} {:?} {:?} price={} qty={} filled={}",
                format!("[{}]", timestamp).dimmed(),
                side,
                order.pair.to_string().cyan(),
                order.order_type,
                order.status,
                order.price,
                order.quantity,
                order.cumulative_quantity.unwrap_or_default()
            );
        })
        .await?;

    tokio::signal::ctrl_c().await?;
    client.close().await;

    Ok(())
}
