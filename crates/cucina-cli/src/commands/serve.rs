//! Dashboard server command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cucina_core::controls::new_shared_controls;
use cucina_sim::{KitchenConfig, SimulatedKitchen};
use cucina_web::broadcast::BroadcastConfig;
use cucina_web::state::AppState;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "CUCINA_PORT", default_value = "3030")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "CUCINA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Broadcast cadence in milliseconds
    #[arg(long, env = "CUCINA_BROADCAST_INTERVAL_MS", default_value = "2000")]
    pub interval_ms: u64,

    /// Per-connection send timeout in milliseconds
    #[arg(long, env = "CUCINA_SEND_TIMEOUT_MS", default_value = "1000")]
    pub send_timeout_ms: u64,

    /// Base order arrival rate, in orders per minute
    #[arg(long, env = "CUCINA_BASE_ORDERS_PER_MINUTE", default_value = "0.5")]
    pub orders_per_minute: f64,

    /// Simulation RNG seed (random when omitted)
    #[arg(long, env = "CUCINA_SEED")]
    pub seed: Option<u64>,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let controls = new_shared_controls();
    let kitchen = SimulatedKitchen::new(
        KitchenConfig {
            base_orders_per_minute: args.orders_per_minute,
            seed: args.seed,
            ..Default::default()
        },
        controls.clone(),
    );
    let state = AppState::new(Arc::new(kitchen), controls);

    let config = BroadcastConfig {
        interval: Duration::from_millis(args.interval_ms),
        send_timeout: Duration::from_millis(args.send_timeout_ms),
    };

    println!();
    println!("  {} {}", "Cucina".cyan().bold(), "Dashboard Server".bold());
    println!();
    println!(
        "  {}  http://{}:{}",
        "Dashboard".green(),
        args.host,
        args.port
    );
    println!(
        "  {}  ws://{}:{}/ws",
        "WebSocket".green(),
        args.host,
        args.port
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    cucina_web::run_server(state, &args.host, args.port, config).await?;

    Ok(())
}
