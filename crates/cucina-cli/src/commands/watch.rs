//! Watch client command.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cucina_client::{
    ClientConfig, ClientEvent, ConnectionPhase, DashboardClient, DashboardView, ReconnectPolicy,
};

#[derive(Args)]
pub struct WatchArgs {
    /// WebSocket URL of a running dashboard server
    #[arg(long, env = "CUCINA_WS_URL", default_value = "ws://127.0.0.1:3030/ws")]
    pub url: String,

    /// Reconnect attempts before giving up
    #[arg(long, default_value = "10")]
    pub max_attempts: u32,

    /// Delay between reconnect attempts, in milliseconds
    #[arg(long, default_value = "3000")]
    pub retry_delay_ms: u64,
}

pub async fn execute(args: WatchArgs) -> Result<()> {
    let mut client = DashboardClient::connect(ClientConfig {
        url: args.url.clone(),
        policy: ReconnectPolicy {
            max_attempts: args.max_attempts,
            retry_delay: Duration::from_millis(args.retry_delay_ms),
        },
    });

    println!();
    println!("  {} {}", "Cucina".cyan().bold(), "Watch".bold());
    println!("  {}  {}", "Server".green(), args.url);
    println!();

    let mut view = DashboardView::new();

    while let Some(event) = client.next_event().await {
        match event {
            ClientEvent::Status(phase) => print_status(phase),
            ClientEvent::Snapshot(snapshot) => {
                let changes = view.apply(&snapshot);
                if !changes.any() {
                    continue;
                }
                if changes.metrics {
                    let metrics = view.metrics();
                    println!(
                        "  {}  active {}  completed {}  avg {:.1}s{}",
                        "orders".bold(),
                        metrics.active_orders,
                        metrics.completed_orders,
                        metrics.avg_completion_time,
                        if metrics.rush_hour {
                            "  RUSH".red().bold().to_string()
                        } else {
                            String::new()
                        }
                    );
                }
                if changes.ovens {
                    for oven in view.ovens() {
                        println!(
                            "  {}  {}  {:.1}F  {}/{}  eff {:.2}",
                            "oven".bold(),
                            oven.oven_id,
                            oven.temperature,
                            oven.capacity_used,
                            oven.capacity_total,
                            oven.efficiency
                        );
                    }
                }
                if changes.orders {
                    if let Some(latest) = view.recent_orders().first() {
                        println!(
                            "  {}  {} {} {} is {}",
                            "latest".bold(),
                            latest.order_id,
                            latest.size,
                            latest.pizza_type,
                            latest.status.as_str()
                        );
                    }
                }
                if changes.controls {
                    let controls = view.controls();
                    println!(
                        "  {}  rush={} failure={} new_orders={} speed={:.1}x",
                        "controls".bold(),
                        controls.rush_mode,
                        controls.equipment_failure,
                        controls.new_orders_enabled,
                        controls.speed_multiplier
                    );
                }
                if let Some(error) = view.error() {
                    println!("  {}  {}", "producer error".red().bold(), error);
                }
            }
        }
    }

    Ok(())
}

fn print_status(phase: ConnectionPhase) {
    match phase {
        ConnectionPhase::Connecting => {
            println!("  {}", "connecting...".dimmed());
        }
        ConnectionPhase::Open => {
            println!("  {}", "connected".green().bold());
        }
        ConnectionPhase::ClosedRetrying { attempt } => {
            println!(
                "  {} (attempt {})",
                "connection lost, retrying".yellow(),
                attempt
            );
        }
        ConnectionPhase::ClosedFailed => {
            // Terminal: make the failure unmistakable, then stop.
            println!(
                "  {}",
                "connection failed permanently, no further retries"
                    .red()
                    .bold()
            );
        }
    }
}
