use anyhow::{Context, Result};
use clap::Parser;
use common::PlayerId;
use reporter::simulation::{PresenceChange, SimulatedWorld};
use reporter::{ActivityReporter, ReporterConfig};
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::info;

const SIMULATION_STEP: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(
    name = "activity-reporter",
    about = "Report the activity of simulated players to an activity service"
)]
struct Args {
    /// Full URL of the update endpoint (e.g. http://localhost:5000/update_activity)
    #[arg(long, env = "ACTIVITY_ENDPOINT")]
    endpoint: String,

    /// Seconds between two reports of the same player
    #[arg(long, default_value_t = 60)]
    interval_secs: u64,

    /// Log every report and the payload of failed ones
    #[arg(long, env = "ACTIVITY_DEBUG")]
    debug: bool,

    /// Number of simulated players
    #[arg(long, default_value_t = 4)]
    players: u64,

    /// Chance per simulation step that a player leaves or rejoins
    #[arg(long, default_value_t = 0.002)]
    churn: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = ReporterConfig::new(&args.endpoint)?
        .with_interval(Duration::from_secs(args.interval_secs))?
        .with_debug(args.debug);

    info!(
        "Reporting {} simulated player(s) to {} every {:?}",
        args.players, config.endpoint, config.interval
    );

    let world = Arc::new(SimulatedWorld::new());
    let reporter = ActivityReporter::new(config, world.clone())
        .context("Failed to create activity reporter")?;

    for idx in 1..=args.players {
        let player_id = PlayerId::from(idx);
        world.spawn(player_id.clone(), format!("Player{}", idx));
        reporter.player_joined(player_id).await;
    }

    let mut step = tokio::time::interval(SIMULATION_STEP);
    step.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for shutdown signal")?;
                info!("Received shutdown signal");
                break;
            }
            _ = step.tick() => {
                world.step(SIMULATION_STEP.as_secs_f64());
                for change in world.churn(args.churn) {
                    match change {
                        PresenceChange::Joined(player_id) => {
                            info!("Player {} joined", player_id);
                            reporter.player_joined(player_id).await;
                        }
                        PresenceChange::Left(player_id) => {
                            info!("Player {} left", player_id);
                            reporter.player_left(&player_id).await;
                        }
                    }
                }
            }
        }
    }

    reporter.shutdown().await;
    info!("Reporter shut down");
    Ok(())
}
