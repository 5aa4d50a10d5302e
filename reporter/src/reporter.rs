use common::{ActivityUpdate, PlayerId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::client::ActivityClient;
use crate::config::ReporterConfig;
use crate::error::ReporterError;
use crate::source::{PlayerSample, PlayerStateSource};

/// Sends updates in the background and logs the outcome. Nothing waits on
/// the result and nothing is retried; the next tick is the retry.
#[derive(Clone)]
struct Dispatcher {
    client: ActivityClient,
    debug: bool,
}

impl Dispatcher {
    fn dispatch(&self, update: ActivityUpdate) -> JoinHandle<()> {
        let client = self.client.clone();
        let debug = self.debug;

        tokio::spawn(async move {
            match client.send(&update).await {
                Ok(()) if debug => info!(
                    "Reported activity for player {} (online={:?}, state={:?})",
                    update.player_id, update.online, update.state
                ),
                Ok(()) => trace!("Reported activity for player {}", update.player_id),
                Err(e) if debug => warn!(
                    "Failed to report activity for player {}: {:?} (payload {:?})",
                    update.player_id, e, update
                ),
                Err(e) => warn!(
                    "Failed to report activity for player {}: {}",
                    update.player_id, e
                ),
            }
        })
    }
}

struct TrackedPlayer {
    cancel: CancellationToken,
    timer: JoinHandle<()>,
    /// Most recent sample seen by the timer, used for the offline report
    /// when the game no longer has state for a leaving player.
    last_sample: watch::Receiver<Option<PlayerSample>>,
}

/// Periodically reports the activity of every player in the session.
///
/// Each tracked player owns one timer task. Players move
/// `Unregistered -> Active` on [`player_joined`](Self::player_joined) and
/// back on [`player_left`](Self::player_left); there are no other states.
pub struct ActivityReporter {
    dispatcher: Dispatcher,
    source: Arc<dyn PlayerStateSource>,
    interval: Duration,
    players: Mutex<HashMap<PlayerId, TrackedPlayer>>,
}

impl ActivityReporter {
    pub fn new(
        config: ReporterConfig,
        source: Arc<dyn PlayerStateSource>,
    ) -> Result<Self, ReporterError> {
        let client = ActivityClient::new(config.endpoint.clone())?;
        Ok(Self::with_client(config, client, source))
    }

    pub fn with_client(
        config: ReporterConfig,
        client: ActivityClient,
        source: Arc<dyn PlayerStateSource>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher {
                client,
                debug: config.debug,
            },
            source,
            interval: config.interval,
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Reports the player online right away and starts its timer.
    ///
    /// Joining an already tracked player replaces its registration.
    pub async fn player_joined(&self, player_id: PlayerId) {
        // Held until the insert so a concurrent leave sees either no player
        // or a fully registered one.
        let mut players = self.players.lock().await;

        let sample = self.source.sample(&player_id);
        self.dispatcher
            .dispatch(online_update(&player_id, sample.as_ref(), true));

        let (sample_tx, sample_rx) = watch::channel(sample);
        let cancel = CancellationToken::new();
        let timer = tokio::spawn(run_player_timer(
            player_id.clone(),
            self.interval,
            self.source.clone(),
            self.dispatcher.clone(),
            sample_tx,
            cancel.clone(),
        ));

        let tracked = TrackedPlayer {
            cancel,
            timer,
            last_sample: sample_rx,
        };

        let previous = players.insert(player_id.clone(), tracked);
        if let Some(previous) = previous {
            previous.cancel.cancel();
            debug!("Player {} re-registered, previous timer cancelled", player_id);
        } else {
            debug!("Tracking activity for player {}", player_id);
        }
    }

    /// Stops the player's timer and reports it offline.
    ///
    /// The offline report is dispatched, not awaited. Returns its handle, or
    /// `None` if the player was not tracked.
    pub async fn player_left(&self, player_id: &PlayerId) -> Option<JoinHandle<()>> {
        let Some(tracked) = self.players.lock().await.remove(player_id) else {
            debug!("Player {} left without being tracked", player_id);
            return None;
        };
        tracked.cancel.cancel();

        let sample = self
            .source
            .sample(player_id)
            .or_else(|| tracked.last_sample.borrow().clone());
        debug!("Stopped tracking activity for player {}", player_id);

        Some(
            self.dispatcher
                .dispatch(online_update(player_id, sample.as_ref(), false)),
        )
    }

    /// Reports every tracked player offline and waits for those reports and
    /// the timers to finish. Used when the game session closes.
    pub async fn shutdown(&self) {
        let players: Vec<PlayerId> = self.players.lock().await.keys().cloned().collect();
        info!("Reporting {} player(s) offline before shutdown", players.len());

        let mut pending = Vec::with_capacity(players.len());
        for player_id in &players {
            if let Some(handle) = self.player_left(player_id).await {
                pending.push(handle);
            }
        }
        for handle in pending {
            let _ = handle.await;
        }
    }

    pub async fn is_tracked(&self, player_id: &PlayerId) -> bool {
        self.players.lock().await.contains_key(player_id)
    }

    pub async fn tracked_players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self.players.lock().await.keys().cloned().collect();
        players.sort();
        players
    }

    /// True while the player's timer task is still running.
    pub async fn timer_running(&self, player_id: &PlayerId) -> bool {
        self.players
            .lock()
            .await
            .get(player_id)
            .is_some_and(|tracked| !tracked.timer.is_finished())
    }
}

impl Drop for ActivityReporter {
    fn drop(&mut self) {
        for tracked in self.players.get_mut().values() {
            tracked.cancel.cancel();
        }
    }
}

fn online_update(player_id: &PlayerId, sample: Option<&PlayerSample>, online: bool) -> ActivityUpdate {
    match sample {
        Some(sample) => sample.to_update(player_id.clone(), online),
        None => ActivityUpdate::new(player_id.clone()).with_online(online),
    }
}

async fn run_player_timer(
    player_id: PlayerId,
    period: Duration,
    source: Arc<dyn PlayerStateSource>,
    dispatcher: Dispatcher,
    last_sample: watch::Sender<Option<PlayerSample>>,
    cancel: CancellationToken,
) {
    // The join report covers the first period.
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!("Timer for player {} cancelled", player_id);
                break;
            }
            _ = interval.tick() => {
                match source.sample(&player_id) {
                    Some(sample) => {
                        dispatcher.dispatch(sample.to_update(player_id.clone(), true));
                        last_sample.send_replace(Some(sample));
                    }
                    None => trace!("No state for player {}, skipping report", player_id),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{MovementState, Position};

    #[test]
    fn test_online_update_uses_sample() {
        let sample = PlayerSample {
            name: Some("Eve".to_string()),
            position: Some(Position::new(1.0, 0.0, 1.0)),
            state: MovementState::Walking,
        };
        let update = online_update(&PlayerId::from(3u64), Some(&sample), true);
        assert_eq!(update.name.as_deref(), Some("Eve"));
        assert_eq!(update.state, Some(MovementState::Walking));
        assert_eq!(update.online, Some(true));
    }

    #[test]
    fn test_online_update_without_sample() {
        let update = online_update(&PlayerId::from(3u64), None, false);
        assert_eq!(update, ActivityUpdate::new(PlayerId::from(3u64)).with_online(false));
    }
}
