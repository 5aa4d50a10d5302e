use common::{ActivityUpdate, MovementState, PlayerId, Position};

/// State of one player at the moment it was sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSample {
    pub name: Option<String>,
    pub position: Option<Position>,
    pub state: MovementState,
}

impl PlayerSample {
    pub fn to_update(&self, player_id: PlayerId, online: bool) -> ActivityUpdate {
        ActivityUpdate {
            player_id,
            name: self.name.clone(),
            position: self.position,
            state: Some(self.state),
            online: Some(online),
        }
    }
}

/// Read access to the game's local view of its players.
///
/// Called from timer tasks, so it must be cheap and must not block.
pub trait PlayerStateSource: Send + Sync + 'static {
    /// `None` if the player has no state to report (e.g. no character yet).
    fn sample(&self, player_id: &PlayerId) -> Option<PlayerSample>;
}
