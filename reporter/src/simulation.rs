//! A stand-in game world for running the reporter without a game engine.

use common::{MovementState, PlayerId, Position};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::source::{PlayerSample, PlayerStateSource};

const WALK_SPEED: f64 = 16.0;
const JUMP_SPEED: f64 = 50.0;
const GRAVITY: f64 = 196.2;

#[derive(Debug, Clone)]
struct SimPlayer {
    name: String,
    position: Position,
    vertical_speed: f64,
    heading: f64,
    state: MovementState,
    in_game: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    Joined(PlayerId),
    Left(PlayerId),
}

/// Players doing a random walk on a flat baseplate.
#[derive(Default)]
pub struct SimulatedWorld {
    players: Mutex<HashMap<PlayerId, SimPlayer>>,
}

impl SimulatedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player to the roster and puts it in game.
    pub fn spawn(&self, player_id: PlayerId, name: impl Into<String>) {
        let player = SimPlayer {
            name: name.into(),
            position: Position::default(),
            vertical_speed: 0.0,
            heading: 0.0,
            state: MovementState::Idle,
            in_game: true,
        };
        if let Ok(mut players) = self.players.lock() {
            players.insert(player_id, player);
        }
    }

    /// Advances every in-game player by `dt` seconds.
    pub fn step(&self, dt: f64) {
        let mut rng = rand::thread_rng();
        let Ok(mut players) = self.players.lock() else {
            return;
        };

        for player in players.values_mut().filter(|p| p.in_game) {
            match player.state {
                MovementState::Jumping | MovementState::Falling => {
                    player.vertical_speed -= GRAVITY * dt;
                    player.position.y = (player.position.y + player.vertical_speed * dt).max(0.0);
                    player.state = if player.position.y <= 0.0 {
                        player.vertical_speed = 0.0;
                        MovementState::Idle
                    } else if player.vertical_speed < 0.0 {
                        MovementState::Falling
                    } else {
                        MovementState::Jumping
                    };
                }
                MovementState::Idle | MovementState::Walking => {
                    let roll: f64 = rng.gen_range(0.0..1.0);
                    player.state = if roll < 0.05 {
                        player.vertical_speed = JUMP_SPEED;
                        MovementState::Jumping
                    } else if roll < 0.55 {
                        MovementState::Walking
                    } else {
                        MovementState::Idle
                    };
                }
            }

            if player.state == MovementState::Walking {
                player.heading += rng.gen_range(-0.5..0.5);
                player.position.x += player.heading.cos() * WALK_SPEED * dt;
                player.position.z += player.heading.sin() * WALK_SPEED * dt;
            }
        }
    }

    /// Each player leaves (or rejoins, if out of game) with `probability`.
    pub fn churn(&self, probability: f64) -> Vec<PresenceChange> {
        let mut rng = rand::thread_rng();
        let Ok(mut players) = self.players.lock() else {
            return Vec::new();
        };
        let probability = probability.clamp(0.0, 1.0);

        let mut changes = Vec::new();
        for (player_id, player) in players.iter_mut() {
            if !rng.gen_bool(probability) {
                continue;
            }
            player.in_game = !player.in_game;
            if player.in_game {
                player.position = Position::default();
                player.state = MovementState::Idle;
                player.vertical_speed = 0.0;
                changes.push(PresenceChange::Joined(player_id.clone()));
            } else {
                changes.push(PresenceChange::Left(player_id.clone()));
            }
        }
        changes
    }
}

impl PlayerStateSource for SimulatedWorld {
    fn sample(&self, player_id: &PlayerId) -> Option<PlayerSample> {
        let players = self.players.lock().ok()?;
        let player = players.get(player_id).filter(|p| p.in_game)?;
        Some(PlayerSample {
            name: Some(player.name.clone()),
            position: Some(player.position),
            state: player.state,
        })
    }
}
