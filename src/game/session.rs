//! Per-chat game session record and the roll-and-rank round.

use super::GameError;
use rand::Rng;
use std::collections::HashMap;

/// Telegram user id.
pub type UserId = i64;

/// Maximum roster size per session.
pub const MAX_PLAYERS: usize = 8;

/// A roster member, carrying the identity fields needed to render a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: UserId,
    pub display_name: String,
    pub username: Option<String>,
}

/// Outcome of one scored round.
#[derive(Debug, Clone)]
pub struct RollOutcome {
    /// One `(player, score)` per roster member, in roster order.
    pub scores: Vec<(Player, u8)>,
    /// Players whose score equals the round maximum.
    pub winners: Vec<Player>,
    /// Players whose score equals the round minimum. When every player ties,
    /// every player appears in both lists.
    pub losers: Vec<Player>,
}

/// One group chat's game: a host, an ordered roster capped at
/// `MAX_PLAYERS`, and the scores from the most recent round.
///
/// Invariants: the host is always a roster member, and removing a player
/// also drops any recorded score for them.
#[derive(Debug, Clone)]
pub struct GameSession {
    host: UserId,
    players: Vec<Player>,
    last_round_scores: HashMap<UserId, u8>,
}

impl GameSession {
    /// Create a session hosted (and initially populated) by `host`.
    pub fn new(host: Player) -> Self {
        Self {
            host: host.id,
            players: vec![host],
            last_round_scores: HashMap::new(),
        }
    }

    pub fn host(&self) -> UserId {
        self.host
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_player(&self, user: UserId) -> bool {
        self.players.iter().any(|p| p.id == user)
    }

    /// Add a player to the roster, enforcing uniqueness and the size bound.
    pub(crate) fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.is_player(player.id) {
            return Err(GameError::AlreadyJoined);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::Full);
        }
        self.players.push(player);
        Ok(())
    }

    /// Remove a non-host player, dropping any recorded score for them.
    pub(crate) fn remove_player(&mut self, user: UserId) -> Result<Player, GameError> {
        if user == self.host {
            return Err(GameError::CannotRemoveHost);
        }
        let pos = self
            .players
            .iter()
            .position(|p| p.id == user)
            .ok_or(GameError::NotInSession)?;
        let player = self.players.remove(pos);
        self.last_round_scores.remove(&user);
        Ok(player)
    }

    /// Reassign the host role to an existing player. Returns the new host.
    pub(crate) fn transfer_host(&mut self, new_host: UserId) -> Result<Player, GameError> {
        if new_host == self.host {
            return Err(GameError::SelfTransfer);
        }
        let player = self
            .players
            .iter()
            .find(|p| p.id == new_host)
            .cloned()
            .ok_or(GameError::NotInSession)?;
        self.host = new_host;
        Ok(player)
    }

    /// Draw one uniform score in [0,100] per player and rank the round.
    ///
    /// Winners are every player at the maximum, losers every player at the
    /// minimum. Overwrites the session's recorded scores.
    pub(crate) fn roll_round(&mut self, rng: &mut impl Rng) -> Result<RollOutcome, GameError> {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let scores: Vec<(Player, u8)> = self
            .players
            .iter()
            .map(|p| (p.clone(), rng.gen_range(0..=100u8)))
            .collect();
        self.last_round_scores = scores.iter().map(|(p, s)| (p.id, *s)).collect();

        let max = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
        let min = scores.iter().map(|(_, s)| *s).min().unwrap_or(0);
        let winners = scores
            .iter()
            .filter(|(_, s)| *s == max)
            .map(|(p, _)| p.clone())
            .collect();
        let losers = scores
            .iter()
            .filter(|(_, s)| *s == min)
            .map(|(p, _)| p.clone())
            .collect();

        Ok(RollOutcome {
            scores,
            winners,
            losers,
        })
    }

    /// Scores from the most recent round, by player id.
    #[cfg(test)]
    pub(crate) fn last_round_scores(&self) -> &HashMap<UserId, u8> {
        &self.last_round_scores
    }

    /// A session with no players, not constructible through the registry.
    #[cfg(test)]
    pub(crate) fn empty_for_tests() -> Self {
        Self {
            host: 0,
            players: Vec::new(),
            last_round_scores: HashMap::new(),
        }
    }
}
