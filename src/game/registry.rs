//! Per-chat session registry — the shared mutable state behind the bot.

use super::session::{GameSession, Player, RollOutcome, UserId};
use super::GameError;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

/// Telegram group chat id.
pub type ChatId = i64;

/// Registry of active game sessions, at most one per chat.
///
/// Cloning yields another handle to the same registry. A single mutex
/// serializes every operation; each one is a synchronous map mutation, so
/// contention is negligible at chat-bot scale.
#[derive(Clone, Default)]
pub struct GameRegistry {
    games: Arc<Mutex<HashMap<ChatId, GameSession>>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for `chat` with `host` as its only player.
    pub fn create(&self, chat: ChatId, host: Player) -> Result<(), GameError> {
        let mut games = self.games.lock();
        if games.contains_key(&chat) {
            return Err(GameError::AlreadyExists);
        }
        games.insert(chat, GameSession::new(host));
        Ok(())
    }

    /// Add `player` to the chat's session. Returns the new roster size.
    pub fn join(&self, chat: ChatId, player: Player) -> Result<usize, GameError> {
        let mut games = self.games.lock();
        let game = games.get_mut(&chat).ok_or(GameError::NoSession)?;
        game.add_player(player)?;
        Ok(game.player_count())
    }

    /// Remove `user` at their own request. The host may not leave.
    pub fn leave(&self, chat: ChatId, user: UserId) -> Result<Player, GameError> {
        let mut games = self.games.lock();
        let game = games.get_mut(&chat).ok_or(GameError::NoSession)?;
        game.remove_player(user)
    }

    /// Remove `target` at the host's request. The host may not be kicked;
    /// the role must be transferred first.
    pub fn kick(&self, chat: ChatId, target: UserId) -> Result<Player, GameError> {
        let mut games = self.games.lock();
        let game = games.get_mut(&chat).ok_or(GameError::NoSession)?;
        game.remove_player(target)
    }

    /// Reassign the host role to an existing player. Returns the new host.
    pub fn transfer_host(&self, chat: ChatId, new_host: UserId) -> Result<Player, GameError> {
        let mut games = self.games.lock();
        let game = games.get_mut(&chat).ok_or(GameError::NoSession)?;
        game.transfer_host(new_host)
    }

    /// Roll a scored round for every player in the chat's session.
    pub fn roll(&self, chat: ChatId) -> Result<RollOutcome, GameError> {
        self.roll_with_rng(chat, &mut rand::thread_rng())
    }

    /// Roll with a caller-supplied RNG.
    pub fn roll_with_rng(&self, chat: ChatId, rng: &mut impl Rng) -> Result<RollOutcome, GameError> {
        let mut games = self.games.lock();
        let game = games.get_mut(&chat).ok_or(GameError::NoSession)?;
        game.roll_round(rng)
    }

    /// Destroy the chat's session unconditionally. Host privilege is the
    /// caller's responsibility, checked through `require_host`.
    pub fn end(&self, chat: ChatId) -> Result<(), GameError> {
        self.games
            .lock()
            .remove(&chat)
            .map(|_| ())
            .ok_or(GameError::NoSession)
    }

    /// Authorization guard: `actor` must be the chat's current host.
    pub fn require_host(&self, chat: ChatId, actor: UserId) -> Result<(), GameError> {
        let games = self.games.lock();
        let game = games.get(&chat).ok_or(GameError::NoSession)?;
        if game.host() != actor {
            return Err(GameError::NotHost);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: UserId) -> Player {
        Player {
            id,
            display_name: format!("Player {id}"),
            username: None,
        }
    }

    #[test]
    fn create_twice_fails_and_preserves_session() {
        let registry = GameRegistry::new();
        registry.create(1, player(10)).unwrap();

        assert_eq!(registry.create(1, player(20)), Err(GameError::AlreadyExists));
        // Original session untouched: 10 is still host, 20 never joined
        assert!(registry.require_host(1, 10).is_ok());
        assert_eq!(registry.require_host(1, 20), Err(GameError::NotHost));
        assert_eq!(registry.join(1, player(20)).unwrap(), 2);
    }

    #[test]
    fn join_fills_to_eight_then_full() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        for id in 2..=8 {
            assert_eq!(registry.join(1, player(id)).unwrap(), id as usize);
        }

        assert_eq!(registry.join(1, player(9)), Err(GameError::Full));
        // Roster size unchanged: a roll still covers exactly 8 players
        assert_eq!(registry.roll(1).unwrap().scores.len(), 8);
    }

    #[test]
    fn operations_without_session_fail() {
        let registry = GameRegistry::new();
        assert_eq!(registry.join(1, player(2)), Err(GameError::NoSession));
        assert_eq!(registry.leave(1, 2), Err(GameError::NoSession));
        assert_eq!(registry.kick(1, 2), Err(GameError::NoSession));
        assert_eq!(registry.transfer_host(1, 2), Err(GameError::NoSession));
        assert!(matches!(registry.roll(1), Err(GameError::NoSession)));
        assert_eq!(registry.end(1), Err(GameError::NoSession));
        assert_eq!(registry.require_host(1, 2), Err(GameError::NoSession));
    }

    #[test]
    fn duplicate_join_rejected() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        registry.join(1, player(2)).unwrap();
        assert_eq!(registry.join(1, player(2)), Err(GameError::AlreadyJoined));
    }

    #[test]
    fn host_cannot_leave_or_be_kicked() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        registry.join(1, player(2)).unwrap();

        assert_eq!(registry.leave(1, 1), Err(GameError::CannotRemoveHost));
        assert_eq!(registry.kick(1, 1), Err(GameError::CannotRemoveHost));
        assert!(registry.require_host(1, 1).is_ok());
    }

    #[test]
    fn kick_removes_player_and_score() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        registry.join(1, player(2)).unwrap();
        registry.join(1, player(3)).unwrap();

        registry.roll(1).unwrap();
        let removed = registry.kick(1, 2).unwrap();
        assert_eq!(removed.id, 2);

        let outcome = registry.roll(1).unwrap();
        assert_eq!(outcome.scores.len(), 2);
        assert!(outcome.scores.iter().all(|(p, _)| p.id != 2));
    }

    #[test]
    fn kick_absent_player_fails() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        assert_eq!(registry.kick(1, 99), Err(GameError::NotInSession));
    }

    #[test]
    fn transfer_to_non_player_fails() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        assert_eq!(registry.transfer_host(1, 99), Err(GameError::NotInSession));
        assert!(registry.require_host(1, 1).is_ok());
    }

    #[test]
    fn transfer_to_self_fails() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        assert_eq!(registry.transfer_host(1, 1), Err(GameError::SelfTransfer));
    }

    #[test]
    fn transfer_keeps_old_host_as_regular_player() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        registry.join(1, player(2)).unwrap();

        let new_host = registry.transfer_host(1, 2).unwrap();
        assert_eq!(new_host.id, 2);
        assert!(registry.require_host(1, 2).is_ok());
        assert_eq!(registry.require_host(1, 1), Err(GameError::NotHost));
        // Old host is now a regular player and may leave
        assert_eq!(registry.leave(1, 1).unwrap().id, 1);
    }

    #[test]
    fn roll_scores_cover_every_player() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        registry.join(1, player(2)).unwrap();
        registry.join(1, player(3)).unwrap();

        let outcome = registry.roll(1).unwrap();
        assert_eq!(outcome.scores.len(), 3);
        assert!(!outcome.winners.is_empty());
        assert!(!outcome.losers.is_empty());
        for (_, score) in &outcome.scores {
            assert!(*score <= 100);
        }
    }

    #[test]
    fn chats_are_independent() {
        let registry = GameRegistry::new();
        registry.create(1, player(1)).unwrap();
        registry.create(2, player(1)).unwrap();
        registry.join(1, player(2)).unwrap();

        assert_eq!(registry.roll(2).unwrap().scores.len(), 1);
        registry.end(2).unwrap();
        assert!(registry.require_host(1, 1).is_ok());
    }

    #[test]
    fn end_to_end_scenario() {
        let registry = GameRegistry::new();
        let (a, b, c) = (10, 20, 30);

        registry.create(1, player(a)).unwrap();
        registry.join(1, player(b)).unwrap();
        registry.join(1, player(c)).unwrap();

        let outcome = registry.roll(1).unwrap();
        assert_eq!(outcome.scores.len(), 3);

        registry.transfer_host(1, b).unwrap();
        registry.leave(1, a).unwrap();

        assert!(registry.require_host(1, b).is_ok());
        registry.end(1).unwrap();

        // Session fully cleared: a new game can start
        registry.create(1, player(c)).unwrap();
        assert!(registry.require_host(1, c).is_ok());
    }
}
