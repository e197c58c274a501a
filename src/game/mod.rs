//! Dice game state — sessions, the per-chat registry, and typed failure
//! conditions.
//!
//! The registry is the single piece of shared mutable state in the bot: a
//! map from group chat to its active `GameSession`. Authorization (only the
//! host may roll, kick, transfer, or end) is applied by the dispatch layer
//! through `GameRegistry::require_host` before any privileged operation.

mod registry;
mod session;

pub use registry::{ChatId, GameRegistry};
pub use session::{Player, RollOutcome, UserId, MAX_PLAYERS};

use thiserror::Error;

/// Local, recoverable failure conditions for session operations.
///
/// Every variant's `Display` message doubles as the user-facing reply text,
/// so the dispatch layer can send `error.to_string()` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("A game already exists in this group.")]
    AlreadyExists,
    #[error("No game is running. Start one with /host.")]
    NoSession,
    #[error("You are already in the game.")]
    AlreadyJoined,
    #[error("The game is full (8 players max).")]
    Full,
    #[error("That player is not in the game.")]
    NotInSession,
    #[error("The host cannot be removed. Transfer the role first with /transfer.")]
    CannotRemoveHost,
    #[error("You are already the host.")]
    SelfTransfer,
    #[error("There are no players to roll for.")]
    NoPlayers,
    #[error("Only the host can do that.")]
    NotHost,
}
