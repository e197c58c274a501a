//! Inbound command parsing.
//!
//! Recognizes the seven bot commands, handles `/cmd@botname` addressing,
//! and validates the optional numeric target argument before anything
//! reaches the game registry.

use thiserror::Error;

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/host` — create a session with the sender as host.
    Host,
    /// `/join` — enter the current session.
    Join,
    /// `/roll` — score a round for every player (host only).
    Roll,
    /// `/remove` — kick the replied-to or id-addressed player (host only).
    Remove,
    /// `/leave` — exit the session (host may not).
    Leave,
    /// `/end` — destroy the session (host only).
    End,
    /// `/transfer` — hand the host role to another player (host only).
    Transfer,
}

/// Malformed command argument, rejected before any registry call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("That doesn't look like a user id. Reply to the player's message instead.")]
pub struct InvalidArgument;

/// Parse the leading bot command out of a message text.
///
/// Returns the command and the trimmed remainder of the line. Non-command
/// text, unknown commands, and commands addressed to a different bot
/// (`/roll@OtherBot`) all yield `None`.
pub fn parse_command<'a>(text: &'a str, bot_username: Option<&str>) -> Option<(Command, &'a str)> {
    let rest = text.trim().strip_prefix('/')?;
    let (word, args) = match rest.split_once(char::is_whitespace) {
        Some((word, args)) => (word, args.trim()),
        None => (rest, ""),
    };

    let (name, addressed) = match word.split_once('@') {
        Some((name, bot)) => (name, Some(bot)),
        None => (word, None),
    };
    if let Some(addressed) = addressed {
        match bot_username {
            Some(me) if addressed.eq_ignore_ascii_case(me) => {}
            _ => return None,
        }
    }

    let command = match name {
        "host" => Command::Host,
        "join" => Command::Join,
        "roll" => Command::Roll,
        "remove" => Command::Remove,
        "leave" => Command::Leave,
        "end" => Command::End,
        "transfer" => Command::Transfer,
        _ => return None,
    };
    Some((command, args))
}

/// Parse an explicit numeric target for `/remove` and `/transfer`.
/// `Ok(None)` when no argument was given (the reply-to target applies).
pub fn parse_target_arg(args: &str) -> Result<Option<i64>, InvalidArgument> {
    let args = args.trim();
    if args.is_empty() {
        return Ok(None);
    }
    let first = args.split_whitespace().next().unwrap_or(args);
    first.parse::<i64>().map(Some).map_err(|_| InvalidArgument)
}
