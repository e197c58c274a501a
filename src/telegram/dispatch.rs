//! Command dispatch — inbound messages to registry operations to replies.
//!
//! Extracts `(chat, actor, target)` from each message, applies the host
//! guard before privileged operations, invokes the matching registry
//! operation, and renders the outcome as reply text. Every `GameError`
//! already carries its user-facing message.

use super::api::{mention, Message, TelegramApi, User};
use super::commands::{parse_command, parse_target_arg, Command};
use crate::game::{ChatId, GameRegistry, Player, RollOutcome, UserId, MAX_PLAYERS};
use anyhow::Result;

/// Rendered reply text; `markdown` is set only when the text carries
/// mentions that need Markdown parse mode.
struct Reply {
    text: String,
    markdown: bool,
}

impl Reply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }

    fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
        }
    }
}

pub struct Dispatcher {
    api: TelegramApi,
    registry: GameRegistry,
    bot_username: Option<String>,
}

impl Dispatcher {
    pub fn new(api: TelegramApi, registry: GameRegistry, bot_username: Option<String>) -> Self {
        Self {
            api,
            registry,
            bot_username,
        }
    }

    /// Handle one inbound message end to end. Non-commands are ignored.
    pub async fn handle_message(&self, message: &Message) -> Result<()> {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let Some(from) = message.from.as_ref() else {
            return Ok(());
        };
        let Some((command, args)) = parse_command(text, self.bot_username.as_deref()) else {
            return Ok(());
        };

        let chat = message.chat.id;
        tracing::debug!(chat, user = from.id, ?command, "Handling command");

        let reply = self.run_command(
            chat,
            from,
            command,
            args,
            message.reply_to_message.as_deref(),
        );
        self.api
            .send_message(chat, &reply.text, Some(message.message_id), reply.markdown)
            .await?;
        Ok(())
    }

    /// Execute a command against the registry and render the reply.
    fn run_command(
        &self,
        chat: ChatId,
        from: &User,
        command: Command,
        args: &str,
        reply_to: Option<&Message>,
    ) -> Reply {
        match command {
            Command::Host => match self.registry.create(chat, player_from(from)) {
                Ok(()) => Reply::markdown(format!(
                    "Game created! Host: {}\nOthers can /join (up to {MAX_PLAYERS} players).",
                    mention_user(from)
                )),
                Err(e) => Reply::plain(e.to_string()),
            },
            Command::Join => match self.registry.join(chat, player_from(from)) {
                Ok(count) => Reply::markdown(format!(
                    "{} joined the game! Players: {count}/{MAX_PLAYERS}",
                    mention_user(from)
                )),
                Err(e) => Reply::plain(e.to_string()),
            },
            Command::Leave => match self.registry.leave(chat, from.id) {
                Ok(player) => {
                    Reply::markdown(format!("{} left the game.", mention_player(&player)))
                }
                Err(e) => Reply::plain(e.to_string()),
            },
            Command::Roll => self.privileged(chat, from.id, |registry| {
                match registry.roll(chat) {
                    Ok(outcome) => Reply::markdown(render_roll(&outcome)),
                    Err(e) => Reply::plain(e.to_string()),
                }
            }),
            Command::Remove => {
                let Some(target) = (match resolve_target(args, reply_to) {
                    Ok(target) => target,
                    Err(e) => return Reply::plain(e.to_string()),
                }) else {
                    return Reply::plain(
                        "Reply to the player's message, or pass their id: /remove <id>.",
                    );
                };
                self.privileged(chat, from.id, |registry| {
                    match registry.kick(chat, target) {
                        Ok(removed) => {
                            Reply::markdown(format!("Removed {}.", mention_player(&removed)))
                        }
                        Err(e) => Reply::plain(e.to_string()),
                    }
                })
            }
            Command::Transfer => {
                let Some(target) = (match resolve_target(args, reply_to) {
                    Ok(target) => target,
                    Err(e) => return Reply::plain(e.to_string()),
                }) else {
                    return Reply::plain(
                        "Reply to the new host's message, or pass their id: /transfer <id>.",
                    );
                };
                self.privileged(chat, from.id, |registry| {
                    match registry.transfer_host(chat, target) {
                        Ok(new_host) => Reply::markdown(format!(
                            "Host transferred to {}.",
                            mention_player(&new_host)
                        )),
                        Err(e) => Reply::plain(e.to_string()),
                    }
                })
            }
            Command::End => self.privileged(chat, from.id, |registry| {
                match registry.end(chat) {
                    Ok(()) => Reply::plain("The game has ended."),
                    Err(e) => Reply::plain(e.to_string()),
                }
            }),
        }
    }

    /// Apply the host guard, then run the privileged operation.
    fn privileged(
        &self,
        chat: ChatId,
        actor: UserId,
        op: impl FnOnce(&GameRegistry) -> Reply,
    ) -> Reply {
        match self.registry.require_host(chat, actor) {
            Ok(()) => op(&self.registry),
            Err(e) => Reply::plain(e.to_string()),
        }
    }
}

/// Pick the kick/transfer target: an explicit numeric argument wins,
/// otherwise the sender of the replied-to message.
fn resolve_target(
    args: &str,
    reply_to: Option<&Message>,
) -> Result<Option<UserId>, super::commands::InvalidArgument> {
    if let Some(id) = parse_target_arg(args)? {
        return Ok(Some(id));
    }
    Ok(reply_to.and_then(|m| m.from.as_ref()).map(|u| u.id))
}

fn player_from(user: &User) -> Player {
    Player {
        id: user.id,
        display_name: user.full_name(),
        username: user.username.clone(),
    }
}

fn mention_user(user: &User) -> String {
    mention(user.id, &user.full_name(), user.username.as_deref())
}

fn mention_player(player: &Player) -> String {
    mention(player.id, &player.display_name, player.username.as_deref())
}

/// Per-player scores in roster order, then winner and loser mention lines.
fn render_roll(outcome: &RollOutcome) -> String {
    let mut lines = vec!["Roll results:".to_string()];
    for (player, score) in &outcome.scores {
        lines.push(format!("{} : {score}", mention_player(player)));
    }
    lines.push(String::new());

    let winners: Vec<String> = outcome.winners.iter().map(mention_player).collect();
    lines.push(format!("Winners: {}", winners.join(" ")));
    let losers: Vec<String> = outcome.losers.iter().map(mention_player).collect();
    lines.push(format!("Losers: {}", losers.join(" ")));

    lines.join("\n")
}
