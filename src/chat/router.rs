//! Chat routing and command dispatch.
//!
//! `ChatRouter::route` takes one inbound event through a fixed pipeline:
//!
//! 1. resolve the sender's identity
//! 2. reject blank text
//! 3. sanitize (except server messages) and truncate
//! 4. validate the room (warn only)
//! 5. persist
//! 6. write the audit log line
//! 7. deliver to a game room and stop, or deliver to the lobby
//! 8. replicate lobby lines to the bridge
//! 9. dispatch commands
//!
//! Each step returns a `RouteResult`; the first error ends the pipeline and is
//! reported to the sender and/or the operator log by `report`. Nothing that
//! goes wrong here affects other events or other sessions.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::bridge::{BridgeChannel, BridgeGateway};
use crate::chat::mentions::MentionRewriter;
use crate::chat::sanitize::{Sanitizer, StrictSanitizer};
use crate::chat::store::{ChatActor, ChatLogEntry, ChatStore};
use crate::commands::{Announcer, CommandContext, CommandTable, Resolution, COMMAND_TRIGGER};
use crate::common::error::{RouteError, RouteResult};
use crate::common::{InboundEvent, Origin, OriginKind, Room, UserId, LOBBY_ROOM};
use crate::lobby::session::DEFAULT_ERROR_MESSAGE;
use crate::lobby::{ChatNotification, RecipientResolver, SessionHandle};

/// Maximum length of a chat message, in characters.
pub const DEFAULT_MAX_CHAT_LENGTH: usize = 300;

/// Tunables for the router.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub max_length: usize,
    /// Display name used for server messages.
    pub server_name: String,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_CHAT_LENGTH,
            server_name: String::new(),
        }
    }
}

/// Resolved identity of the sender of one event.
#[derive(Debug, Clone)]
struct Sender {
    user_id: UserId,
    display_name: String,
    qualifier: Option<String>,
}

/// The message router.
pub struct ChatRouter {
    settings: RouterSettings,
    sanitizer: Arc<dyn Sanitizer>,
    store: Arc<dyn ChatStore>,
    recipients: RecipientResolver,
    bridge: Arc<dyn BridgeGateway>,
    commands: CommandTable,
    mentions: MentionRewriter,
}

impl ChatRouter {
    pub fn new(
        settings: RouterSettings,
        store: Arc<dyn ChatStore>,
        recipients: RecipientResolver,
        bridge: Arc<dyn BridgeGateway>,
        commands: CommandTable,
    ) -> Self {
        Self {
            settings,
            sanitizer: Arc::new(StrictSanitizer::new()),
            store,
            recipients,
            bridge,
            commands,
            mentions: MentionRewriter::new(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Route one inbound event. All outcomes are side effects.
    pub fn route(&self, event: InboundEvent) {
        if let Err(e) = self.dispatch(&event) {
            self.report(&event, e);
        }
    }

    fn dispatch(&self, event: &InboundEvent) -> RouteResult<()> {
        let sender = self.identify(event)?;
        let text = self.prepare_text(event)?;

        // An invalid room is only a warning; the message is still persisted
        // and the game-room step below rejects it.
        if !Room::is_valid(&event.room) {
            self.warn_sender(event, "That is not a valid room.");
        }

        self.persist(event, &sender, &text)?;
        info!(room = %event.room, "{}", audit_line(&event.origin, &sender.display_name, sender.qualifier.as_deref(), &text));

        if event.room != LOBBY_ROOM {
            return self.deliver_to_game(event, &sender, &text);
        }

        self.deliver_to_lobby(event, &sender, &text);
        self.replicate(event, &sender, &text);
        self.dispatch_command(event, &sender, &text)
    }

    fn identify(&self, event: &InboundEvent) -> RouteResult<Sender> {
        match &event.origin {
            Origin::Native => {
                let session = event.session.as_ref().ok_or(RouteError::Precondition)?;
                Ok(Sender {
                    user_id: session.user_id(),
                    display_name: session.username().to_string(),
                    qualifier: None,
                })
            }
            Origin::ExternalBridge {
                display_name,
                qualifier,
            } => Ok(Sender {
                user_id: 0,
                display_name: display_name.clone(),
                qualifier: qualifier.clone(),
            }),
            Origin::ServerInternal { display_name, .. } => Ok(Sender {
                user_id: 0,
                display_name: display_name.clone(),
                qualifier: None,
            }),
        }
    }

    /// Blank check, sanitization, truncation. Truncation runs last so that
    /// stripped markup does not count against the limit.
    fn prepare_text(&self, event: &InboundEvent) -> RouteResult<String> {
        const BLANK: &str = "You cannot send a blank message.";

        if event.text.trim().is_empty() {
            return Err(RouteError::UserInput(BLANK.to_string()));
        }

        let text = if event.origin.is_server() {
            event.text.clone()
        } else {
            self.sanitizer.sanitize(&event.text)
        };
        if text.trim().is_empty() {
            return Err(RouteError::UserInput(BLANK.to_string()));
        }

        Ok(truncate_chars(text, self.settings.max_length))
    }

    fn persist(&self, event: &InboundEvent, sender: &Sender, text: &str) -> RouteResult<()> {
        let actor = match event.origin {
            Origin::ExternalBridge { .. } => ChatActor::Bridge {
                username: sender.display_name.clone(),
            },
            _ => ChatActor::Native {
                user_id: sender.user_id,
            },
        };
        self.store
            .insert(&ChatLogEntry::new(actor, text, event.room.as_str()))?;
        Ok(())
    }

    /// Game rooms get the text verbatim and never run commands.
    fn deliver_to_game(&self, event: &InboundEvent, sender: &Sender, text: &str) -> RouteResult<()> {
        let game_id = Room::game_id(&event.room)?;
        let recipients = self
            .recipients
            .resolve(Room::Game(game_id))
            .map_err(|e| RouteError::UserInput(e.to_string()))?;

        self.deliver(&recipients, event, sender, text);
        Ok(())
    }

    fn deliver_to_lobby(&self, event: &InboundEvent, sender: &Sender, text: &str) {
        let rendered = self
            .mentions
            .rewrite(text, |id| self.bridge.member_name(id));
        let recipients = self.recipients.lobby();
        self.deliver(&recipients, event, sender, &rendered);
    }

    fn deliver(&self, recipients: &[SessionHandle], event: &InboundEvent, sender: &Sender, text: &str) {
        let now = Utc::now();
        let kind = event.origin.kind();
        let delivered = recipients
            .iter()
            .filter(|session| {
                session.notify(ChatNotification::new(
                    text,
                    sender.display_name.as_str(),
                    kind,
                    now,
                    event.room.as_str(),
                ))
            })
            .count();

        debug!(
            room = %event.room,
            delivered,
            skipped = recipients.len() - delivered,
            "Delivered chat message"
        );
    }

    /// Mirror a lobby line to the bridge, unless it came from there.
    fn replicate(&self, event: &InboundEvent, sender: &Sender, text: &str) {
        let channel = match event.origin {
            Origin::ExternalBridge { .. } => return,
            Origin::ServerInternal {
                echo_suppressed, ..
            } => BridgeChannel::for_lobby_line(true, echo_suppressed),
            Origin::Native => BridgeChannel::for_lobby_line(false, false),
        };
        self.bridge.send(channel, &sender.display_name, text);
    }

    fn dispatch_command(&self, event: &InboundEvent, sender: &Sender, text: &str) -> RouteResult<()> {
        if !text.starts_with(COMMAND_TRIGGER) {
            return Ok(());
        }

        let origin = event.origin.kind();
        match self
            .commands
            .resolve(text, origin, |t| self.bridge.is_external_command(t))
        {
            Resolution::DeferToBridge => {
                debug!("{} is handled by the bridge", text);
                Ok(())
            }
            Resolution::BridgeOnly => Err(RouteError::CommandMismatch {
                trigger: text.to_string(),
            }),
            Resolution::Dispatch(hit) => {
                debug!(trigger = %hit.command.trigger, ?origin, "Dispatching command");
                let ctx = CommandContext::new(
                    event,
                    &sender.display_name,
                    &hit.command.trigger,
                    hit.args,
                    self,
                );
                hit.command.handler.handle(&ctx)?;
                Ok(())
            }
            Resolution::Unrecognized => Err(RouteError::UnrecognizedCommand),
        }
    }

    fn report(&self, event: &InboundEvent, err: RouteError) {
        match &err {
            RouteError::UserInput(message) => {
                debug!(room = %event.room, "Rejected chat message: {}", message);
                self.warn_sender(event, message);
            }
            RouteError::Precondition => {
                error!("{}", err);
            }
            RouteError::Storage(_) | RouteError::Parse(_) => {
                error!(room = %event.room, "{}", err);
                match &event.session {
                    Some(session) => {
                        session.error("");
                    }
                    None => self.notice_without_session(event, DEFAULT_ERROR_MESSAGE),
                }
            }
            RouteError::CommandMismatch { .. }
            | RouteError::UnrecognizedCommand
            | RouteError::Command(_) => {
                self.reply(event, &err.to_string());
            }
        }
    }

    fn warn_sender(&self, event: &InboundEvent, message: &str) {
        match &event.session {
            Some(session) => {
                session.warning(message);
            }
            None => self.notice_without_session(event, message),
        }
    }

    /// Bridge senders are answered on the bridge; anything else is logged.
    fn notice_without_session(&self, event: &InboundEvent, message: &str) {
        if event.origin.is_bridge() {
            self.bridge
                .send(BridgeChannel::Primary, &self.settings.server_name, message);
        } else {
            info!("Server notice: {}", message);
        }
    }
}

impl Announcer for ChatRouter {
    fn announce(&self, text: &str) {
        self.route(InboundEvent::server(self.settings.server_name.clone(), text));
    }

    fn reply(&self, event: &InboundEvent, text: &str) {
        let Some(session) = &event.session else {
            self.notice_without_session(event, text);
            return;
        };

        let room = if Room::is_valid(&event.room) {
            event.room.as_str()
        } else {
            LOBBY_ROOM
        };
        session.notify(ChatNotification::new(
            text,
            self.settings.server_name.as_str(),
            OriginKind::ServerInternal,
            Utc::now(),
            room,
        ));
    }
}

/// Clip `text` to at most `max` characters.
pub fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text,
    }
}

/// Audit log line: `<name#qualifier> text` for people, bare text for the server.
pub fn audit_line(origin: &Origin, display_name: &str, qualifier: Option<&str>, text: &str) -> String {
    if origin.is_server() {
        return text.to_string();
    }
    match qualifier {
        Some(q) if !q.is_empty() => format!("<{}#{}> {}", display_name, q, text),
        _ => format!("<{}> {}", display_name, text),
    }
}
