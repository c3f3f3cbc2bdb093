//! Chat commands (`/here`, `/next`, `/random 1 6`, ...).
//!
//! Commands live in a single ordered table of `(trigger, matcher, tier,
//! handler)` entries. The tier says which origins may invoke a command:
//!
//! - `ExternalOnly`: owned by the bridge; the router only tests membership
//! - `DualOrigin`: in-app users and the bridge
//! - `NativeOnly`: in-app users and the server (administrative commands)

pub mod admin;
pub mod builtin;
pub mod waiting_list;

use std::fmt;
use std::sync::Arc;

use crate::common::error::CommandError;
use crate::common::{InboundEvent, OriginKind};

pub use admin::{AdminCommand, ControlSignal};
pub use waiting_list::WaitingList;

/// Leading character of every command.
pub const COMMAND_TRIGGER: char = '/';

/// Which origins may invoke a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    ExternalOnly,
    DualOrigin,
    NativeOnly,
}

/// How a trigger is compared against the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// The whole message equals the trigger.
    Exact,
    /// The message starts with the trigger followed by a single space.
    PrefixWithSpace,
}

/// Ways for a handler to talk back.
pub trait Announcer {
    /// Send a server message to the whole lobby (and the bridge).
    fn announce(&self, text: &str);

    /// Send an informational message to the sender of `event` only.
    fn reply(&self, event: &InboundEvent, text: &str);
}

/// Everything a handler gets to see about one invocation.
pub struct CommandContext<'a> {
    pub event: &'a InboundEvent,
    /// Resolved display name of the sender.
    pub display_name: &'a str,
    pub trigger: &'a str,
    /// Text after `trigger + ' '` for argument-taking commands, empty otherwise.
    pub args: &'a str,
    announcer: &'a dyn Announcer,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        event: &'a InboundEvent,
        display_name: &'a str,
        trigger: &'a str,
        args: &'a str,
        announcer: &'a dyn Announcer,
    ) -> Self {
        Self {
            event,
            display_name,
            trigger,
            args,
            announcer,
        }
    }

    pub fn announce(&self, text: &str) {
        self.announcer.announce(text);
    }

    pub fn reply(&self, text: &str) {
        self.announcer.reply(self.event, text);
    }

    pub fn origin(&self) -> OriginKind {
        self.event.origin.kind()
    }
}

/// A command body.
pub trait CommandHandler: Send + Sync {
    fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError>;
}

/// One entry of the command table.
#[derive(Clone)]
pub struct Command {
    pub trigger: String,
    pub matcher: Matcher,
    pub tier: Tier,
    pub handler: Arc<dyn CommandHandler>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("trigger", &self.trigger)
            .field("matcher", &self.matcher)
            .field("tier", &self.tier)
            .finish()
    }
}

/// A table hit: the command plus its argument text.
#[derive(Debug, Clone, Copy)]
pub struct CommandMatch<'a> {
    pub command: &'a Command,
    pub args: &'a str,
}

/// What the router should do with a command-looking message.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// Bridge command that came from the bridge; it was handled there.
    DeferToBridge,
    /// Bridge command invoked from somewhere else.
    BridgeOnly,
    Dispatch(CommandMatch<'a>),
    Unrecognized,
}

/// Ordered command table.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: Vec<Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. A trailing space on an argument-taking trigger is
    /// ignored, so `"/rand "` and `"/rand"` register the same entry.
    pub fn register(
        &mut self,
        trigger: impl Into<String>,
        matcher: Matcher,
        tier: Tier,
        handler: Arc<dyn CommandHandler>,
    ) -> &mut Self {
        let trigger: String = trigger.into();
        let trigger = match matcher {
            Matcher::Exact => trigger,
            Matcher::PrefixWithSpace => trigger.trim_end_matches(' ').to_string(),
        };
        self.commands.push(Command {
            trigger,
            matcher,
            tier,
            handler,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn triggers(&self, tier: Tier) -> impl Iterator<Item = &str> {
        self.in_tier(tier).map(|c| c.trigger.as_str())
    }

    fn in_tier(&self, tier: Tier) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(move |c| c.tier == tier)
    }

    /// Find the command for `text` within one tier.
    ///
    /// Exact triggers are tried before argument-taking ones.
    pub fn lookup<'a>(&'a self, text: &'a str, tier: Tier) -> Option<CommandMatch<'a>> {
        let exact = self
            .in_tier(tier)
            .filter(|c| c.matcher == Matcher::Exact)
            .find(|c| c.trigger == text)
            .map(|command| CommandMatch { command, args: "" });
        if exact.is_some() {
            return exact;
        }

        self.in_tier(tier)
            .filter(|c| c.matcher == Matcher::PrefixWithSpace)
            .find_map(|command| {
                text.strip_prefix(command.trigger.as_str())
                    .and_then(|rest| rest.strip_prefix(' '))
                    .map(|args| CommandMatch { command, args })
            })
    }

    /// Resolve a command across tiers.
    ///
    /// Precedence is ExternalOnly, then DualOrigin, then NativeOnly. Bridge
    /// events never reach NativeOnly commands. `is_external` answers
    /// membership in the bridge's own table.
    pub fn resolve<'a, F>(&'a self, text: &'a str, origin: OriginKind, is_external: F) -> Resolution<'a>
    where
        F: Fn(&str) -> bool,
    {
        if is_external(text) || self.lookup(text, Tier::ExternalOnly).is_some() {
            return if origin == OriginKind::ExternalBridge {
                Resolution::DeferToBridge
            } else {
                Resolution::BridgeOnly
            };
        }

        if let Some(hit) = self.lookup(text, Tier::DualOrigin) {
            return Resolution::Dispatch(hit);
        }

        if origin != OriginKind::ExternalBridge {
            if let Some(hit) = self.lookup(text, Tier::NativeOnly) {
                return Resolution::Dispatch(hit);
            }
        }

        Resolution::Unrecognized
    }
}
