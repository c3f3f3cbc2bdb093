//! Built-in lobby commands and the standard command table.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::mpsc;
use tracing::info;

use crate::bridge::{BridgeChannel, BridgeGateway};
use crate::common::error::CommandError;

use super::admin::{AdminCommand, ControlSignal};
use super::waiting_list::WaitingList;
use super::{CommandContext, CommandHandler, CommandTable, Matcher, Tier};

/// Default time between two `/here` alerts.
pub const DEFAULT_HERE_COOLDOWN: Duration = Duration::from_secs(20 * 60);

/// Collaborators needed by the built-in commands.
pub struct BuiltinDeps {
    pub waiting_list: Arc<WaitingList>,
    pub bridge: Arc<dyn BridgeGateway>,
    pub control_tx: mpsc::UnboundedSender<ControlSignal>,
    pub here_cooldown: Duration,
}

/// Build the standard command table.
pub fn standard_table(deps: BuiltinDeps) -> CommandTable {
    let mut table = CommandTable::new();
    let random: Arc<dyn CommandHandler> = Arc::new(RandomCommand);

    table
        .register(
            "/here",
            Matcher::Exact,
            Tier::DualOrigin,
            Arc::new(HereCommand::new(
                deps.here_cooldown,
                deps.bridge,
                deps.waiting_list.clone(),
            )),
        )
        .register(
            "/next",
            Matcher::Exact,
            Tier::DualOrigin,
            Arc::new(NextCommand(deps.waiting_list.clone())),
        )
        .register(
            "/unnext",
            Matcher::Exact,
            Tier::DualOrigin,
            Arc::new(UnnextCommand(deps.waiting_list.clone())),
        )
        .register(
            "/list",
            Matcher::Exact,
            Tier::DualOrigin,
            Arc::new(ListCommand(deps.waiting_list)),
        )
        .register("/random ", Matcher::PrefixWithSpace, Tier::DualOrigin, random.clone())
        .register("/rand ", Matcher::PrefixWithSpace, Tier::DualOrigin, random);

    for signal in [ControlSignal::Restart, ControlSignal::Graceful, ControlSignal::Debug] {
        table.register(
            signal.trigger(),
            Matcher::Exact,
            Tier::NativeOnly,
            Arc::new(AdminCommand::new(signal, deps.control_tx.clone())),
        );
    }

    table
}

/// `/here`: alert the bridge that someone is looking for players.
pub struct HereCommand {
    cooldown: Duration,
    last_alert: Mutex<Option<Instant>>,
    bridge: Arc<dyn BridgeGateway>,
    waiting_list: Arc<WaitingList>,
}

impl HereCommand {
    pub fn new(cooldown: Duration, bridge: Arc<dyn BridgeGateway>, waiting_list: Arc<WaitingList>) -> Self {
        Self {
            cooldown,
            last_alert: Mutex::new(None),
            bridge,
            waiting_list,
        }
    }

    /// Claim the alert slot, or return how long until it frees up.
    fn claim(&self) -> Result<(), Duration> {
        let mut last = self.last_alert.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
        }
        *last = Some(Instant::now());
        Ok(())
    }
}

impl CommandHandler for HereCommand {
    fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        if let Err(remaining) = self.claim() {
            let minutes = remaining.as_secs().div_ceil(60);
            return Err(CommandError::Rejected(format!(
                "In order to prevent spam, you need to wait another {} minute{} before you can send out another alert.",
                minutes,
                if minutes == 1 { "" } else { "s" }
            )));
        }

        let mut alert = format!("@here {} wants to play.", ctx.display_name);
        let waiting = self.waiting_list.snapshot();
        if !waiting.is_empty() {
            alert.push_str(&format!(" Waiting list: {}", waiting.join(", ")));
        }
        info!("Sending @here alert for {}", ctx.display_name);
        self.bridge.send(BridgeChannel::Primary, "", &alert);

        ctx.announce(&format!("{} sent an @here alert to Discord.", ctx.display_name));
        Ok(())
    }
}

/// `/next`: join the waiting list.
pub struct NextCommand(pub Arc<WaitingList>);

impl CommandHandler for NextCommand {
    fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        if !self.0.add(ctx.display_name) {
            return Err(CommandError::Rejected(
                "You are already on the waiting list.".to_string(),
            ));
        }
        ctx.announce(&format!("{} is now on the waiting list.", ctx.display_name));
        Ok(())
    }
}

/// `/unnext`: leave the waiting list.
pub struct UnnextCommand(pub Arc<WaitingList>);

impl CommandHandler for UnnextCommand {
    fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        if !self.0.remove(ctx.display_name) {
            return Err(CommandError::Rejected(
                "You are not on the waiting list.".to_string(),
            ));
        }
        ctx.announce(&format!("{} is no longer on the waiting list.", ctx.display_name));
        Ok(())
    }
}

/// `/list`: show the waiting list.
pub struct ListCommand(pub Arc<WaitingList>);

impl CommandHandler for ListCommand {
    fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        ctx.announce(&self.0.describe());
        Ok(())
    }
}

/// `/random <min> <max>` (alias `/rand`): roll a number in `[min, max]`.
pub struct RandomCommand;

impl RandomCommand {
    pub fn parse_bounds(args: &str) -> Result<(i64, i64), CommandError> {
        let usage = || {
            CommandError::Usage(
                "The format of the /random command is: /random [min] [max]".to_string(),
            )
        };

        let mut parts = args.split_whitespace();
        let (Some(min), Some(max), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(usage());
        };
        let min: i64 = min.parse().map_err(|_| usage())?;
        let max: i64 = max.parse().map_err(|_| usage())?;
        if min > max {
            return Err(CommandError::Usage(format!(
                "The minimum ({}) cannot be greater than the maximum ({}).",
                min, max
            )));
        }
        Ok((min, max))
    }
}

impl CommandHandler for RandomCommand {
    fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        let (min, max) = Self::parse_bounds(ctx.args)?;
        let roll = rand::thread_rng().gen_range(min..=max);
        ctx.announce(&format!(
            "{} rolled a random number between {} and {}: {}",
            ctx.display_name, min, max, roll
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::bridge::{BridgeOutbound, BridgeRelay};
    use crate::commands::{Announcer, COMMAND_TRIGGER};
    use crate::common::InboundEvent;

    #[derive(Default)]
    struct Recorder {
        announced: RefCell<Vec<String>>,
        replies: RefCell<Vec<String>>,
    }

    impl Announcer for Recorder {
        fn announce(&self, text: &str) {
            self.announced.borrow_mut().push(text.to_string());
        }

        fn reply(&self, _event: &InboundEvent, text: &str) {
            self.replies.borrow_mut().push(text.to_string());
        }
    }

    fn run(handler: &dyn CommandHandler, name: &str, args: &str, recorder: &Recorder) -> Result<(), CommandError> {
        let event = InboundEvent::from_bridge(name, None, "/x");
        let ctx = CommandContext::new(&event, name, "/x", args, recorder);
        handler.handle(&ctx)
    }

    #[test]
    fn test_parse_bounds() {
        assert_eq!(RandomCommand::parse_bounds("1 6"), Ok((1, 6)));
        assert_eq!(RandomCommand::parse_bounds("  -3   3 "), Ok((-3, 3)));
        assert!(matches!(RandomCommand::parse_bounds(""), Err(CommandError::Usage(_))));
        assert!(matches!(RandomCommand::parse_bounds("1"), Err(CommandError::Usage(_))));
        assert!(matches!(RandomCommand::parse_bounds("1 2 3"), Err(CommandError::Usage(_))));
        assert!(matches!(RandomCommand::parse_bounds("a b"), Err(CommandError::Usage(_))));
        assert!(matches!(RandomCommand::parse_bounds("6 1"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_random_roll_in_range() {
        let recorder = Recorder::default();
        for _ in 0..50 {
            run(&RandomCommand, "alice", "1 6", &recorder).unwrap();
        }
        for line in recorder.announced.borrow().iter() {
            let roll: i64 = line.rsplit(' ').next().unwrap().parse().unwrap();
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn test_next_and_unnext() {
        let list = Arc::new(WaitingList::new());
        let recorder = Recorder::default();

        run(&NextCommand(list.clone()), "alice", "", &recorder).unwrap();
        let again = run(&NextCommand(list.clone()), "alice", "", &recorder);
        assert!(matches!(again, Err(CommandError::Rejected(_))));

        run(&ListCommand(list.clone()), "bob", "", &recorder).unwrap();
        run(&UnnextCommand(list.clone()), "alice", "", &recorder).unwrap();
        let missing = run(&UnnextCommand(list.clone()), "alice", "", &recorder);
        assert!(matches!(missing, Err(CommandError::Rejected(_))));

        assert_eq!(
            *recorder.announced.borrow(),
            vec![
                "alice is now on the waiting list.",
                "Waiting list: alice",
                "alice is no longer on the waiting list.",
            ]
        );
    }

    #[test]
    fn test_here_alerts_bridge_then_throttles() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let bridge: Arc<dyn BridgeGateway> = Arc::new(BridgeRelay::new(tx, Vec::<String>::new()));
        let list = Arc::new(WaitingList::new());
        list.add("carol");
        let here = HereCommand::new(Duration::from_secs(600), bridge, list);
        let recorder = Recorder::default();

        run(&here, "alice", "", &recorder).unwrap();
        assert_eq!(
            rx.try_recv().ok(),
            Some(BridgeOutbound {
                channel: BridgeChannel::Primary,
                display_name: String::new(),
                text: "@here alice wants to play. Waiting list: carol".to_string(),
            })
        );

        let throttled = run(&here, "bob", "", &recorder);
        match throttled {
            Err(CommandError::Rejected(msg)) => assert!(msg.contains("10 minutes")),
            other => panic!("expected throttle, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_standard_table_contents() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let table = standard_table(BuiltinDeps {
            waiting_list: Arc::new(WaitingList::new()),
            bridge: Arc::new(BridgeRelay::disabled()),
            control_tx: tx,
            here_cooldown: DEFAULT_HERE_COOLDOWN,
        });

        let dual: Vec<&str> = table.triggers(Tier::DualOrigin).collect();
        assert_eq!(dual, vec!["/here", "/next", "/unnext", "/list", "/random", "/rand"]);
        let native: Vec<&str> = table.triggers(Tier::NativeOnly).collect();
        assert_eq!(native, vec!["/restart", "/graceful", "/debug"]);
    }

    #[test]
    fn test_standard_triggers_use_command_trigger() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let table = standard_table(BuiltinDeps {
            waiting_list: Arc::new(WaitingList::new()),
            bridge: Arc::new(BridgeRelay::disabled()),
            control_tx: tx,
            here_cooldown: DEFAULT_HERE_COOLDOWN,
        });

        for tier in [Tier::ExternalOnly, Tier::DualOrigin, Tier::NativeOnly] {
            for trigger in table.triggers(tier) {
                assert!(
                    trigger.starts_with(COMMAND_TRIGGER),
                    "{} does not start with the command trigger",
                    trigger
                );
            }
        }
    }
}
