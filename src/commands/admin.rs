//! Administrative commands: `/restart`, `/graceful`, `/debug`.
//!
//! The commands themselves only check permissions and emit a
//! [`ControlSignal`]; the process owner acts on it.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::common::error::CommandError;
use crate::common::OriginKind;

use super::{CommandContext, CommandHandler};

/// Process-level request raised by an administrative command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Restart immediately.
    Restart,
    /// Restart once the lobby is idle.
    Graceful,
    /// Dump internal state to the log.
    Debug,
}

impl ControlSignal {
    pub fn trigger(&self) -> &'static str {
        match self {
            ControlSignal::Restart => "/restart",
            ControlSignal::Graceful => "/graceful",
            ControlSignal::Debug => "/debug",
        }
    }

    fn announcement(&self) -> Option<&'static str> {
        match self {
            ControlSignal::Restart => Some("The server is restarting now."),
            ControlSignal::Graceful => {
                Some("The server will restart once all ongoing games have finished.")
            }
            ControlSignal::Debug => None,
        }
    }
}

/// Permission-checked emitter of one control signal.
pub struct AdminCommand {
    signal: ControlSignal,
    control_tx: mpsc::UnboundedSender<ControlSignal>,
}

impl AdminCommand {
    pub fn new(signal: ControlSignal, control_tx: mpsc::UnboundedSender<ControlSignal>) -> Self {
        Self { signal, control_tx }
    }

    /// The server may always run admin commands; users need the admin flag.
    fn permitted(ctx: &CommandContext<'_>) -> bool {
        match ctx.origin() {
            OriginKind::ServerInternal => true,
            OriginKind::Native => ctx.event.session.as_ref().is_some_and(|s| s.is_admin()),
            OriginKind::ExternalBridge => false,
        }
    }
}

impl CommandHandler for AdminCommand {
    fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        if !Self::permitted(ctx) {
            warn!(
                "{} tried to use {} without permission",
                ctx.display_name,
                self.signal.trigger()
            );
            return Err(CommandError::NotPermitted {
                trigger: self.signal.trigger().to_string(),
            });
        }

        info!("{} requested {:?}", ctx.display_name, self.signal);
        if let Err(e) = self.control_tx.send(self.signal) {
            error!("Failed to deliver control signal: {}", e);
            return Err(CommandError::Rejected(
                "The server is not accepting control commands right now.".to_string(),
            ));
        }

        match self.signal.announcement() {
            Some(text) => ctx.announce(text),
            None => ctx.reply("Debug information has been written to the server log."),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::commands::Announcer;
    use crate::common::InboundEvent;
    use crate::lobby::SessionHandle;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl Announcer for Recorder {
        fn announce(&self, text: &str) {
            self.0.borrow_mut().push(format!("announce: {}", text));
        }

        fn reply(&self, _event: &InboundEvent, text: &str) {
            self.0.borrow_mut().push(format!("reply: {}", text));
        }
    }

    fn invoke(command: &AdminCommand, event: &InboundEvent, recorder: &Recorder) -> Result<(), CommandError> {
        let trigger = command.signal.trigger();
        let ctx = CommandContext::new(event, "tester", trigger, "", recorder);
        command.handle(&ctx)
    }

    #[test]
    fn test_server_may_restart() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let command = AdminCommand::new(ControlSignal::Restart, tx);
        let recorder = Recorder::default();

        invoke(&command, &InboundEvent::server("", "/restart"), &recorder).unwrap();

        assert_eq!(rx.try_recv().ok(), Some(ControlSignal::Restart));
        assert_eq!(
            *recorder.0.borrow(),
            vec!["announce: The server is restarting now."]
        );
    }

    #[test]
    fn test_non_admin_user_rejected() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let command = AdminCommand::new(ControlSignal::Graceful, tx);
        let (session, _srx) = SessionHandle::channel(1, 10, "alice");
        let event = InboundEvent::native(session, "lobby", "/graceful");

        let err = invoke(&command, &event, &Recorder::default()).unwrap_err();
        assert_eq!(
            err,
            CommandError::NotPermitted {
                trigger: "/graceful".to_string()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_admin_user_debug_replies() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let command = AdminCommand::new(ControlSignal::Debug, tx);
        let (session, _srx) = SessionHandle::channel(1, 10, "alice");
        let event = InboundEvent::native(session.with_admin(true), "lobby", "/debug");
        let recorder = Recorder::default();

        invoke(&command, &event, &recorder).unwrap();

        assert_eq!(rx.try_recv().ok(), Some(ControlSignal::Debug));
        assert_eq!(
            *recorder.0.borrow(),
            vec!["reply: Debug information has been written to the server log."]
        );
    }

    #[test]
    fn test_closed_control_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let command = AdminCommand::new(ControlSignal::Restart, tx);
        let result = invoke(&command, &InboundEvent::server("", "/restart"), &Recorder::default());
        assert!(matches!(result, Err(CommandError::Rejected(_))));
    }
}
