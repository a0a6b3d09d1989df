//! All mutable state, owned in one place.

use tracing::warn;

use crate::command::UserCommand;
use crate::presence::{PresenceMonitor, Transition};
use crate::prober::LockProber;
use crate::session::CommandSink;
use crate::settings::SettingsStore;

/// The presence monitor and the settings it reads.
///
/// Both the poll timer and user commands get a `&mut` to this, one at a time.
#[derive(Debug)]
pub struct PluginState {
    /// Away/here tracking and the poll timer.
    pub presence: PresenceMonitor,
    /// The persisted nicknames and away message.
    pub settings: SettingsStore,
}

impl PluginState {
    #[must_use]
    pub const fn new(presence: PresenceMonitor, settings: SettingsStore) -> PluginState {
        PluginState { presence, settings }
    }

    /// Runs a single poll of the lock state.
    pub async fn tick<P, S>(&mut self, prober: &P, sink: &S) -> Transition
    where
        P: LockProber + ?Sized,
        S: CommandSink + ?Sized,
    {
        self.presence
            .tick(prober, sink, self.settings.settings())
            .await
    }

    /// Handles a line of user input and returns the notice to show.
    ///
    /// Returns `None` if the line isn't one of our commands; otherwise the line has been eaten.
    pub fn handle_input(&mut self, line: &str) -> Option<String> {
        let command = UserCommand::parse(line)?;

        Some(self.handle_command(&command))
    }

    fn handle_command(&mut self, command: &UserCommand<'_>) -> String {
        match *command {
            UserCommand::Toggle => {
                if self.presence.toggle() {
                    "AutoAway now enabled!".to_string()
                } else {
                    "AutoAway now disabled!".to_string()
                }
            }
            UserCommand::HereUserName(nick) => with_write_result(
                self.settings.set_here_nick(nick),
                format!("Your name when not away is now {nick}"),
            ),
            UserCommand::AwayUserName(nick) => with_write_result(
                self.settings.set_away_nick(nick),
                format!("Your name when away is now {nick}"),
            ),
            UserCommand::AwayMsg(message) => with_write_result(
                self.settings.set_away_message(message),
                format!("Your away message is now \"{message}\""),
            ),
            UserCommand::Usage(usage) => usage.to_string(),
        }
    }
}

/// Appends a warning to `notice` if persisting the new value failed.
fn with_write_result(result: Result<(), crate::Error>, notice: String) -> String {
    match result {
        Ok(()) => notice,
        Err(err) => {
            warn!(%err, "setting changed but not saved");

            format!("{notice} (warning: {err}, the change will be lost on restart)")
        }
    }
}
