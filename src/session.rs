//! Broadcasting commands to every connected IRC session.

use irc::client::Client;
use irc::proto::Command;
use tracing::{debug, warn};

use crate::Error;

/// A command that changes how we present ourselves on IRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceCommand {
    /// Change nickname.
    Nick(String),
    /// Mark ourselves away with the given reason.
    Away(String),
    /// Mark ourselves as back.
    Back,
}

impl From<PresenceCommand> for Command {
    fn from(command: PresenceCommand) -> Self {
        match command {
            PresenceCommand::Nick(nick) => Command::NICK(nick),
            PresenceCommand::Away(reason) => Command::AWAY(Some(reason)),
            PresenceCommand::Back => Command::AWAY(None),
        }
    }
}

/// Something that delivers presence commands to every active session.
pub trait CommandSink {
    /// Sends `command` to all sessions.
    ///
    /// # Errors
    ///
    /// Implementations return an error only if the command couldn't be delivered anywhere.
    fn broadcast(&self, command: PresenceCommand) -> Result<(), Error>;
}

/// The set of connected IRC clients.
#[derive(Default)]
pub struct Sessions {
    clients: Vec<Client>,
}

impl Sessions {
    /// Constructs and returns an empty set of sessions.
    #[must_use]
    pub fn new() -> Sessions {
        Sessions { clients: vec![] }
    }

    /// Adds a connected client.
    pub fn push(&mut self, client: Client) {
        self.clients.push(client);
    }

    /// Returns the number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Sends `QUIT` to every session.
    pub fn quit(&self, message: &str) {
        for client in &self.clients {
            if let Err(err) = client.send_quit(message) {
                warn!(%err, "could not send quit");
            }
        }
    }
}

impl CommandSink for Sessions {
    fn broadcast(&self, command: PresenceCommand) -> Result<(), Error> {
        let mut last_error = None;
        let mut delivered = 0;

        for client in &self.clients {
            let nickname = client.current_nickname();

            match client.send(Command::from(command.clone())) {
                Ok(()) => {
                    debug!(%nickname, ?command, "sent presence command");
                    delivered += 1;
                }
                Err(err) => {
                    warn!(%nickname, ?command, %err, "could not send presence command");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if delivered == 0 => Err(Error::Irc(err)),
            _ => Ok(()),
        }
    }
}
