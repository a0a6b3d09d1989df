//! The main process for keeping IRC sessions in sync with the screen lock.
use std::time::Duration;

use futures::future;
use futures::stream::{LocalBoxStream, SelectAll, StreamExt};
use irc::client::prelude::Client;
use irc::client::ClientStream;
use irc::proto::{Command, Message, Response};
use tokio::io::{AsyncBufRead, Lines};
use tokio::time;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::presence::PresenceMonitor;
use crate::prober::{CommandProber, LockProber};
use crate::session::Sessions;
use crate::settings::{self, SettingsStore};
use crate::state::PluginState;
use crate::Error;

/// Message sent when leaving because the console was closed.
const QUIT_MESSAGE: &str = "autoaway shutting down";
/// How long to wait for the servers to hang up after quitting.
const QUIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Messages from a single network. Ends when the connection is closed or fails.
type MessageStream = LocalBoxStream<'static, Message>;

/// The daemon that owns the IRC sessions, the settings and the presence monitor.
pub struct AutoAway {
    /// The complete configuration loaded from file or environment
    config: Config,
    /// Everything the poll timer and user commands mutate
    state: PluginState,
    /// Tells us whether the screen is locked
    prober: Box<dyn LockProber>,
}

impl AutoAway {
    /// Loads the persisted settings and sets up the prober.
    ///
    /// Must be called from within a tokio runtime, since the poll timer starts right away.
    ///
    /// # Errors
    ///
    /// - [`Error::NoSettingsDirectory`] or [`Error::CreateSettingsDirectory`] if there's nowhere
    ///   to keep the settings.
    /// - [`Error::InvalidProbeCommand`] if the probe command can't be parsed.
    pub fn new(config: Config) -> Result<Self, Error> {
        let directory = match &config.settings.directory {
            Some(directory) => directory.clone(),
            None => settings::default_directory()?,
        };
        let settings = SettingsStore::load(directory)?;

        info!(directory = %settings.directory().display(), "loaded settings");

        let prober = CommandProber::from_config(&config.prober)?;

        Ok(Self::with_prober(config, settings, Box::new(prober)))
    }

    /// Creates a daemon with an already loaded settings store and a custom prober.
    #[must_use]
    pub fn with_prober(
        config: Config,
        settings: SettingsStore,
        prober: Box<dyn LockProber>,
    ) -> Self {
        let presence = PresenceMonitor::new(
            config.presence.poll_interval,
            config.presence.fallback_away_reason.clone(),
        );

        AutoAway {
            config,
            state: PluginState::new(presence, settings),
            prober,
        }
    }

    /// Returns the shared state.
    #[must_use]
    pub const fn state(&self) -> &PluginState {
        &self.state
    }

    /// Connects to every configured network, then polls the lock state, user input and IRC
    /// messages until the console is closed.
    ///
    /// # Errors
    ///
    /// This function will return an error in the following situations:
    ///
    /// - [`Error::IrcClient`] - if the instantiation of an IRC client fails (e.g. due to
    ///   configuration issues.)
    /// - [`Error::IrcRegistration`] - if user registration fails.
    /// - [`Error::Irc`] - if the message stream of a client can't be taken.
    /// - [`Error::Console`] - if reading user input fails.
    ///
    /// A network that drops its connection is logged and left out from then on, without
    /// affecting the others.
    pub async fn run<R>(&mut self, mut console: Lines<R>) -> Result<(), Error>
    where
        R: AsyncBufRead + Unpin,
    {
        let (sessions, mut incoming) = self.connect().await?;

        notice("AutoAwayPlugin loaded successfully!");

        loop {
            tokio::select! {
                () = self.state.presence.next_tick() => {
                    let transition = self.state.tick(self.prober.as_ref(), &sessions).await;

                    trace!(?transition, "tick finished");
                }
                line = console.next_line() => {
                    let Some(line) = line.map_err(Error::Console)? else {
                        debug!("console closed");
                        break;
                    };

                    self.handle_input(&line);
                }
                Some(message) = incoming.next(), if !incoming.is_empty() => {
                    handle_message(&message);
                }
            }
        }

        sessions.quit(QUIT_MESSAGE);

        // Queued messages are only written while the streams are polled, so keep reading until
        // the servers hang up.
        let drain = incoming.for_each(|message| {
            handle_message(&message);

            future::ready(())
        });

        if time::timeout(QUIT_TIMEOUT, drain).await.is_err() {
            debug!("gave up waiting for networks to close the connection");
        }

        Ok(())
    }

    /// Handles a line of user input, printing the resulting notice.
    fn handle_input(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        match self.state.handle_input(line) {
            Some(reply) => notice(&reply),
            None => notice(&format!("Unknown command: {line}")),
        }
    }

    /// Connects to every configured network and returns the sessions along with their merged
    /// message streams.
    async fn connect(&self) -> Result<(Sessions, SelectAll<MessageStream>), Error> {
        let default_nick = &self.state.settings.settings().here_nick;
        let mut sessions = Sessions::new();
        let mut incoming = SelectAll::new();

        for network in &self.config.networks {
            info!(hostname = %network.hostname, port = network.port(), "connecting to network");

            let mut client = Client::from_config(network.to_client_config(default_nick))
                .await
                .map_err(Error::IrcClient)?;

            client.identify().map_err(Error::IrcRegistration)?;

            incoming.push(messages(network.hostname.clone(), client.stream()?));
            sessions.push(client);
        }

        debug!(num_sessions = sessions.len(), "connected to networks");

        Ok((sessions, incoming))
    }
}

/// Yields the messages of `stream` until the connection fails, logging the error.
fn messages(hostname: String, stream: ClientStream) -> MessageStream {
    stream
        .scan(hostname, |hostname, result| {
            future::ready(match result {
                Ok(message) => Some(message),
                Err(err) => {
                    warn!(%hostname, %err, "lost connection to network");

                    None
                }
            })
        })
        .boxed_local()
}

/// Logs interesting messages from the servers.
fn handle_message(message: &Message) {
    trace!(?message, "processing irc message");

    if let Command::Response(Response::ERR_NICKNAMEINUSE, ref args) = message.command {
        warn!(?args, "nickname is already in use");
    }
}

/// Shows a notice to the user.
fn notice(message: &str) {
    info!(%message, "notice");
    println!("{message}");
}
