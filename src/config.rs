use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::consts;
use crate::Error;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Tracing configuration
    #[serde(default)]
    pub tracing: TracingConfig,
    /// Presence monitor configuration
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Lock probe configuration
    #[serde(default)]
    pub prober: ProberConfig,
    /// Settings store configuration
    #[serde(default)]
    pub settings: SettingsConfig,
    /// IRC networks to keep sessions with
    #[serde(default)]
    pub networks: Vec<IrcConfig>,
}

impl Config {
    /// Returns the layered configuration sources: the TOML file at `path`, overridden by
    /// `AUTOAWAY_` prefixed environment variables where `__` separates nested keys.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(consts::ENV_PREFIX).split("__"))
    }

    /// Loads the configuration from `path` and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a source cannot be read or a value has the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
        Self::figment(path)
            .extract()
            .map_err(|err| Error::Config(Box::new(err)))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TracingConfig {
    /// Export spans over OTLP
    #[serde(default)]
    pub enabled: bool,
    /// Log filter directives, used unless `RUST_LOG` is set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        TracingConfig {
            enabled: false,
            filter: default_log_filter(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PresenceConfig {
    /// How often to poll the lock state
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
    /// The reason sent with `AWAY` when the away message is empty
    #[serde(default = "default_fallback_away_reason")]
    pub fallback_away_reason: String,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        PresenceConfig {
            poll_interval: default_poll_interval(),
            fallback_away_reason: default_fallback_away_reason(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProberConfig {
    /// The command line to run, split like a shell would
    #[serde(default = "default_probe_command")]
    pub command: String,
    /// The exact first line of output, newline included, that means "unlocked"
    #[serde(default = "default_unlocked_output")]
    pub unlocked_output: String,
}

impl Default for ProberConfig {
    fn default() -> Self {
        ProberConfig {
            command: default_probe_command(),
            unlocked_output: default_unlocked_output(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SettingsConfig {
    /// Explicit settings directory, bypassing the `$XDG_CONFIG_HOME`/`$HOME` lookup
    pub directory: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct IrcChannelConfig {
    /// The shared key to access the channel.
    pub key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct IrcTlsConfig {
    /// Enable TLS.
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct IrcConfig {
    /// The nickname to register with. Defaults to the persisted here-nick.
    pub nickname: Option<String>,
    /// Alternative nicknames for the client, if the default is taken.
    #[serde(default)]
    pub alt_nicks: Vec<String>,
    /// The client's username.
    pub username: Option<String>,
    /// The client's real name.
    pub realname: Option<String>,
    /// The hostname of the server to connect to.
    pub hostname: String,
    /// The password to connect to the server.
    pub password: Option<String>,
    /// The port number of the server to connect to.
    pub port: Option<u16>,
    /// TLS configuration.
    pub tls: Option<IrcTlsConfig>,
    /// List of channels to join.
    #[serde(default)]
    pub channels: HashMap<String, Option<IrcChannelConfig>>,
}

impl IrcConfig {
    #[must_use]
    pub fn port(&self) -> u16 {
        match self.port {
            Some(port) => port,
            None => self.fallback_port(),
        }
    }

    /// Return the port number to use based on whether the connection requires TLS or not.
    fn fallback_port(&self) -> u16 {
        if self.tls.as_ref().map(|tls| tls.enabled) == Some(true) {
            6697
        } else {
            6667
        }
    }

    /// Builds the client configuration, registering as `default_nick` unless a nickname is set.
    #[must_use]
    pub fn to_client_config(&self, default_nick: &str) -> irc::client::data::Config {
        let channels = self.channels.keys().cloned().collect::<Vec<_>>();
        let channel_keys = self
            .channels
            .iter()
            .filter_map(|(name, config)| {
                let key = config.as_ref()?.key.clone()?;

                Some((name.clone(), key))
            })
            .collect();

        irc::client::data::Config {
            nickname: Some(
                self.nickname
                    .clone()
                    .unwrap_or_else(|| default_nick.to_string()),
            ),
            alt_nicks: self.alt_nicks.clone(),
            username: self.username.clone(),
            realname: self.realname.clone(),
            server: Some(self.hostname.clone()),
            password: self.password.clone(),
            port: Some(self.port()),
            use_tls: Some(self.tls.as_ref().is_some_and(|tls| tls.enabled)),
            channels,
            channel_keys,
            ..Default::default()
        }
    }
}

#[must_use]
pub fn default_log_filter() -> String {
    consts::DEFAULT_LOG_FILTER.to_string()
}

#[must_use]
pub const fn default_poll_interval() -> Duration {
    consts::DEFAULT_POLL_INTERVAL
}

#[must_use]
pub fn default_fallback_away_reason() -> String {
    consts::DEFAULT_FALLBACK_AWAY_REASON.to_string()
}

#[must_use]
pub fn default_probe_command() -> String {
    consts::DEFAULT_PROBE_COMMAND.to_string()
}

#[must_use]
pub fn default_unlocked_output() -> String {
    consts::DEFAULT_UNLOCKED_OUTPUT.to_string()
}
