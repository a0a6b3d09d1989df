use std::time::Duration;

/// The name of the directory that holds the persisted settings.
pub const SETTINGS_DIR_NAME: &str = "autoaway";

/// File holding the nickname to use while present.
pub const HERE_NICK_FILE: &str = "here_nick";
/// File holding the nickname to use while away.
pub const AWAY_NICK_FILE: &str = "away_nick";
/// File holding the away message.
pub const AWAY_MESSAGE_FILE: &str = "away_msg";

/// Nickname used while present when nothing has been persisted yet.
pub const DEFAULT_HERE_NICK: &str = "user";
/// Nickname used while away when nothing has been persisted yet.
pub const DEFAULT_AWAY_NICK: &str = "user|away";
/// Away message used when nothing has been persisted yet.
pub const DEFAULT_AWAY_MESSAGE: &str = "";

/// How often the lock state is polled.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// The command that reports whether the screensaver is active.
pub const DEFAULT_PROBE_COMMAND: &str = "/usr/bin/gnome-screensaver-command -t";

/// The exact first line of output that means the screen is *not* locked.
pub const DEFAULT_UNLOCKED_OUTPUT: &str = "The screensaver is not currently active.\n";

/// Sent as the away reason when the away message is empty, since an empty `AWAY` means "back".
pub const DEFAULT_FALLBACK_AWAY_REASON: &str = "Away";

/// Name of the configuration file read when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "autoaway.toml";

/// Prefix of the environment variables that override configuration values.
pub const ENV_PREFIX: &str = "AUTOAWAY_";

/// Log filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "autoaway=debug";
