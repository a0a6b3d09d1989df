//! Persisted nicknames and away message.
//!
//! Each setting lives in its own flat file inside the settings directory, with the value on the
//! first line. Every mutation is written through to disk before the setter returns.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::consts;
use crate::Error;

/// The three user-configurable values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Nickname to use while present.
    pub here_nick: String,
    /// Nickname to use while away.
    pub away_nick: String,
    /// Message to send with `AWAY`.
    pub away_message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            here_nick: consts::DEFAULT_HERE_NICK.to_string(),
            away_nick: consts::DEFAULT_AWAY_NICK.to_string(),
            away_message: consts::DEFAULT_AWAY_MESSAGE.to_string(),
        }
    }
}

/// Identifies one of the persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    HereNick,
    AwayNick,
    AwayMessage,
}

impl Key {
    const ALL: [Key; 3] = [Key::HereNick, Key::AwayNick, Key::AwayMessage];

    /// The name of the file the setting is stored in.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Key::HereNick => consts::HERE_NICK_FILE,
            Key::AwayNick => consts::AWAY_NICK_FILE,
            Key::AwayMessage => consts::AWAY_MESSAGE_FILE,
        }
    }

    fn field(self, settings: &Settings) -> &str {
        match self {
            Key::HereNick => &settings.here_nick,
            Key::AwayNick => &settings.away_nick,
            Key::AwayMessage => &settings.away_message,
        }
    }

    fn field_mut(self, settings: &mut Settings) -> &mut String {
        match self {
            Key::HereNick => &mut settings.here_nick,
            Key::AwayNick => &mut settings.away_nick,
            Key::AwayMessage => &mut settings.away_message,
        }
    }
}

/// Resolves the settings directory from `$XDG_CONFIG_HOME`, then `home`.
///
/// Empty values are treated as unset. `home` is expected to already cover both `$HOME` and the
/// user database, which is what [`dirs::home_dir`] does.
#[must_use]
pub fn resolve_directory(
    xdg_config_home: Option<OsString>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    let base = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.filter(|dir| !dir.as_os_str().is_empty()))?;

    Some(base.join(consts::SETTINGS_DIR_NAME))
}

/// Resolves the settings directory for the current user.
///
/// # Errors
///
/// Returns [`Error::NoSettingsDirectory`] if no home directory can be found.
pub fn default_directory() -> Result<PathBuf, Error> {
    resolve_directory(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
        .ok_or(Error::NoSettingsDirectory)
}

/// In-memory settings backed by a directory of files.
#[derive(Debug)]
pub struct SettingsStore {
    /// Where the setting files live.
    directory: PathBuf,
    /// The current values.
    settings: Settings,
}

impl SettingsStore {
    /// Loads the settings from `directory`, creating it with default-valued files first if it
    /// doesn't exist.
    ///
    /// Files that are missing or unreadable fall back to their default value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateSettingsDirectory`] if the directory cannot be created.
    #[instrument(skip_all, fields(directory = %directory.as_ref().display()))]
    pub fn load(directory: impl AsRef<Path>) -> Result<SettingsStore, Error> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.is_dir() {
            info!("creating settings directory");

            fs::create_dir_all(&directory).map_err(|source| Error::CreateSettingsDirectory {
                path: directory.clone(),
                source,
            })?;

            let defaults = Settings::default();

            for key in Key::ALL {
                let path = directory.join(key.file_name());

                if let Err(err) = write_value(&path, key.field(&defaults)) {
                    warn!(?key, %err, "could not write default setting");
                }
            }
        }

        let mut settings = Settings::default();

        for key in Key::ALL {
            let path = directory.join(key.file_name());

            match read_first_line(&path) {
                Ok(value) => *key.field_mut(&mut settings) = value,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    debug!(?key, "setting file is missing, restoring default");

                    if let Err(err) = write_value(&path, key.field(&settings)) {
                        warn!(?key, %err, "could not write default setting");
                    }
                }
                Err(err) => warn!(?key, %err, "could not read setting, using default"),
            }
        }

        debug!(?settings, "loaded settings");

        Ok(SettingsStore {
            directory,
            settings,
        })
    }

    /// Returns the directory the settings are persisted in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the current settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sets the nickname used while present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteSetting`] if the value couldn't be persisted. The in-memory value is
    /// updated regardless.
    pub fn set_here_nick(&mut self, nick: impl Into<String>) -> Result<(), Error> {
        self.set(Key::HereNick, nick.into())
    }

    /// Sets the nickname used while away.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteSetting`] if the value couldn't be persisted. The in-memory value is
    /// updated regardless.
    pub fn set_away_nick(&mut self, nick: impl Into<String>) -> Result<(), Error> {
        self.set(Key::AwayNick, nick.into())
    }

    /// Sets the away message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteSetting`] if the value couldn't be persisted. The in-memory value is
    /// updated regardless.
    ///
    /// Anything after the first line break is dropped.
    pub fn set_away_message(&mut self, message: impl Into<String>) -> Result<(), Error> {
        self.set(Key::AwayMessage, message.into())
    }

    /// Stores `value` in memory and on disk. Only its first line is kept.
    fn set(&mut self, key: Key, mut value: String) -> Result<(), Error> {
        let path = self.directory.join(key.file_name());

        if let Some(end) = value.find(['\r', '\n']) {
            warn!(?key, "setting spans multiple lines, keeping only the first");

            value.truncate(end);
        }

        debug!(?key, %value, "updating setting");

        *key.field_mut(&mut self.settings) = value;

        write_value(&path, key.field(&self.settings))
            .map_err(|source| Error::WriteSetting { path, source })
    }
}

/// Reads the first line of the file at `path`, without its line terminator.
fn read_first_line(path: &Path) -> io::Result<String> {
    let contents = fs::read_to_string(path)?;

    Ok(contents.lines().next().unwrap_or_default().to_string())
}

fn write_value(path: &Path, value: &str) -> io::Result<()> {
    fs::write(path, format!("{value}\n"))
}
