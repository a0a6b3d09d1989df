//! Error types

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while loading settings, probing the lock state or talking to IRC.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Neither `$XDG_CONFIG_HOME`, `$HOME` nor the user database yielded a directory.
    #[error("Could not determine where to store settings")]
    #[diagnostic(
        code(autoaway::settings_dir),
        help("set `settings.directory` in the configuration file")
    )]
    NoSettingsDirectory,
    /// The settings directory did not exist and could not be created.
    #[error("Could not create settings directory `{}'", path.display())]
    #[diagnostic(code(autoaway::settings_dir))]
    CreateSettingsDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A setting could not be written to its file.
    #[error("Could not write setting to `{}'", path.display())]
    WriteSetting {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The configured probe command could not be split into arguments.
    #[error("Invalid lock probe command: {0:?}")]
    #[diagnostic(
        code(autoaway::probe_command),
        help("the command is split like a POSIX shell would, check the quoting")
    )]
    InvalidProbeCommand(String),
    /// The configuration could not be loaded or deserialized.
    #[error("Could not load configuration")]
    Config(#[source] Box<figment::Error>),
    /// Failed to create the IRC client.
    #[error("Could not create IRC client")]
    IrcClient(#[source] irc::error::Error),
    /// Failed to register with the IRC server.
    #[error("Could not send registration details for IRC")]
    IrcRegistration(#[source] irc::error::Error),
    /// General IRC communication error.
    #[error("IRC error")]
    Irc(#[from] irc::error::Error),
    /// Reading user input failed.
    #[error("Could not read from the console")]
    Console(#[source] io::Error),
}
