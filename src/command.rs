//! User command parsing

/// Case-insensitive command name matcher.
///
/// This is useful when you want to extract a command and its arguments from a line of user
/// input. A leading `/` is optional.
///
/// # Example
///
/// ```rust
/// use autoaway::command::Command;
/// let command = Command::new("AwayMsg");
/// assert_eq!(command.parse("/AwayMsg"), Some(""));
/// assert_eq!(command.parse("/awaymsg gone fishing"), Some("gone fishing"));
/// assert_eq!(command.parse("AWAYMSG gone fishing"), Some("gone fishing"));
/// assert_eq!(command.parse("/AwayMsgs gone fishing"), None);
/// ```
pub struct Command {
    /// The command name to match against.
    name: &'static str,
}

impl Command {
    /// Creates a new command matcher for the given name.
    #[must_use]
    pub const fn new(name: &'static str) -> Command {
        Command { name }
    }

    /// Checks if the supplied input starts with the command name, and if so, returns a string
    /// slice that makes up the arguments, if any.
    #[must_use]
    pub fn parse<'a>(&self, input: &'a str) -> Option<&'a str> {
        let input = input.strip_prefix('/').unwrap_or(input);
        let head = input.get(..self.name.len())?;

        if !head.eq_ignore_ascii_case(self.name) {
            return None;
        }

        let suffix = &input[self.name.len()..];

        match suffix.chars().next() {
            // The proceeding character is a whitespace, so we return a slice skipping it
            Some(c) if c.is_ascii_whitespace() => Some(&suffix[1..]),
            // There's a proceeding character and it's not whitespace, so it's part of a longer
            // word.
            Some(_) => None,
            // The input is identical to the command name, so return an empty string.
            None => Some(""),
        }
    }
}

/// Toggles automatic away.
pub const AUTO_AWAY_TOGGLE: Command = Command::new("AutoAwayToggle");
/// Sets the nickname used while present.
pub const HERE_USER_NAME: Command = Command::new("HereUserName");
/// Sets the nickname used while away.
pub const AWAY_USER_NAME: Command = Command::new("AwayUserName");
/// Sets the away message.
pub const AWAY_MSG: Command = Command::new("AwayMsg");

/// A recognized user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand<'a> {
    /// `AutoAwayToggle`
    Toggle,
    /// `HereUserName <nick>`
    HereUserName(&'a str),
    /// `AwayUserName <nick>`
    AwayUserName(&'a str),
    /// `AwayMsg <text>`
    AwayMsg(&'a str),
    /// A known command that was given without its required argument.
    Usage(&'static str),
}

impl<'a> UserCommand<'a> {
    /// Parses a line of user input.
    ///
    /// Returns `None` if the line isn't one of our commands, in which case it should be left for
    /// someone else to handle.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<UserCommand<'a>> {
        let line = line.trim_end_matches(['\r', '\n']);

        if AUTO_AWAY_TOGGLE.parse(line).is_some() {
            Some(UserCommand::Toggle)
        } else if let Some(args) = HERE_USER_NAME.parse(line) {
            Some(first_word(args).map_or(
                UserCommand::Usage("Usage: HEREUSERNAME NICK, Set username when here"),
                UserCommand::HereUserName,
            ))
        } else if let Some(args) = AWAY_USER_NAME.parse(line) {
            Some(first_word(args).map_or(
                UserCommand::Usage("Usage: AWAYUSERNAME NICK, Set username when away"),
                UserCommand::AwayUserName,
            ))
        } else if let Some(args) = AWAY_MSG.parse(line) {
            let message = args.trim_start();

            Some(if message.is_empty() {
                UserCommand::Usage("Usage: AWAYMSG MSG, Set away message")
            } else {
                UserCommand::AwayMsg(message)
            })
        } else {
            None
        }
    }
}

fn first_word(args: &str) -> Option<&str> {
    args.split_whitespace().next()
}
