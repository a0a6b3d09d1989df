//! Screen lock detection.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{trace, warn};

use crate::config::ProberConfig;
use crate::Error;

/// The observed state of the desktop session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Locked,
    Unlocked,
}

/// Something that can tell whether the screen is currently locked.
#[async_trait]
pub trait LockProber: Send + Sync {
    /// Returns the current lock state.
    ///
    /// This never fails; implementations that can't determine the state report
    /// [`LockState::Unlocked`].
    async fn probe(&self) -> LockState;
}

/// Probes the lock state by running an external command and matching the first line of its
/// output against a literal.
///
/// The line is compared including its trailing newline. An exact match means unlocked, any other
/// line means locked. If the command can't be started or prints nothing, the screen is assumed to
/// be unlocked.
#[derive(Debug, Clone)]
pub struct CommandProber {
    /// The program to run.
    program: String,
    /// Arguments passed to `program`.
    args: Vec<String>,
    /// The first line of output that means "unlocked".
    unlocked_output: String,
}

impl CommandProber {
    /// Creates a new prober that runs `program` with `args`.
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        unlocked_output: impl Into<String>,
    ) -> CommandProber {
        CommandProber {
            program: program.into(),
            args,
            unlocked_output: unlocked_output.into(),
        }
    }

    /// Creates a new prober from the configured command line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbeCommand`] if the command line has unbalanced quotes or is
    /// empty.
    pub fn from_config(config: &ProberConfig) -> Result<CommandProber, Error> {
        let mut words = shlex::split(&config.command)
            .ok_or_else(|| Error::InvalidProbeCommand(config.command.clone()))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| Error::InvalidProbeCommand(config.command.clone()))?;

        Ok(CommandProber::new(
            program,
            words.collect(),
            config.unlocked_output.clone(),
        ))
    }

    /// Runs the command and returns its first line of output, or `None` if it couldn't be run or
    /// printed nothing.
    async fn first_line(&self) -> Option<String> {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                warn!(program = %self.program, %err, "could not run lock probe");

                return None;
            }
        };

        let stdout = child.stdout.take()?;
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();

        let result = reader.read_line(&mut line).await;

        // Only the first line matters, so a probe that keeps running after printing it is
        // stopped here. The child is reaped even when reading failed.
        drop(reader);
        if let Err(err) = child.start_kill() {
            trace!(program = %self.program, %err, "lock probe already exited");
        }
        if let Err(err) = child.wait().await {
            warn!(program = %self.program, %err, "could not wait for lock probe");
        }

        match result {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(err) => {
                warn!(program = %self.program, %err, "could not read lock probe output");

                None
            }
        }
    }
}

#[async_trait]
impl LockProber for CommandProber {
    async fn probe(&self) -> LockState {
        let state = match self.first_line().await {
            Some(line) if line == self.unlocked_output => LockState::Unlocked,
            Some(_) => LockState::Locked,
            None => LockState::Unlocked,
        };

        trace!(?state, "probed lock state");

        state
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(command: &str) -> ProberConfig {
        ProberConfig {
            command: command.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn it_should_split_the_command_line() {
        let prober =
            CommandProber::from_config(&config("/usr/bin/probe -t 'two words'")).unwrap();

        assert_eq!(prober.program, "/usr/bin/probe");
        assert_eq!(prober.args, vec!["-t", "two words"]);
    }

    #[test]
    fn it_should_reject_an_empty_command() {
        assert!(matches!(
            CommandProber::from_config(&config("   ")),
            Err(Error::InvalidProbeCommand(_))
        ));
    }

    #[test]
    fn it_should_reject_unbalanced_quotes() {
        assert!(matches!(
            CommandProber::from_config(&config("probe 'oops")),
            Err(Error::InvalidProbeCommand(_))
        ));
    }

    #[tokio::test]
    async fn it_should_read_matching_output_as_unlocked() {
        let prober = CommandProber::new(
            "echo",
            vec!["The screensaver is not currently active.".to_string()],
            "The screensaver is not currently active.\n",
        );

        assert_eq!(prober.probe().await, LockState::Unlocked);
    }

    #[tokio::test]
    async fn it_should_read_other_output_as_locked() {
        let prober = CommandProber::new(
            "echo",
            vec!["The screensaver is active".to_string()],
            "The screensaver is not currently active.\n",
        );

        assert_eq!(prober.probe().await, LockState::Locked);
    }

    #[tokio::test]
    async fn it_should_only_compare_the_first_line() {
        let prober = CommandProber::new(
            "printf",
            vec!["unlocked\nsomething else\n".to_string()],
            "unlocked\n",
        );

        assert_eq!(prober.probe().await, LockState::Unlocked);
    }

    #[tokio::test]
    async fn it_should_require_the_trailing_newline() {
        let prober = CommandProber::new("printf", vec!["unlocked".to_string()], "unlocked\n");

        assert_eq!(prober.probe().await, LockState::Locked);
    }

    #[tokio::test]
    async fn it_should_fail_open_when_the_command_is_missing() {
        let prober = CommandProber::new(
            "/nonexistent/autoaway-probe",
            vec![],
            "The screensaver is not currently active.\n",
        );

        assert_eq!(prober.probe().await, LockState::Unlocked);
    }

    #[tokio::test]
    async fn it_should_not_wait_for_the_command_to_exit() {
        let prober = CommandProber::new(
            "sh",
            vec!["-c".to_string(), "echo unlocked; sleep 20".to_string()],
            "unlocked\n",
        );

        let state = tokio::time::timeout(Duration::from_secs(3), prober.probe())
            .await
            .expect("waited for the command to exit");

        assert_eq!(state, LockState::Unlocked);
    }

    #[tokio::test]
    async fn it_should_fail_open_without_output() {
        let prober = CommandProber::new("true", vec![], "unlocked\n");

        assert_eq!(prober.probe().await, LockState::Unlocked);
    }
}
