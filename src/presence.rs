//! The away/here state machine and its poll timer.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::prober::{LockProber, LockState};
use crate::session::{CommandSink, PresenceCommand};
use crate::settings::Settings;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The observed state matched the current one.
    None,
    /// The screen got locked and we went away.
    WentAway,
    /// The screen got unlocked and we came back.
    CameBack,
}

/// Tracks whether we're marked away and owns the timer that drives the polling.
#[derive(Debug)]
pub struct PresenceMonitor {
    /// Whether polling is active.
    enabled: bool,
    /// Whether we last told the servers we're away.
    away: bool,
    /// The poll timer, present exactly while `enabled` is true.
    timer: Option<Interval>,
    /// Time between polls.
    period: Duration,
    /// The reason to send when the away message is empty.
    fallback_away_reason: String,
}

impl PresenceMonitor {
    /// Creates a new, enabled monitor in the here state, with its timer running.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(period: Duration, fallback_away_reason: impl Into<String>) -> PresenceMonitor {
        PresenceMonitor {
            enabled: true,
            away: false,
            timer: Some(new_timer(period)),
            period,
            fallback_away_reason: fallback_away_reason.into(),
        }
    }

    /// Returns whether polling is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns whether we're currently marked away.
    #[must_use]
    pub const fn is_away(&self) -> bool {
        self.away
    }

    /// Returns whether the poll timer exists.
    #[must_use]
    pub const fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Flips whether polling is enabled and returns the new value.
    ///
    /// Enabling creates a fresh timer whose first tick is one period away. Disabling drops the
    /// timer, so no further ticks fire.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;

        if self.enabled {
            self.timer = Some(new_timer(self.period));
        } else {
            self.timer = None;
        }

        info!(enabled = self.enabled, "toggled presence polling");

        self.enabled
    }

    /// Waits for the next tick of the poll timer.
    ///
    /// Never resolves while polling is disabled.
    pub async fn next_tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending().await,
        }
    }

    /// Probes the lock state and, if it differs from what we last announced, broadcasts the
    /// nickname change followed by the away status.
    #[instrument(skip_all, fields(away = self.away))]
    pub async fn tick<P, S>(&mut self, prober: &P, sink: &S, settings: &Settings) -> Transition
    where
        P: LockProber + ?Sized,
        S: CommandSink + ?Sized,
    {
        let state = prober.probe().await;

        match (self.away, state) {
            (false, LockState::Locked) => {
                debug!("screen got locked");

                let reason = if settings.away_message.is_empty() {
                    self.fallback_away_reason.clone()
                } else {
                    settings.away_message.clone()
                };

                send(sink, PresenceCommand::Nick(settings.away_nick.clone()));
                send(sink, PresenceCommand::Away(reason));

                self.away = true;

                Transition::WentAway
            }
            (true, LockState::Unlocked) => {
                debug!("screen got unlocked");

                send(sink, PresenceCommand::Nick(settings.here_nick.clone()));
                send(sink, PresenceCommand::Back);

                self.away = false;

                Transition::CameBack
            }
            _ => Transition::None,
        }
    }
}

fn new_timer(period: Duration) -> Interval {
    let mut timer = time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    timer
}

fn send<S: CommandSink + ?Sized>(sink: &S, command: PresenceCommand) {
    if let Err(err) = sink.broadcast(command) {
        warn!(%err, "could not broadcast presence command");
    }
}
