use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::console::{Console, Tone};
use crate::error::SessionError;
use crate::runtime::{Clock, KeySource, LetterSource};
use crate::stats::SessionStats;

/// Pressing this key ends the session without recording the round.
pub const ESCAPE_KEY: char = ' ';

/// Validated termination parameters for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    use_time_mode: bool,
    max_value: u64,
}

impl SessionConfig {
    pub fn new(use_time_mode: bool, max_value: i64) -> Result<Self, SessionError> {
        if max_value <= 0 {
            return Err(SessionError::InvalidConfig { max_value });
        }
        Ok(Self {
            use_time_mode,
            max_value: max_value as u64,
        })
    }

    pub fn use_time_mode(&self) -> bool {
        self.use_time_mode
    }

    pub fn max_value(&self) -> u64 {
        self.max_value
    }

    pub fn termination(&self) -> Termination {
        if self.use_time_mode {
            Termination::TimeBounded(Duration::from_secs(self.max_value))
        } else {
            Termination::CountBounded(self.max_value as usize)
        }
    }
}

/// When the round loop stops on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Termination {
    #[strum(serialize = "seconds")]
    TimeBounded(Duration),
    #[strum(serialize = "inputs")]
    CountBounded(usize),
}

impl Termination {
    /// Checked only after a round has been recorded.
    pub fn check(&self, round_count: usize, elapsed: Duration) -> Option<FinishReason> {
        match *self {
            Termination::TimeBounded(limit) if elapsed >= limit => {
                Some(FinishReason::TimeLimit { elapsed })
            }
            Termination::CountBounded(limit) if round_count >= limit => {
                Some(FinishReason::RoundLimit {
                    rounds: round_count,
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Escape,
    TimeLimit { elapsed: Duration },
    RoundLimit { rounds: usize },
}

/// One prompt and the key typed in response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub requested: char,
    pub received: char,
    /// seconds between the prompt and the keypress
    pub duration: f64,
}

impl Round {
    pub fn new(requested: char, typed: char, latency: Duration) -> Self {
        Self {
            requested,
            received: lowercase_char(typed),
            duration: latency.as_secs_f64(),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.received == self.requested
    }
}

/// Lowercase form of `c`, or `c` itself when that form is not a single character.
fn lowercase_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

/// Drives a single drill: banner, start key, prompt loop, aggregation.
pub struct SessionRunner<K, C, L, T> {
    keys: K,
    console: C,
    letters: L,
    clock: T,
    last_finish_reason: Option<FinishReason>,
}

impl<K, C, L, T> SessionRunner<K, C, L, T>
where
    K: KeySource,
    C: Console,
    L: LetterSource,
    T: Clock,
{
    pub fn new(keys: K, console: C, letters: L, clock: T) -> Self {
        Self {
            keys,
            console,
            letters,
            clock,
            last_finish_reason: None,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn last_finish_reason(&self) -> Option<FinishReason> {
        self.last_finish_reason
    }

    pub fn run(&mut self, config: &SessionConfig) -> Result<SessionStats, SessionError> {
        let termination = config.termination();
        self.console.show_line(
            &format!("Test running up to {} {}.", config.max_value(), termination),
            Tone::Neutral,
        )?;
        self.console
            .show_line("Press any key to start the test", Tone::Neutral)?;
        self.keys.read_char()?;

        let started = self.clock.now();
        let test_start = self.clock.wall_now();
        info!(mode = %termination, max_value = config.max_value(), "session started");

        let mut rounds: Vec<Round> = Vec::new();
        let reason = loop {
            let round_start = self.clock.now();
            let requested = self.letters.next_letter();
            self.prompt(requested)?;

            let typed = self.keys.read_char()?;
            if typed == ESCAPE_KEY {
                break FinishReason::Escape;
            }

            let round = Round::new(
                requested,
                typed,
                self.clock.now().saturating_duration_since(round_start),
            );
            self.echo(&round)?;
            debug!(
                requested = %round.requested,
                received = %round.received,
                duration = round.duration,
                "round recorded"
            );
            rounds.push(round);

            let elapsed = self.clock.now().saturating_duration_since(started);
            if let Some(reason) = termination.check(rounds.len(), elapsed) {
                break reason;
            }
        };

        let test_duration = self.clock.now().saturating_duration_since(started);
        let test_end = self.clock.wall_now();
        self.announce(reason, config)?;
        info!(?reason, rounds = rounds.len(), "session finished");
        self.last_finish_reason = Some(reason);

        Ok(SessionStats::compute(rounds, &test_start, &test_end, test_duration))
    }

    fn prompt(&mut self, requested: char) -> Result<(), SessionError> {
        self.console.show("Type letter '", Tone::Neutral)?;
        self.console.show(&requested.to_string(), Tone::Accent)?;
        self.console.show_line("'", Tone::Neutral)?;
        Ok(())
    }

    fn echo(&mut self, round: &Round) -> Result<(), SessionError> {
        let tone = if round.is_hit() {
            Tone::Success
        } else {
            Tone::Failure
        };
        self.console.show("You typed letter ", Tone::Neutral)?;
        self.console.show_line(&round.received.to_string(), tone)?;
        Ok(())
    }

    fn announce(
        &mut self,
        reason: FinishReason,
        config: &SessionConfig,
    ) -> Result<(), SessionError> {
        let message = match reason {
            FinishReason::Escape => "Test stopped by user".to_string(),
            FinishReason::TimeLimit { elapsed } => format!(
                "Current test duration ({:.3}) exceeds maximum of {}",
                elapsed.as_secs_f64(),
                config.max_value()
            ),
            FinishReason::RoundLimit { .. } => {
                format!("Reached maximum number of inputs ({})", config.max_value())
            }
        };
        self.console.show_line(&message, Tone::Neutral)?;
        self.console.show_line("Test Finished!", Tone::Accent)?;
        self.console.show("\n", Tone::Neutral)?;
        Ok(())
    }
}
