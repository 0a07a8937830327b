use chrono::{DateTime, Local};
use itertools::{Either, Itertools};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::session::Round;
use crate::util::{mean, percentage};

/// `ctime(3)` layout, e.g. `Sun Oct 18 09:05:01 2026`
pub const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Aggregate results of one finished session.
///
/// A session with no rounds yields sentinel values: `accuracy` and every
/// average are `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub accuracy: f64,
    pub rounds: Vec<Round>,
    pub hit_count: usize,
    pub round_count: usize,
    pub test_duration: f64,
    pub test_start: String,
    pub test_end: String,
    pub average_duration: f64,
    pub hit_average_duration: f64,
    pub miss_average_duration: f64,
}

impl SessionStats {
    pub fn compute(
        rounds: Vec<Round>,
        test_start: &DateTime<Local>,
        test_end: &DateTime<Local>,
        test_duration: Duration,
    ) -> Self {
        let round_count = rounds.len();
        if round_count == 0 {
            warn!("session ended before any round was recorded");
        }

        let (hit_durations, miss_durations): (Vec<f64>, Vec<f64>) =
            rounds.iter().partition_map(|round| {
                if round.is_hit() {
                    Either::Left(round.duration)
                } else {
                    Either::Right(round.duration)
                }
            });
        let all_durations = rounds.iter().map(|r| r.duration).collect::<Vec<f64>>();
        let hit_count = hit_durations.len();

        Self {
            accuracy: percentage(hit_count, round_count),
            hit_count,
            round_count,
            test_duration: test_duration.as_secs_f64(),
            test_start: format_timestamp(test_start),
            test_end: format_timestamp(test_end),
            average_duration: mean(&all_durations).unwrap_or(0.0),
            hit_average_duration: mean(&hit_durations).unwrap_or(0.0),
            miss_average_duration: mean(&miss_durations).unwrap_or(0.0),
            rounds,
        }
    }

    pub fn miss_count(&self) -> usize {
        self.round_count - self.hit_count
    }

    pub fn is_empty(&self) -> bool {
        self.round_count == 0
    }
}
