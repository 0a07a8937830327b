use std::time::Duration;

use keydrill::console::{RecordingConsole, Tone};
use keydrill::runtime::{FixedLetters, ManualClock, RandomLetters, ScriptedKeySource, ALPHABET};
use keydrill::session::FinishReason;
use keydrill::{SessionConfig, SessionRunner, SessionStats};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Headless session through the public API: scripted keys against a manual clock.
fn run(keys: Vec<(char, Duration)>, letters: &str, time_mode: bool, max: i64) -> SessionStats {
    let clock = ManualClock::new();
    let mut runner = SessionRunner::new(
        ScriptedKeySource::new(clock.clone(), keys),
        RecordingConsole::new(),
        FixedLetters::new(letters),
        clock,
    );
    let config = SessionConfig::new(time_mode, max).unwrap();
    runner.run(&config).unwrap()
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn headless_count_session_aggregates() {
    let stats = run(
        vec![
            ('s', ms(800)),
            ('h', ms(150)),
            ('X', ms(450)),
            ('l', ms(250)),
            ('o', ms(350)),
        ],
        "hello",
        false,
        4,
    );

    assert_eq!(stats.round_count, 4);
    assert_eq!(stats.hit_count, 2);
    assert_eq!(stats.hit_count + stats.miss_count(), stats.round_count);
    assert_eq!(stats.accuracy, 50.0);
    assert!((stats.hit_average_duration - 0.2).abs() < 1e-9);
    assert!((stats.miss_average_duration - 0.4).abs() < 1e-9);
    assert!((stats.average_duration - 0.3).abs() < 1e-9);
    assert!(stats.rounds.iter().all(|r| r.received.is_lowercase()));
}

#[test]
fn headless_time_session_never_starts_round_past_bound() {
    let keys: Vec<(char, Duration)> = std::iter::once(('s', ms(10)))
        .chain((0..40).map(|i| ('q', ms(70 + (i % 5) * 40))))
        .collect();

    let stats = run(keys, "q", true, 2);

    assert!(stats.test_duration >= 2.0);
    let mut started_at = 0.0;
    for round in &stats.rounds {
        assert!(started_at < 2.0, "round started at {started_at}");
        started_at += round.duration;
    }
    assert!((started_at - stats.test_duration).abs() < 1e-9);
}

#[test]
fn headless_escape_first_round() {
    let clock = ManualClock::new();
    let mut runner = SessionRunner::new(
        ScriptedKeySource::typed(clock.clone(), "g ", ms(100)),
        RecordingConsole::new(),
        FixedLetters::new("a"),
        clock,
    );
    let config = SessionConfig::new(false, 10).unwrap();

    let stats = runner.run(&config).unwrap();

    assert!(stats.is_empty());
    assert_eq!(stats.accuracy, 0.0);
    assert_eq!(runner.last_finish_reason(), Some(FinishReason::Escape));
    assert_eq!(
        runner.console().written_with(Tone::Accent),
        vec!["a", "Test Finished!"]
    );
}

#[test]
fn headless_random_prompts_are_lowercase_letters() {
    let clock = ManualClock::new();
    let keys = std::iter::repeat(('a', ms(20))).take(51);
    let mut runner = SessionRunner::new(
        ScriptedKeySource::new(clock.clone(), keys),
        RecordingConsole::new(),
        RandomLetters::with_rng(StdRng::seed_from_u64(3)),
        clock,
    );
    let config = SessionConfig::new(false, 50).unwrap();

    let stats = runner.run(&config).unwrap();

    assert_eq!(stats.round_count, 50);
    assert!(stats.rounds.iter().all(|r| ALPHABET.contains(r.requested)));
    assert_eq!(
        stats.hit_count,
        stats.rounds.iter().filter(|r| r.requested == 'a').count()
    );
}

#[test]
fn headless_stats_print_as_json() {
    let stats = run(vec![('s', ms(1)), ('b', ms(400))], "b", false, 1);

    let json = serde_json::to_string_pretty(&stats).unwrap();
    let back: SessionStats = serde_json::from_str(&json).unwrap();

    assert_eq!(back, stats);
    assert!(json.contains("\"hit_average_duration\""));
}
