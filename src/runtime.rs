use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::ThreadRng;
use rand::Rng;

/// Letters a prompt is drawn from.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Blocking source of single keypresses
pub trait KeySource {
    /// Block until exactly one character is available.
    fn read_char(&mut self) -> io::Result<char>;
}

/// What a raw terminal key event means to the drill
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyInput {
    Char(char),
    Abort,
    Ignore,
}

/// Map a crossterm key event onto the character a line-less read would return.
pub fn translate_key(key: &KeyEvent) -> KeyInput {
    if key.kind != KeyEventKind::Press {
        return KeyInput::Ignore;
    }

    match key.code {
        KeyCode::Char('c' | 'C') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyInput::Abort
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if c.is_ascii() {
                KeyInput::Char(((c as u8) & 0x1f) as char)
            } else {
                KeyInput::Ignore
            }
        }
        // terminals send Alt+key as an ESC prefix
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::ALT) => KeyInput::Char('\x1b'),
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Enter => KeyInput::Char('\r'),
        KeyCode::Tab => KeyInput::Char('\t'),
        KeyCode::Backspace => KeyInput::Char('\x7f'),
        KeyCode::Esc => KeyInput::Char('\x1b'),
        _ => KeyInput::Ignore,
    }
}

/// Production key source reading from the controlling terminal.
/// Expects raw mode to be enabled by the caller.
#[derive(Debug, Default)]
pub struct CrosstermKeySource;

impl CrosstermKeySource {
    pub fn new() -> Self {
        Self
    }
}

impl KeySource for CrosstermKeySource {
    fn read_char(&mut self) -> io::Result<char> {
        loop {
            if let Event::Key(key) = event::read()? {
                match translate_key(&key) {
                    KeyInput::Char(c) => return Ok(c),
                    KeyInput::Abort => {
                        return Err(io::Error::new(
                            io::ErrorKind::Interrupted,
                            "interrupted by user",
                        ))
                    }
                    KeyInput::Ignore => {}
                }
            }
        }
    }
}

/// Time source for prompt latency and session length
pub trait Clock {
    fn now(&self) -> Instant;
    /// Wall-clock time, used only for human-readable timestamps.
    fn wall_now(&self) -> DateTime<Local>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to. Clones share the same offset.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Local>,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: Local::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }

    fn wall_now(&self) -> DateTime<Local> {
        let offset = chrono::Duration::from_std(self.offset.get())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + offset
    }
}

/// Test key source: replays keystrokes, each one arriving `latency` after the read starts.
#[derive(Debug)]
pub struct ScriptedKeySource {
    clock: ManualClock,
    keys: VecDeque<(char, Duration)>,
}

impl ScriptedKeySource {
    pub fn new<I>(clock: ManualClock, keys: I) -> Self
    where
        I: IntoIterator<Item = (char, Duration)>,
    {
        Self {
            clock,
            keys: keys.into_iter().collect(),
        }
    }

    /// Every character of `typed` arrives after the same latency.
    pub fn typed(clock: ManualClock, typed: &str, latency: Duration) -> Self {
        Self::new(clock, typed.chars().map(|c| (c, latency)))
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeySource {
    fn read_char(&mut self) -> io::Result<char> {
        match self.keys.pop_front() {
            Some((c, latency)) => {
                self.clock.advance(latency);
                Ok(c)
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "scripted key source exhausted",
            )),
        }
    }
}

/// Chooses the letter to prompt for next
pub trait LetterSource {
    fn next_letter(&mut self) -> char;
}

/// Uniform choice over the lowercase Latin alphabet
#[derive(Debug)]
pub struct RandomLetters<R: Rng = ThreadRng> {
    rng: R,
}

impl RandomLetters<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomLetters<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomLetters<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> LetterSource for RandomLetters<R> {
    fn next_letter(&mut self) -> char {
        self.rng.gen_range(b'a'..=b'z') as char
    }
}

/// Test letter source cycling through a fixed sequence
#[derive(Debug, Clone)]
pub struct FixedLetters {
    letters: Vec<char>,
    pos: usize,
}

impl FixedLetters {
    pub fn new(letters: &str) -> Self {
        let letters = if letters.is_empty() {
            ALPHABET
        } else {
            letters
        };
        Self {
            letters: letters.chars().collect(),
            pos: 0,
        }
    }
}

impl LetterSource for FixedLetters {
    fn next_letter(&mut self) -> char {
        let c = self.letters[self.pos % self.letters.len()];
        self.pos += 1;
        c
    }
}
