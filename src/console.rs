use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

/// Advisory colour for a piece of output
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Tone {
    Neutral,
    Accent,
    Success,
    Failure,
}

impl Tone {
    fn color(self) -> Option<Color> {
        match self {
            Tone::Neutral => None,
            Tone::Accent => Some(Color::Blue),
            Tone::Success => Some(Color::Green),
            Tone::Failure => Some(Color::Red),
        }
    }
}

/// Where prompts and echoes are written
pub trait Console {
    fn show(&mut self, text: &str, tone: Tone) -> io::Result<()>;

    fn show_line(&mut self, text: &str, tone: Tone) -> io::Result<()> {
        self.show(text, tone)?;
        self.show("\n", Tone::Neutral)
    }
}

/// Colourised output for a terminal that may be in raw mode
pub struct TerminalConsole<W: Write> {
    out: W,
}

impl TerminalConsole<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalConsole<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Console for TerminalConsole<W> {
    fn show(&mut self, text: &str, tone: Tone) -> io::Result<()> {
        // raw mode does not return the carriage on a bare newline
        let text = text.replace('\n', "\r\n");
        match tone.color() {
            Some(color) => queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)?,
            None => queue!(self.out, Print(text))?,
        };
        self.out.flush()
    }
}

/// In-memory console for headless tests
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub writes: Vec<(String, Tone)>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written, without colour.
    pub fn text(&self) -> String {
        self.writes.iter().map(|(text, _)| text.as_str()).collect()
    }

    /// Fragments written with the given tone, in order.
    pub fn written_with(&self, tone: Tone) -> Vec<&str> {
        self.writes
            .iter()
            .filter(|(_, t)| *t == tone)
            .map(|(text, _)| text.as_str())
            .collect()
    }
}

impl Console for RecordingConsole {
    fn show(&mut self, text: &str, tone: Tone) -> io::Result<()> {
        self.writes.push((text.to_string(), tone));
        Ok(())
    }
}
