use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode},
    tty::IsTty,
};
use keydrill::{
    console::TerminalConsole,
    logging,
    runtime::{CrosstermKeySource, RandomLetters, SystemClock},
    SessionConfig, SessionError, SessionRunner,
};
use std::{
    error::Error,
    io::{self, stdin},
};
use tracing::info;

/// single-letter typing drill measuring reaction time and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Prompts random letters one at a time and times each keypress. Space stops early."
)]
pub struct Cli {
    /// bound the test by seconds instead of by number of inputs
    #[clap(short = 'u', long = "use_time_mode", overrides_with = "no_use_time_mode")]
    use_time_mode: bool,

    /// bound the test by number of inputs (default)
    #[clap(long = "no-use_time_mode", overrides_with = "use_time_mode")]
    no_use_time_mode: bool,

    /// max number of seconds for time mode or maximum number of inputs otherwise
    #[clap(short = 'm', long = "max_value", allow_negative_numbers = true)]
    max_value: i64,
}

impl Cli {
    fn to_session_config(&self) -> Result<SessionConfig, SessionError> {
        SessionConfig::new(self.use_time_mode && !self.no_use_time_mode, self.max_value)
    }
}

/// Keeps the terminal in raw mode for as long as it lives
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match cli.to_session_config() {
        Ok(config) => config,
        Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init()?;
    info!(?cli, "starting");

    let stats = {
        let _raw = RawMode::enable()?;
        let mut runner = SessionRunner::new(
            CrosstermKeySource::new(),
            TerminalConsole::stdout(),
            RandomLetters::new(),
            SystemClock,
        );
        runner.run(&config)?
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydrill::session::Termination;
    use std::time::Duration;

    #[test]
    fn test_cli_requires_max_value() {
        let err = Cli::try_parse_from(["keydrill"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_default_is_count_mode() {
        let cli = Cli::parse_from(["keydrill", "--max_value", "10"]);
        assert!(!cli.use_time_mode);
        assert_eq!(cli.max_value, 10);

        let config = cli.to_session_config().unwrap();
        assert_eq!(config.termination(), Termination::CountBounded(10));
    }

    #[test]
    fn test_cli_time_mode() {
        let cli = Cli::parse_from(["keydrill", "--use_time_mode", "--max_value", "30"]);
        let config = cli.to_session_config().unwrap();
        assert!(config.use_time_mode());
        assert_eq!(
            config.termination(),
            Termination::TimeBounded(Duration::from_secs(30))
        );

        let cli = Cli::parse_from(["keydrill", "-u", "-m", "5"]);
        assert!(cli.to_session_config().unwrap().use_time_mode());
    }

    #[test]
    fn test_cli_last_mode_flag_wins() {
        let cli = Cli::parse_from([
            "keydrill",
            "--use_time_mode",
            "--no-use_time_mode",
            "--max_value",
            "3",
        ]);
        assert!(!cli.to_session_config().unwrap().use_time_mode());

        let cli = Cli::parse_from([
            "keydrill",
            "--no-use_time_mode",
            "--use_time_mode",
            "--max_value",
            "3",
        ]);
        assert!(cli.to_session_config().unwrap().use_time_mode());
    }

    #[test]
    fn test_cli_non_positive_max_value_is_rejected() {
        let cli = Cli::parse_from(["keydrill", "--max_value", "0"]);
        assert!(matches!(
            cli.to_session_config(),
            Err(SessionError::InvalidConfig { max_value: 0 })
        ));

        let cli = Cli::parse_from(["keydrill", "--max_value", "-4"]);
        assert!(matches!(
            cli.to_session_config(),
            Err(SessionError::InvalidConfig { max_value: -4 })
        ));
    }

    #[test]
    fn test_cli_rejects_non_integer_max_value() {
        let err = Cli::try_parse_from(["keydrill", "--max_value", "ten"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
