//! Line commands understood by the front end.

use std::fmt;

use beatscene_types::TempoSource;

use crate::scene_store::AdvanceMode;

pub const HELP: &str = "\
commands:
  enable | disable            turn automation on or off
  source <internal|manual|tap>
  bpm <f>                     manual BPM
  tap-bpm <f>                 BPM reported by the tap tempo service
  division <n>                beats per scene advance
  play                        toggle play/pause for the active source
  reset                       zero the beat counter (downbeat)
  scenes <n>                  replace the scene list with n scenes
  mode <forward|ping-pong|random>
  clock play|stop|beat|bpm <f>
  status [--json]
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ClockCommand {
    Play,
    Stop,
    Beat,
    Bpm(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Enable,
    Disable,
    Source(TempoSource),
    Bpm(f64),
    TapBpm(f64),
    Division(i32),
    Play,
    Reset,
    Scenes(usize),
    Mode(AdvanceMode),
    Clock(ClockCommand),
    Status { json: bool },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    Unknown(String),
    MissingArgument(&'static str),
    InvalidArgument { command: &'static str, value: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(word) => write!(f, "unknown command '{}' (try 'help')", word),
            CommandError::MissingArgument(command) => {
                write!(f, "'{}' needs an argument", command)
            }
            CommandError::InvalidArgument { command, value } => {
                write!(f, "invalid argument for '{}': {}", command, value)
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_lowercase().as_str() {
        "enable" | "on" => Command::Enable,
        "disable" | "off" => Command::Disable,
        "source" => Command::Source(argument("source", words.next())?),
        "bpm" => Command::Bpm(argument("bpm", words.next())?),
        "tap-bpm" | "tap" => Command::TapBpm(argument("tap-bpm", words.next())?),
        "division" | "div" => Command::Division(argument("division", words.next())?),
        "play" | "pause" => Command::Play,
        "reset" => Command::Reset,
        "scenes" => Command::Scenes(argument("scenes", words.next())?),
        "mode" => Command::Mode(argument("mode", words.next())?),
        "clock" => Command::Clock(parse_clock(words.next(), words.next())?),
        "status" | "st" => Command::Status {
            json: words.next() == Some("--json"),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_clock(action: Option<&str>, value: Option<&str>) -> Result<ClockCommand, CommandError> {
    match action {
        Some("play") => Ok(ClockCommand::Play),
        Some("stop") => Ok(ClockCommand::Stop),
        Some("beat") => Ok(ClockCommand::Beat),
        Some("bpm") => Ok(ClockCommand::Bpm(argument("clock bpm", value)?)),
        Some(other) => Err(CommandError::InvalidArgument {
            command: "clock",
            value: other.to_string(),
        }),
        None => Err(CommandError::MissingArgument("clock")),
    }
}

fn argument<T: std::str::FromStr>(
    command: &'static str,
    word: Option<&str>,
) -> Result<T, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument(command))?;
    word.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: word.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(line: &str) -> Command {
        parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(ok("enable"), Command::Enable);
        assert_eq!(ok("  DISABLE "), Command::Disable);
        assert_eq!(ok("play"), Command::Play);
        assert_eq!(ok("reset"), Command::Reset);
        assert_eq!(ok("quit"), Command::Quit);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_arguments() {
        assert_eq!(ok("source manual"), Command::Source(TempoSource::ManualBpm));
        assert_eq!(ok("source internal"), Command::Source(TempoSource::InternalClock));
        assert_eq!(ok("bpm 128.5"), Command::Bpm(128.5));
        assert_eq!(ok("tap-bpm 90"), Command::TapBpm(90.0));
        assert_eq!(ok("division -2"), Command::Division(-2));
        assert_eq!(ok("scenes 6"), Command::Scenes(6));
        assert_eq!(ok("mode ping-pong"), Command::Mode(AdvanceMode::PingPong));
        assert_eq!(ok("status --json"), Command::Status { json: true });
        assert_eq!(ok("status"), Command::Status { json: false });
    }

    #[test]
    fn test_clock_commands() {
        assert_eq!(ok("clock play"), Command::Clock(ClockCommand::Play));
        assert_eq!(ok("clock beat"), Command::Clock(ClockCommand::Beat));
        assert_eq!(ok("clock bpm 100"), Command::Clock(ClockCommand::Bpm(100.0)));
        assert_eq!(
            parse("clock"),
            Err(CommandError::MissingArgument("clock"))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".into())));
        assert_eq!(parse("bpm"), Err(CommandError::MissingArgument("bpm")));
        assert_eq!(
            parse("division four"),
            Err(CommandError::InvalidArgument {
                command: "division",
                value: "four".into()
            })
        );
        assert!(parse("source midi").is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CommandError::MissingArgument("bpm").to_string(),
            "'bpm' needs an argument"
        );
    }
}
