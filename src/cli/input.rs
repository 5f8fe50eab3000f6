//! Interactive command parsing

use std::str::FromStr;

use thiserror::Error;

use crate::domain::config::parse_volume;
use crate::domain::recording::Duration;

/// A line typed at the interactive prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserCommand {
    Toggle,
    Stop,
    Play,
    Pause,
    Resume,
    Seek(Duration),
    Volume(f32),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Unknown command: '{0}' (type 'help' for commands)")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("{0}")]
    InvalidArgument(String),
}

impl FromStr for UserCommand {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Self::Toggle);
        };
        let argument = words.next();

        match command.to_lowercase().as_str() {
            "r" | "record" => Ok(Self::Toggle),
            "stop" => Ok(Self::Stop),
            "p" | "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "seek" => {
                let value = argument.ok_or(InputError::MissingArgument("seek"))?;
                value
                    .parse::<Duration>()
                    .map(Self::Seek)
                    .map_err(|e| InputError::InvalidArgument(e.to_string()))
            }
            "volume" | "vol" => {
                let value = argument.ok_or(InputError::MissingArgument("volume"))?;
                parse_volume(value)
                    .map(Self::Volume)
                    .map_err(|e| InputError::InvalidArgument(e.to_string()))
            }
            "s" | "status" => Ok(Self::Status),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(InputError::Unknown(other.to_string())),
        }
    }
}
