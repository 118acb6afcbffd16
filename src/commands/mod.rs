pub mod copy;
pub mod dbsize;
pub mod del;
pub mod executable;
pub mod exists;
pub mod get;
pub mod keys;
pub mod ping;
pub mod set;

use bytes::Bytes;
use std::str::{self, FromStr};
use std::vec;
use strum_macros::EnumString;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

use copy::Copy as Copy_;
use dbsize::DBSize;
use del::Del;
use exists::Exists;
use get::Get;
use keys::Keys;
use ping::Ping;
use set::Set;

#[derive(Debug, PartialEq)]
pub enum Command {
    Copy(Copy_),
    DBSize(DBSize),
    Del(Del),
    Exists(Exists),
    Get(Get),
    Keys(Keys),
    Ping(Ping),
    Set(Set),
}

/// Every command name the server answers to, spelled the way it is matched: uppercase.
#[derive(Debug, PartialEq, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
enum CommandName {
    Copy,
    Dbsize,
    Del,
    Exists,
    Get,
    Keys,
    Ping,
    Set,
}

impl Executable for Command {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        match self {
            Command::Copy(cmd) => cmd.exec(store),
            Command::DBSize(cmd) => cmd.exec(store),
            Command::Del(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::Keys(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
        }
    }
}

impl Command {
    /// Builds the command registered under `name` from its arguments.
    ///
    /// The lookup is case-insensitive. Each command consumes the arguments it accepts, anything
    /// missing or left over is reported as a wrong number of arguments.
    pub fn from_parts(name: &str, args: Vec<Frame>) -> Result<Command, CommandParserError> {
        let name = name.to_uppercase();
        let command_name =
            CommandName::from_str(&name).map_err(|_| CommandParserError::UnknownCommand {
                command: name.clone(),
            })?;

        let mut parser = CommandParser {
            command: name.to_lowercase(),
            parts: args.into_iter(),
        };

        let command = match command_name {
            CommandName::Copy => Copy_::try_from(&mut parser).map(Command::Copy),
            CommandName::Dbsize => DBSize::try_from(&mut parser).map(Command::DBSize),
            CommandName::Del => Del::try_from(&mut parser).map(Command::Del),
            CommandName::Exists => Exists::try_from(&mut parser).map(Command::Exists),
            CommandName::Get => Get::try_from(&mut parser).map(Command::Get),
            CommandName::Keys => Keys::try_from(&mut parser).map(Command::Keys),
            CommandName::Ping => Ping::try_from(&mut parser).map(Command::Ping),
            CommandName::Set => Set::try_from(&mut parser).map(Command::Set),
        };

        command
            .and_then(|command| parser.finish().map(|_| command))
            .map_err(|err| match err {
                CommandParserError::EndOfStream => CommandParserError::WrongNumberOfArguments {
                    command: parser.command.clone(),
                },
                err => err,
            })
    }
}

impl TryFrom<Frame> for Command {
    type Error = CommandParserError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the server as RESP arrays.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                })
            }
        };

        let mut parts = frames.into_iter();
        let command_name = match parts.next() {
            Some(Frame::Simple(s)) => s,
            Some(Frame::Bulk(bytes)) => str::from_utf8(&bytes[..])?.to_string(),
            Some(frame) => {
                return Err(CommandParserError::InvalidFrame {
                    expected: "bulk string".to_string(),
                    actual: frame,
                })
            }
            None => return Err(CommandParserError::EmptyRequest),
        };

        Command::from_parts(&command_name, parts.collect())
    }
}

/// Executes one client request against `store` and returns the reply for it.
///
/// Requests that can't be turned into a command still get a reply, see
/// [`CommandParserError`]'s conversion into [`Frame`].
pub fn dispatch(frame: Frame, store: Store) -> Result<Frame, Error> {
    match Command::try_from(frame) {
        Ok(cmd) => cmd.exec(store),
        Err(err) => {
            match &err {
                CommandParserError::UnknownCommand { command } => {
                    warn!(command = %command, "unknown command")
                }
                err => debug!("rejected request: {}", err),
            }
            Ok(err.into())
        }
    }
}

pub struct CommandParser {
    command: String,
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn next_frame(&mut self) -> Result<Frame, CommandParserError> {
        self.parts.next().ok_or(CommandParserError::EndOfStream)
    }

    fn next_string(&mut self) -> Result<String, CommandParserError> {
        match self.next_frame()? {
            // Both `Simple` and `Bulk` representation may be strings. Strings are parsed to UTF-8.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        match self.next_frame()? {
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    /// Fails if arguments are left after the command took what it accepts.
    fn finish(&mut self) -> Result<(), CommandParserError> {
        if self.parts.len() == 0 {
            Ok(())
        } else {
            Err(CommandParserError::WrongNumberOfArguments {
                command: self.command.clone(),
            })
        }
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub enum CommandParserError {
    #[error("protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("protocol error; empty request")]
    EmptyRequest,
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("wrong number of arguments for '{command}' command")]
    WrongNumberOfArguments { command: String },
    #[error("protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
}

impl From<CommandParserError> for Frame {
    fn from(err: CommandParserError) -> Frame {
        match err {
            // Unrecognized commands get a blank status reply instead of an error.
            CommandParserError::UnknownCommand { .. } => Frame::Simple(String::new()),
            err => Frame::Error(format!("ERR {}", err)),
        }
    }
}
