use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns PONG if no argument is provided, otherwise return a copy of the argument.
///
/// Ref: <https://redis.io/docs/latest/commands/ping>
#[derive(Debug, PartialEq)]
pub struct Ping {
    pub payload: Option<String>,
}

impl Executable for Ping {
    fn exec(self, _store: Store) -> Result<Frame, Error> {
        let res = self
            .payload
            .map_or(Frame::Simple("PONG".to_string()), Frame::Simple);

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let payload = match parser.next_string() {
            Ok(payload) => Some(payload),
            Err(CommandParserError::EndOfStream) => None,
            Err(e) => return Err(e),
        };

        Ok(Self { payload })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::Command;

    #[test]
    fn without_payload() {
        let frame = Frame::Array(vec![Frame::Bulk(Bytes::from("PING"))]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(cmd, Command::Ping(Ping { payload: None }));

        let res = cmd.exec(Store::new()).unwrap();
        assert_eq!(res, Frame::Simple("PONG".to_string()));
    }

    #[test]
    fn with_payload() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("PING")),
            Frame::Bulk(Bytes::from("hello")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Ping(Ping {
                payload: Some("hello".to_string())
            })
        );

        let res = cmd.exec(Store::new()).unwrap();
        assert_eq!(res, Frame::Simple("hello".to_string()));
    }

    #[test]
    fn too_many_arguments() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("PING")),
            Frame::Bulk(Bytes::from("a")),
            Frame::Bulk(Bytes::from("b")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err,
            CommandParserError::WrongNumberOfArguments {
                command: "ping".to_string()
            }
        );
    }
}
