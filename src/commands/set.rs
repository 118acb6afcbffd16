use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Set `key` to hold `value`, overwriting whatever it held before.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Set {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        store.set(self.key, self.value);

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn new_key() {
        let store = Store::new();

        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from("key1")),
            Frame::Bulk(Bytes::from("1")),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Set(Set {
                key: String::from("key1"),
                value: Bytes::from("1")
            })
        );

        let res = cmd.exec(store.clone()).unwrap();

        assert_eq!(res, Frame::Simple("OK".to_string()));
        assert_eq!(store.get("key1"), Some(Bytes::from("1")));
    }

    #[test]
    fn overwrites_existing_key() {
        let store = Store::new();
        store.set(String::from("key1"), Bytes::from("old"));

        let cmd = Set {
            key: String::from("key1"),
            value: Bytes::from("new"),
        };
        cmd.exec(store.clone()).unwrap();

        assert_eq!(store.get("key1"), Some(Bytes::from("new")));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn binary_value() {
        let store = Store::new();

        let cmd = Set {
            key: String::from("key1"),
            value: Bytes::from("first\r\nsecond"),
        };
        cmd.exec(store.clone()).unwrap();

        assert_eq!(store.get("key1"), Some(Bytes::from("first\r\nsecond")));
    }

    #[test]
    fn missing_value() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from("key1")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err,
            CommandParserError::WrongNumberOfArguments {
                command: "set".to_string()
            }
        );
    }
}
