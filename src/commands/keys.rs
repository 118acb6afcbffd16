use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns all keys matching a glob pattern, every key when no pattern is given.
///
/// Ref: <https://redis.io/commands/keys>
#[derive(Debug, PartialEq)]
pub struct Keys {
    pub pattern: String,
}

impl Executable for Keys {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let res = store
            .keys_matching(&self.pattern)
            .into_iter()
            .map(|key| Frame::Bulk(Bytes::from(key)))
            .collect();

        Ok(Frame::Array(res))
    }
}

impl TryFrom<&mut CommandParser> for Keys {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let pattern = match parser.next_string() {
            Ok(pattern) => pattern,
            Err(CommandParserError::EndOfStream) => "*".to_string(),
            Err(err) => return Err(err),
        };

        Ok(Self { pattern })
    }
}
