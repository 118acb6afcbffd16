use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Removes `key`. Removing a key that does not exist is not an error, the reply is `OK` either way.
///
/// Ref: <https://redis.io/commands/del>
#[derive(Debug, PartialEq)]
pub struct Del {
    pub key: String,
}

impl Executable for Del {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        store.delete(&self.key);

        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
