use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns the number of keys in the store.
///
/// Ref: <https://redis.io/docs/latest/commands/dbsize/>
#[derive(Debug, PartialEq)]
pub struct DBSize;

impl Executable for DBSize {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        Ok(Frame::Simple(store.size().to_string()))
    }
}

impl TryFrom<&mut CommandParser> for DBSize {
    type Error = CommandParserError;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
