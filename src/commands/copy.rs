use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Copies the value stored at `source` to `destination`, replacing whatever `destination` held.
///
/// When `source` does not exist `destination` is still written, with an empty value, and the reply
/// is `nil`. Reading `source` and writing `destination` are two separate store operations, so a
/// concurrent write to `destination` landing between them is overwritten.
///
/// Ref: <https://redis.io/docs/latest/commands/copy/>
#[derive(Debug, PartialEq)]
pub struct Copy {
    pub source: String,
    pub destination: String,
}

impl Executable for Copy {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let value = store.get(&self.source);

        store.set(self.destination, value.clone().unwrap_or_default());

        let res = match value {
            Some(_) => Frame::Simple("1".to_string()),
            None => Frame::Null,
        };

        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Copy {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let source = parser.next_string()?;
        let destination = parser.next_string()?;

        Ok(Self {
            source,
            destination,
        })
    }
}
