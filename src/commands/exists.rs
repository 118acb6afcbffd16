use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Returns how many of the given keys exist. A key mentioned several times is counted each time.
///
/// Ref: <https://redis.io/docs/latest/commands/exists/>
#[derive(Debug, PartialEq)]
pub struct Exists {
    pub keys: Vec<String>,
}

impl Executable for Exists {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let count = self.keys.iter().filter(|key| store.exists(key)).count();

        Ok(Frame::Simple(count.to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Exists {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let mut keys = vec![];

        loop {
            match parser.next_string() {
                Ok(key) => keys.push(key),
                Err(CommandParserError::EndOfStream) if !keys.is_empty() => {
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Self { keys })
    }
}
