// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use std::str::Utf8Error;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

/// How deep arrays may nest inside a request. Commands only ever use one level.
pub const MAX_NESTING_DEPTH: usize = 32;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("unknown value type: {0:?}")]
    UnknownDataType(char),
    #[error("invalid length: {0}")]
    InvalidLength(String),
    #[error("arrays nested deeper than {0} levels")]
    NestingTooDeep(usize),
    /// Invalid message encoding.
    #[error("{0}")]
    Other(crate::Error),
}

/// Every value that travels over the wire, in either direction.
///
/// Clients only ever send arrays of bulk strings, the remaining variants exist so replies can be
/// expressed with the same type.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

// Protocol specification: https://redis.io/docs/reference/protocol-spec/
impl Frame {
    /// Parses a single request value from `src`.
    ///
    /// Only arrays and bulk strings are accepted, which is everything a client is allowed to send.
    /// When `src` does not yet hold the whole value `Error::Incomplete` is returned and the cursor
    /// position must be considered garbage; the caller retries once more data is buffered.
    ///
    /// Arrays nested more than [`MAX_NESTING_DEPTH`] levels deep are rejected with
    /// `Error::NestingTooDeep`.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        Self::parse_at_depth(src, 1)
    }

    fn parse_at_depth(src: &mut Cursor<&[u8]>, depth: usize) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its type.
        // Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;

        match DataType::try_from(first_byte)? {
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                if depth > MAX_NESTING_DEPTH {
                    return Err(Error::NestingTooDeep(MAX_NESTING_DEPTH));
                }

                let length = get_length(src)?;

                // Null arrays are folded into empty ones.
                let length = match length {
                    -1 => 0,
                    length => usize::try_from(length)
                        .map_err(|_| Error::InvalidLength(length.to_string()))?,
                };

                let mut frames = Vec::new();
                for _ in 0..length {
                    let frame = Self::parse_at_depth(src, depth + 1)?;
                    frames.push(frame);
                }

                Ok(Frame::Array(frames))
            }
            // $<length>\r\n<data>\r\n
            DataType::BulkString => {
                let length = get_length(src)?;

                if length == -1 {
                    return Ok(Frame::Null);
                }

                let length =
                    usize::try_from(length).map_err(|_| Error::InvalidLength(length.to_string()))?;

                // Wait for the payload and its trailer to be fully buffered, a bulk string is never
                // handed out truncated.
                if src.remaining() < length + CRLF.len() {
                    return Err(Error::Incomplete);
                }

                let data = src.copy_to_bytes(length);
                // The trailer is skipped without being inspected.
                src.advance(CRLF.len());

                Ok(Frame::Bulk(data))
            }
            _ => Err(Error::UnknownDataType(char::from(first_byte))),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleString));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Error(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleError));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Integer(i) => {
                let digits = i.to_string();
                let mut bytes = Vec::with_capacity(1 + digits.len() + CRLF.len());
                bytes.push(u8::from(DataType::Integer));
                bytes.extend_from_slice(digits.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Bulk(bytes) => {
                let length_str = bytes.len().to_string();
                let mut result = Vec::with_capacity(
                    1 + length_str.len() + CRLF.len() + bytes.len() + CRLF.len(),
                );
                result.push(u8::from(DataType::BulkString));
                result.extend_from_slice(length_str.as_bytes());
                result.extend_from_slice(CRLF);
                result.extend_from_slice(bytes);
                result.extend_from_slice(CRLF);
                result
            }
            // RESP2 null bulk string.
            Frame::Null => b"$-1\r\n".to_vec(),
            Frame::Array(arr) => {
                let length_str = arr.len().to_string();
                let mut bytes = Vec::with_capacity(1 + length_str.len() + CRLF.len());
                bytes.push(u8::from(DataType::Array));
                bytes.extend_from_slice(length_str.as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in arr {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
        }
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Array(arr) => {
                write!(f, "*{}", arr.len())?;
                for frame in arr {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
        }
    }
}

/// Returns the bytes up to the next CRLF and moves the cursor past the terminator.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buf: &'a [u8] = *src.get_ref();

    let line_end = buf[start..]
        .windows(2)
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&buf[start..line_end])
}

fn get_length(src: &mut Cursor<&[u8]>) -> Result<isize, Error> {
    let line = get_line(src)?;
    let line = std::str::from_utf8(line)?;

    line.parse::<isize>()
        .map_err(|_| Error::InvalidLength(line.to_string()))
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            _ => Err(Error::UnknownDataType(char::from(byte))),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
        }
    }
}

impl From<Utf8Error> for Error {
    fn from(_src: Utf8Error) -> Error {
        "protocol error; invalid frame format".into()
    }
}

impl From<&str> for Error {
    fn from(src: &str) -> Error {
        src.to_string().into()
    }
}

impl From<String> for Error {
    fn from(src: String) -> Error {
        Error::Other(src.into())
    }
}
