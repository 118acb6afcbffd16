use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::Error;

pub struct Connection<S = TcpStream> {
    pub id: Uuid,
    // Data is read from the socket into the read buffer. When a frame is parsed, the corresponding
    // data is removed from the buffer.
    frames: Framed<S, FrameCodec>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Connection<S> {
        Self::with_codec(stream, FrameCodec::default())
    }

    pub fn with_codec(stream: S, codec: FrameCodec) -> Connection<S> {
        Connection {
            id: Uuid::new_v4(),
            // Allocate the buffer with 4kb of capacity.
            frames: Framed::with_capacity(stream, codec, 4096),
        }
    }

    /// Reads the next request frame, waiting for more data while only part of it is buffered.
    ///
    /// Returns `None` when the peer closed the connection between two frames. Closing it in the
    /// middle of a frame is an error.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        self.frames.next().await.transpose()
    }

    /// Whether part of a request has been received but not yet decoded.
    pub fn is_mid_frame(&self) -> bool {
        !self.frames.read_buffer().is_empty()
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.frames.send(frame).await
    }
}
