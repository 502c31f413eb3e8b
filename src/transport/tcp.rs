use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::config::FRAME_HEADER_LEN;
use crate::protocol::{decode_body, encode_frame, parse_header, Message, ProtocolError};
use crate::transport::Transport;

fn map_read_error(e: std::io::Error) -> ProtocolError {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof
        | std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted => ProtocolError::ConnectionClosed,
        _ => ProtocolError::Io(e),
    }
}

fn map_write_error(e: std::io::Error) -> ProtocolError {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted => ProtocolError::ConnectionClosed,
        _ => ProtocolError::Io(e),
    }
}

/// Reads whole frames from a byte stream.
pub struct FrameReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin + Send> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Block until one full frame has arrived and decode it.
    ///
    /// Partial reads are retried until the header and body are complete; a
    /// stream that ends first yields `ConnectionClosed`.
    pub async fn recv(&mut self) -> Result<Message, ProtocolError> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        self.inner.read_exact(&mut header).await.map_err(map_read_error)?;
        let len = parse_header(&header)?;

        let mut body = vec![0u8; len];
        self.inner.read_exact(&mut body).await.map_err(map_read_error)?;
        decode_body(&body)
    }
}

/// Writes whole frames to a byte stream.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin + Send> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub async fn send(&mut self, msg: &Message) -> Result<(), ProtocolError> {
        let frame = encode_frame(msg)?;
        self.inner.write_all(&frame).await.map_err(map_write_error)?;
        self.inner.flush().await.map_err(map_write_error)
    }

    /// Flush and close the write direction.
    pub async fn shutdown(&mut self) -> Result<(), ProtocolError> {
        self.inner.shutdown().await.map_err(map_write_error)
    }
}

/// Frame transport over one TCP connection.
pub struct TcpTransport {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self {
            reader: FrameReader::new(read),
            writer: FrameWriter::new(write),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Separate halves so reading and writing can run on different tasks.
    pub fn into_split(self) -> (FrameReader<OwnedReadHalf>, FrameWriter<OwnedWriteHalf>) {
        (self.reader, self.writer)
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: &Message) -> Result<(), ProtocolError> {
        self.writer.send(msg).await
    }

    async fn recv(&mut self) -> Result<Message, ProtocolError> {
        self.reader.recv().await
    }
}
