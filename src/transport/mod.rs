use crate::protocol::{Message, ProtocolError};

/// A bidirectional, ordered stream of protocol messages.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn send(&mut self, msg: &Message) -> Result<(), ProtocolError>;
    async fn recv(&mut self) -> Result<Message, ProtocolError>;
}

pub mod tcp;

pub use tcp::{FrameReader, FrameWriter, TcpTransport};
