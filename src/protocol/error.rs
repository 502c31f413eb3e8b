/// Errors raised while framing, encoding or decoding protocol messages.
///
/// Every variant except `InvalidMessage` is fatal to the connection it
/// came from.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The 8-byte length header is not a padded decimal number.
    #[error("malformed frame header: {0:?}")]
    MalformedHeader(String),

    /// Header announced a zero-length body.
    #[error("invalid frame length: 0")]
    EmptyFrame,

    /// Body larger than the configured maximum.
    #[error("message too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The stream ended before a full header or body arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// Decoded fine but carries values the game cannot use.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The peer stopped reading and its outbound queue filled up.
    #[error("outbound queue full ({0} frames pending)")]
    Backlogged(usize),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
