//! Length-prefixed frames: an 8-byte left-justified ASCII decimal length
//! followed by exactly that many bytes of JSON.

use crate::config::{FRAME_HEADER_LEN, MAX_FRAME_SIZE};

use super::{Message, ProtocolError};

/// Serialize `msg` into a complete frame (header + body).
pub fn encode_frame(msg: &Message) -> Result<Vec<u8>, ProtocolError> {
    let body = serde_json::to_vec(msg).map_err(ProtocolError::Encode)?;
    if body.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: body.len(),
            max: MAX_FRAME_SIZE,
        });
    }
    let header = format!("{:<width$}", body.len(), width = FRAME_HEADER_LEN);
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Parse a length header into the body size it announces.
///
/// Surrounding ASCII whitespace is padding; anything else but digits is
/// malformed.
pub fn parse_header(header: &[u8; FRAME_HEADER_LEN]) -> Result<usize, ProtocolError> {
    let malformed = || ProtocolError::MalformedHeader(String::from_utf8_lossy(header).into_owned());
    let text = std::str::from_utf8(header).map_err(|_| malformed())?.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let len: usize = text.parse().map_err(|_| malformed())?;
    if len == 0 {
        return Err(ProtocolError::EmptyFrame);
    }
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: len,
            max: MAX_FRAME_SIZE,
        });
    }
    Ok(len)
}

pub fn decode_body(body: &[u8]) -> Result<Message, ProtocolError> {
    serde_json::from_slice(body).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_left_justified() {
        let frame = encode_frame(&Message::YourTurn).unwrap();
        let body = br#"{"type":"YOUR_TURN"}"#;
        assert_eq!(&frame[..FRAME_HEADER_LEN], b"20      ");
        assert_eq!(&frame[FRAME_HEADER_LEN..], body);
    }

    #[test]
    fn header_accepts_right_aligned_padding() {
        assert_eq!(parse_header(b"      42").unwrap(), 42);
        assert_eq!(parse_header(b"42      ").unwrap(), 42);
    }

    #[test]
    fn header_rejects_garbage() {
        assert!(matches!(parse_header(b"4 2     "), Err(ProtocolError::MalformedHeader(_))));
        assert!(matches!(parse_header(b"        "), Err(ProtocolError::MalformedHeader(_))));
        assert!(matches!(parse_header(b"-12     "), Err(ProtocolError::MalformedHeader(_))));
        assert!(matches!(parse_header(b"0       "), Err(ProtocolError::EmptyFrame)));
        assert!(matches!(parse_header(b"99999999"), Err(ProtocolError::FrameTooLarge { .. })));
    }
}
