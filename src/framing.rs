//! Length-prefixed message framing over a [`crate::transport::Transport`].
//!
//! Every KMIP message on the wire is itself a single TTLV `Structure` item: a 3-byte tag, a
//! 1-byte type, then a 4-byte big-endian length, followed by that many bytes of body. Framing
//! only needs the first 8 bytes to know how much more to read — it does not need to understand
//! anything else about the body.
use crate::error::{ErrorKind, Result};
use crate::transport::Transport;

const HEADER_LEN: usize = 8;

/// Reads one complete framed message (header + body) from `transport`, rejecting it before the
/// body read if the declared length exceeds `max_message_size`.
pub fn read_message(transport: &mut dyn Transport, max_message_size: u32) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_LEN];
    transport
        .recv(&mut header)
        .map_err(|e| ErrorKind::IoFailure(e, Some("reading message header")))?;

    let declared = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    if declared > max_message_size {
        return Err(ErrorKind::MessageTooLarge {
            declared,
            max: max_message_size,
        }
        .into());
    }

    let mut message = Vec::with_capacity(HEADER_LEN + declared as usize);
    message.extend_from_slice(&header);
    let mut body = vec![0u8; declared as usize];
    transport
        .recv(&mut body)
        .map_err(|e| ErrorKind::IoFailure(e, Some("reading message body")))?;
    message.extend_from_slice(&body);
    Ok(message)
}

/// Sends a fully-encoded message (header included) over `transport`.
pub fn write_message(transport: &mut dyn Transport, message: &[u8]) -> Result<()> {
    transport
        .send(message)
        .map_err(|e| ErrorKind::IoFailure(e, Some("sending message")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests::ChannelTransport;

    #[test]
    fn rejects_oversized_declared_length() {
        let mut transport = ChannelTransport::preloaded(vec![0, 0, 0, 0, 0, 0, 0, 200]);
        let err = read_message(&mut transport, 64).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MessageTooLarge { declared: 200, max: 64 }));
    }

    #[test]
    fn reads_exactly_the_declared_body_length() {
        let mut bytes = vec![0, 0, 0, 0, 0, 0, 0, 3];
        bytes.extend_from_slice(&[1, 2, 3]);
        bytes.extend_from_slice(&[9, 9, 9]); // trailing bytes belonging to a later message
        let mut transport = ChannelTransport::preloaded(bytes);
        let message = read_message(&mut transport, 64).unwrap();
        assert_eq!(message, vec![0, 0, 0, 0, 0, 0, 0, 3, 1, 2, 3]);
    }
}
