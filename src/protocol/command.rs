//! WVP Command Parsing
//!
//! Parses request arguments from WVP frames.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;

use super::frame::{Frame, OpCode};

/// Parsed request from a WVP frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Health check
    Ping,

    /// Look up the vector of a word
    GetVector { word: String },
}

impl Command {
    /// Parse command from a WVP frame
    pub fn from_frame(frame: &Frame) -> io::Result<Self> {
        match frame.header.opcode() {
            Some(OpCode::Ping) => Ok(Command::Ping),

            Some(OpCode::GetVector) => {
                let mut payload = frame.payload.clone();
                let word = read_string(&mut payload)?;
                Ok(Command::GetVector { word })
            }

            Some(opcode) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unexpected opcode for command: {:?}", opcode),
            )),

            None => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid opcode: {}", frame.header.opcode_byte),
            )),
        }
    }

    /// Encode command to frame payload bytes
    pub fn encode(&self) -> (OpCode, Bytes) {
        match self {
            Command::Ping => (OpCode::Ping, Bytes::new()),

            Command::GetVector { word } => {
                let mut buf = BytesMut::with_capacity(4 + word.len());
                write_string(&mut buf, word);
                (OpCode::GetVector, buf.freeze())
            }
        }
    }

    /// Short name used for metrics and logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::GetVector { .. } => "GETVECTOR",
        }
    }
}

/// Read a `u32` length-prefixed UTF-8 string
pub(crate) fn read_string(buf: &mut Bytes) -> io::Result<String> {
    if buf.remaining() < 4 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Not enough data for length prefix",
        ));
    }
    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Not enough data for payload",
        ));
    }
    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Word is not valid UTF-8"))
}

/// Write a `u32` length-prefixed string
pub(crate) fn write_string(buf: &mut BytesMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_command() {
        let frame = Frame::ping(1);
        let cmd = Command::from_frame(&frame).unwrap();
        assert_eq!(cmd, Command::Ping);
    }

    #[test]
    fn test_get_vector_command() {
        let cmd = Command::GetVector {
            word: "北京".to_string(),
        };
        let (opcode, payload) = cmd.encode();
        let frame = Frame::new(opcode, 1, payload);
        let parsed = Command::from_frame(&frame).unwrap();

        assert_eq!(parsed, cmd);
        assert_eq!(parsed.name(), "GETVECTOR");
    }

    #[test]
    fn test_get_vector_truncated_payload() {
        let frame = Frame::new(OpCode::GetVector, 1, Bytes::from_static(&[0, 0, 0, 9, b'a']));
        let err = Command::from_frame(&frame).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_get_vector_invalid_utf8() {
        let frame = Frame::new(OpCode::GetVector, 1, Bytes::from_static(&[0, 0, 0, 1, 0xFF]));
        let err = Command::from_frame(&frame).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_response_opcode_is_not_a_command() {
        let frame = Frame::pong(3);
        assert!(Command::from_frame(&frame).is_err());
    }

    #[test]
    fn test_unknown_opcode() {
        let mut frame = Frame::ping(4);
        frame.header.opcode_byte = 0x7F;
        let err = Command::from_frame(&frame).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "Invalid opcode: 127");
    }
}
