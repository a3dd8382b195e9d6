//! WVP Frame Structure
//!
//! Binary frame format with a 20-byte header.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;

/// Magic bytes identifying WVP protocol: "WVEC"
pub const MAGIC: [u8; 4] = [0x57, 0x56, 0x45, 0x43];

/// Protocol version
pub const VERSION: u8 = 1;

/// Fixed header size in bytes
pub const HEADER_SIZE: usize = 20;

/// Largest accepted payload (16 MiB)
pub const MAX_PAYLOAD: u32 = 16 * 1024 * 1024;

/// Operation codes for WVP frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    // Requests
    Ping = 0x01,
    Pong = 0x02,
    GetVector = 0x03,

    // Responses
    Vector = 0x10,
    Error = 0x11,
}

impl OpCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(OpCode::Ping),
            0x02 => Some(OpCode::Pong),
            0x03 => Some(OpCode::GetVector),
            0x10 => Some(OpCode::Vector),
            0x11 => Some(OpCode::Error),
            _ => None,
        }
    }
}

/// WVP Frame Header (20 bytes, big-endian)
///
/// ```text
/// ┌──────────┬──────────┬──────────┬──────────┬─────────────────┐
/// │  Magic   │ Version  │  OpCode  │  Flags   │  Payload Len    │
/// │ (4 bytes)│ (1 byte) │ (1 byte) │ (2 bytes)│   (4 bytes)     │
/// ├──────────┴──────────┴──────────┴──────────┴─────────────────┤
/// │  Request ID (8 bytes)                                       │
/// └─────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    /// Raw opcode byte; unknown values are kept so the request can be answered
    pub opcode_byte: u8,
    pub flags: u16,
    pub payload_len: u32,
    pub request_id: u64,
}

impl FrameHeader {
    pub fn new(opcode: OpCode, request_id: u64) -> Self {
        Self {
            version: VERSION,
            opcode_byte: opcode as u8,
            flags: 0,
            payload_len: 0,
            request_id,
        }
    }

    pub fn with_payload_len(mut self, len: u32) -> Self {
        self.payload_len = len;
        self
    }

    /// Decoded opcode, `None` for a byte this version does not know
    pub fn opcode(&self) -> Option<OpCode> {
        OpCode::from_u8(self.opcode_byte)
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&MAGIC);
        buf.put_u8(self.version);
        buf.put_u8(self.opcode_byte);
        buf.put_u16(self.flags);
        buf.put_u32(self.payload_len);
        buf.put_u64(self.request_id);
    }

    pub fn decode(buf: &mut impl Buf) -> io::Result<Self> {
        if buf.remaining() < HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Incomplete frame header",
            ));
        }

        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Invalid magic bytes",
            ));
        }

        let version = buf.get_u8();
        if version != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unsupported protocol version: {}", version),
            ));
        }

        let opcode_byte = buf.get_u8();
        let flags = buf.get_u16();
        let payload_len = buf.get_u32();
        let request_id = buf.get_u64();

        Ok(Self {
            version,
            opcode_byte,
            flags,
            payload_len,
            request_id,
        })
    }
}

/// Complete WVP Frame with header and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(opcode: OpCode, request_id: u64, payload: Bytes) -> Self {
        let header = FrameHeader::new(opcode, request_id).with_payload_len(payload.len() as u32);
        Self { header, payload }
    }

    pub fn ping(request_id: u64) -> Self {
        Self::new(OpCode::Ping, request_id, Bytes::new())
    }

    pub fn pong(request_id: u64) -> Self {
        Self::new(OpCode::Pong, request_id, Bytes::new())
    }

    pub fn error(request_id: u64, msg: &str) -> Self {
        Self::new(OpCode::Error, request_id, Bytes::copy_from_slice(msg.as_bytes()))
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        self.header.encode(buf);
        buf.put_slice(&self.payload);
    }
}
