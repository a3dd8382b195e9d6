//! WVP Response types
//!
//! Reply variants for request execution results.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io;

use super::command::{read_string, write_string};
use super::frame::{Frame, OpCode};
use crate::table::LookupResult;

/// Reply to a vector lookup.
///
/// A miss carries an empty word, index -1 and no features.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorReply {
    pub word: String,
    pub index: i64,
    pub features: Vec<f32>,
}

impl VectorReply {
    pub fn not_found() -> Self {
        Self {
            word: String::new(),
            index: -1,
            features: Vec::new(),
        }
    }

    /// Build a reply from a table lookup of `word`
    pub fn from_lookup(word: &str, result: &LookupResult<'_>) -> Self {
        if !result.found {
            return Self::not_found();
        }
        Self {
            word: word.to_string(),
            index: result.index,
            features: result.features.to_vec(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.index >= 0
    }

    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(4 + self.word.len() + 8 + 4 + self.features.len() * 4);
        write_string(&mut buf, &self.word);
        buf.put_i64(self.index);
        buf.put_u32(self.features.len() as u32);
        for &f in &self.features {
            buf.put_f32(f);
        }
        buf.freeze()
    }

    fn decode(payload: &Bytes) -> io::Result<Self> {
        let mut buf = payload.clone();
        let word = read_string(&mut buf)?;

        if buf.remaining() < 12 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Insufficient vector header",
            ));
        }
        let index = buf.get_i64();
        let count = buf.get_u32() as usize;

        if buf.remaining() < count * 4 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Insufficient feature data",
            ));
        }
        let features = (0..count).map(|_| buf.get_f32()).collect();

        Ok(Self {
            word,
            index,
            features,
        })
    }
}

/// Response to a command
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Pong response (for PING)
    Pong,

    /// Vector lookup result, found or not
    Vector(VectorReply),

    /// Error response
    Error(String),
}

impl Response {
    /// Convert response to a WVP frame
    pub fn to_frame(&self, request_id: u64) -> Frame {
        match self {
            Response::Pong => Frame::pong(request_id),
            Response::Vector(reply) => Frame::new(OpCode::Vector, request_id, reply.encode()),
            Response::Error(msg) => Frame::error(request_id, msg),
        }
    }

    /// Parse response from a WVP frame
    pub fn from_frame(frame: &Frame) -> io::Result<Self> {
        match frame.header.opcode() {
            Some(OpCode::Pong) => Ok(Response::Pong),
            Some(OpCode::Vector) => Ok(Response::Vector(VectorReply::decode(&frame.payload)?)),
            Some(OpCode::Error) => {
                let msg = String::from_utf8_lossy(&frame.payload).to_string();
                Ok(Response::Error(msg))
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unexpected opcode for response: {:#04x}", frame.header.opcode_byte),
            )),
        }
    }
}

impl std::fmt::Display for VectorReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} [", self.word, self.index)?;
        for (i, v) in self.features.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::Pong => write!(f, "PONG"),
            Response::Vector(reply) if reply.is_found() => write!(f, "{}", reply),
            Response::Vector(_) => write!(f, "(not found)"),
            Response::Error(msg) => write!(f, "(error) {}", msg),
        }
    }
}
