//! WVP Protocol - Word Vector Protocol
//!
//! Binary request/reply protocol for word vector lookups.
//! Uses 20-byte fixed headers; every reply echoes the request id.

mod codec;
mod command;
mod frame;
mod response;

pub use codec::WvpCodec;
pub use command::Command;
pub use frame::{Frame, FrameHeader, OpCode, HEADER_SIZE, MAGIC, MAX_PAYLOAD};
pub use response::{Response, VectorReply};
