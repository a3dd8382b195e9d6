//! WVP Codec for Tokio
//!
//! Implements Encoder and Decoder traits for framed I/O.

use bytes::BytesMut;
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use super::frame::{Frame, FrameHeader, HEADER_SIZE, MAX_PAYLOAD};

/// Tokio codec for WVP frames
#[derive(Debug, Default)]
pub struct WvpCodec {
    /// Current decode state
    state: DecodeState,
}

#[derive(Debug, Default)]
enum DecodeState {
    #[default]
    Header,
    Payload(FrameHeader),
}

impl WvpCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for WvpCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match &self.state {
                DecodeState::Header => {
                    if src.len() < HEADER_SIZE {
                        return Ok(None);
                    }

                    let header = FrameHeader::decode(&mut src.split_to(HEADER_SIZE).freeze())?;
                    if header.payload_len > MAX_PAYLOAD {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("Payload of {} bytes exceeds limit", header.payload_len),
                        ));
                    }

                    src.reserve(header.payload_len as usize);
                    self.state = DecodeState::Payload(header);
                }

                DecodeState::Payload(header) => {
                    let payload_len = header.payload_len as usize;

                    if src.len() < payload_len {
                        return Ok(None);
                    }

                    let payload = src.split_to(payload_len).freeze();
                    let frame = Frame {
                        header: header.clone(),
                        payload,
                    };

                    self.state = DecodeState::Header;
                    return Ok(Some(frame));
                }
            }
        }
    }
}

impl Encoder<Frame> for WvpCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(HEADER_SIZE + item.payload.len());
        item.encode(dst);
        Ok(())
    }
}
