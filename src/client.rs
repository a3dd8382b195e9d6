//! WVP Client
//!
//! Async client for the word vector server.

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;

use crate::protocol::{Command, Frame, Response, VectorReply, WvpCodec};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Connection closed")]
    ConnectionClosed,
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Single-connection client; requests are sent one at a time
pub struct Client {
    framed: Framed<TcpStream, WvpCodec>,
    next_request_id: u64,
}

impl Client {
    pub async fn connect(addr: impl ToSocketAddrs) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            framed: Framed::new(stream, WvpCodec::new()),
            next_request_id: 1,
        })
    }

    pub async fn ping(&mut self) -> ClientResult<()> {
        match self.request(Command::Ping).await? {
            Response::Pong => Ok(()),
            other => Err(ClientError::Protocol(format!("Expected PONG, got {}", other))),
        }
    }

    /// Look up `word`. A word outside the vocabulary yields a reply with
    /// index -1, not an error.
    pub async fn get_vector(&mut self, word: &str) -> ClientResult<VectorReply> {
        let command = Command::GetVector {
            word: word.to_string(),
        };
        match self.request(command).await? {
            Response::Vector(reply) => Ok(reply),
            other => Err(ClientError::Protocol(format!("Expected vector, got {}", other))),
        }
    }

    /// Send a command and wait for its reply
    pub async fn request(&mut self, command: Command) -> ClientResult<Response> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let (opcode, payload) = command.encode();
        self.framed.send(Frame::new(opcode, request_id, payload)).await?;

        let frame = self
            .framed
            .next()
            .await
            .ok_or(ClientError::ConnectionClosed)??;

        if frame.header.request_id != request_id {
            return Err(ClientError::Protocol(format!(
                "Reply for request {} while waiting for {}",
                frame.header.request_id, request_id
            )));
        }

        match Response::from_frame(&frame)? {
            Response::Error(msg) => Err(ClientError::Server(msg)),
            response => Ok(response),
        }
    }
}
