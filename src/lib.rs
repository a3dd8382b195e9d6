//! WORDVEC - Word Vector Lookup Server
//!
//! Loads a pre-trained word vector table (text or word2vec-style binary)
//! once at startup and serves exact-match lookups over a small binary
//! protocol (WVP - Word Vector Protocol).

pub mod client;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod server;
pub mod table;

pub use client::{Client, ClientError};
pub use error::{LoadError, LoadResult};
pub use metrics::Metrics;
pub use protocol::{Command, Frame, Response, VectorReply, WvpCodec};
pub use server::{Config, Server};
pub use table::{load_table, LoadOptions, LookupResult, TableFormat, VectorTable};
