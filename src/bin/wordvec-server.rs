//! WORDVEC Server Binary
//!
//! Loads a word vector file and serves lookups until interrupted.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wordvec::{load_table, Config, LoadOptions, Server, TableFormat};

/// WORDVEC Server - Word Vector Lookup Service
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Word vector file path
    #[arg(short, long)]
    filepath: PathBuf,

    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Port number
    #[arg(short, long, default_value_t = 50051)]
    port: u16,

    /// Whether the word vector file is in binary format
    #[arg(long, default_value_t = false)]
    binary: bool,

    /// Vector dimension (required for text files)
    #[arg(short, long)]
    size: Option<usize>,

    /// Longest accepted word in bytes
    #[arg(long, default_value_t = 4096)]
    max_word_bytes: usize,

    /// Loader read buffer size in bytes
    #[arg(long, default_value_t = 64 * 1024)]
    read_buffer: usize,
}

impl Args {
    /// Check arguments before touching the file
    fn validate(&self) -> anyhow::Result<TableFormat> {
        if self.filepath.as_os_str().is_empty() {
            bail!("missing word vector file");
        }
        if !self.filepath.is_file() {
            bail!("word vector file not exist: {}", self.filepath.display());
        }
        if self.port == 0 {
            bail!("missing valid port number");
        }
        if self.max_word_bytes == 0 {
            bail!("max word bytes must be greater than 0");
        }

        TableFormat::from_flags(self.binary, self.size).context("missing valid vector size")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordvec=info".parse()?))
        .init();

    let args = Args::parse();
    let format = args.validate().context("failed to init word vector server")?;

    let options = LoadOptions::default()
        .with_max_word_bytes(args.max_word_bytes)
        .with_buffer_capacity(args.read_buffer);

    info!(
        "Loading {} word vectors from {}",
        if args.binary { "binary" } else { "text" },
        args.filepath.display()
    );

    let path = args.filepath.clone();
    let table = tokio::task::spawn_blocking(move || load_table(&path, format, &options))
        .await?
        .context("failed to load word vector")?;

    let config = Config::default().with_bind(&args.bind).with_port(args.port);
    Server::new(config, Arc::new(table)).run().await?;

    Ok(())
}
