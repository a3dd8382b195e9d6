//! WORDVEC CLI Client
//!
//! One-shot or interactive word vector lookups.

use clap::Parser;
use std::io::{self, Write};
use wordvec::{Client, ClientError};

/// WORDVEC CLI - Word Vector Client
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    address: String,

    /// Word to query; starts an interactive prompt when omitted
    #[arg(short, long)]
    word: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.address.is_empty() {
        anyhow::bail!("missing rpc server address");
    }

    let mut client = Client::connect(&args.address).await?;

    if let Some(word) = args.word {
        if word.is_empty() {
            anyhow::bail!("missing word to query");
        }
        let reply = client.get_vector(&word).await?;
        println!("word vector: {}", reply);
        return Ok(());
    }

    println!("Connected to {}! Type 'help' for available commands, 'quit' to exit.\n", args.address);

    loop {
        print!("wordvec> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("help") {
            print_help();
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let result = match parts[0].to_uppercase().as_str() {
            "PING" => client.ping().await.map(|_| "PONG".to_string()),
            "GET" if parts.len() == 2 => client.get_vector(parts[1]).await.map(|reply| {
                if reply.is_found() {
                    reply.to_string()
                } else {
                    "(not found)".to_string()
                }
            }),
            "GET" => {
                eprintln!("GET requires a word: GET <word>");
                continue;
            }
            other => {
                eprintln!("Unknown command: {}. Type 'help' for available commands.", other);
                continue;
            }
        };

        match result {
            Ok(line) => println!("{}", line),
            Err(ClientError::ConnectionClosed) => {
                eprintln!("Connection closed by server");
                break;
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"
Available commands:

  PING              - Check server connectivity
  GET <word>        - Get the vector of a word

  help              - Show this help
  quit / exit       - Exit the CLI

Examples:
  GET king
"#
    );
}
