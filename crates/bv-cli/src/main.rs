//! bingo-vault: command-line host for the session store
//!
//! Usage:
//!   bingo-vault list                      - List saved sessions
//!   bingo-vault show <id>                 - Show one session
//!   bingo-vault delete <id>               - Delete a session
//!   bingo-vault export <id> [dir]         - Export a session to JSON
//!   bingo-vault import <file> [--save]    - Import a session from JSON
//!   bingo-vault library list|add|delete   - Manage the PDF library
//!   bingo-vault --help                    - Show help

mod commands;

use anyhow::Context;
use bv_core::{Config, DocumentLibrary, SessionId, SessionStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Parsed command line
#[derive(Debug, PartialEq)]
pub(crate) enum Command {
    List,
    Show(SessionId),
    Delete(SessionId),
    Export { id: SessionId, dir: Option<PathBuf> },
    Import { file: PathBuf, save: bool },
    LibraryList,
    LibraryAdd(PathBuf),
    LibraryDelete(i64),
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!();
            print_help();
            std::process::exit(2);
        }
    };

    match command {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Version => {
            println!("bingo-vault {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::debug!("Database: {}", config.store.db_path);

    match command {
        Command::LibraryList | Command::LibraryAdd(_) | Command::LibraryDelete(_) => {
            let library = DocumentLibrary::new(config.store.clone());
            commands::run_library(&library, command).await
        }
        _ => {
            let store = SessionStore::new(config.store.clone());
            commands::run_session(&store, &config, command).await
        }
    }
}

/// Parse command line arguments (program name excluded)
fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let command = match args.as_slice() {
        [] | ["--help"] | ["-h"] | ["help"] => Command::Help,
        ["--version"] | ["-v"] => Command::Version,
        ["list"] => Command::List,
        ["show", id] => Command::Show(parse_id(id)?),
        ["delete", id] => Command::Delete(parse_id(id)?),
        ["export", id] => Command::Export {
            id: parse_id(id)?,
            dir: None,
        },
        ["export", id, dir] => Command::Export {
            id: parse_id(id)?,
            dir: Some(PathBuf::from(dir)),
        },
        ["import", file] => Command::Import {
            file: PathBuf::from(file),
            save: false,
        },
        ["import", file, "--save"] | ["import", "--save", file] => Command::Import {
            file: PathBuf::from(file),
            save: true,
        },
        ["library", "list"] => Command::LibraryList,
        ["library", "add", file] => Command::LibraryAdd(PathBuf::from(file)),
        ["library", "delete", id] => Command::LibraryDelete(parse_id(id)?.0),
        _ => anyhow::bail!("Unrecognized arguments: {}", args.join(" ")),
    };

    Ok(command)
}

fn parse_id(raw: &str) -> anyhow::Result<SessionId> {
    raw.parse::<SessionId>()
        .with_context(|| format!("Invalid id: {}", raw))
}

/// Print help message
fn print_help() {
    println!("bingo-vault - local store for bingo sessions");
    println!();
    println!("Usage:");
    println!("  bingo-vault list                     List saved sessions, newest first");
    println!("  bingo-vault show <id>                Show a saved session");
    println!("  bingo-vault delete <id>              Delete a saved session");
    println!("  bingo-vault export <id> [dir]        Export a session as JSON");
    println!("  bingo-vault import <file> [--save]   Import a session JSON file");
    println!("  bingo-vault library list             List stored PDF documents");
    println!("  bingo-vault library add <file>       Add a PDF document");
    println!("  bingo-vault library delete <id>      Delete a PDF document");
    println!("  bingo-vault --help                   Show this help message");
    println!("  bingo-vault --version                Show version");
    println!();
    println!("Environment Variables:");
    println!("  BV_DB_PATH           SQLite database path (default: data/bingo-vault.db)");
    println!("  BV_BUSY_TIMEOUT_MS   Wait on a locked database, in ms (default: 5000)");
    println!("  BV_EXPORT_DIR        Default export directory (default: .)");
    println!("  RUST_LOG             Log filter (default: info)");
}
