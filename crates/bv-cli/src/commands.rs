//! Command implementations
//!
//! Each command borrows the store the binary constructed at startup.

use anyhow::Context;
use bv_core::session::Attachments;
use bv_core::{Config, DocumentLibrary, FileUpload, Session, SessionStore};

use crate::Command;

/// Run a session command against the store
pub(crate) async fn run_session(store: &SessionStore, config: &Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => {
            let sessions = store.list().await?;
            if sessions.is_empty() {
                println!("No saved sessions.");
            }
            for s in sessions {
                println!(
                    "{:<15} {:<26} {:<10} {:>5} items  {}",
                    s.id,
                    s.date,
                    s.mode,
                    s.item_count,
                    s.name.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Show(id) => {
            let session = store
                .get(id)
                .await?
                .with_context(|| format!("Session {} not found", id))?;
            print_session(&session)?;
        }
        Command::Delete(id) => {
            store.delete(id).await?;
            println!("Deleted session {}", id);
        }
        Command::Export { id, dir } => {
            let mut session = store
                .get(id)
                .await?
                .with_context(|| format!("Session {} not found", id))?;
            let dir = dir.unwrap_or_else(|| config.export.dir.clone());
            let path = store.export_to_file(&mut session, &dir).await?;
            println!("Exported session {} to {}", id, path.display());
        }
        Command::Import { file, save } => {
            let upload = FileUpload::from_path(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut session = store.import_from_file(&upload).await?;
            print_session(&session)?;

            if save {
                let id = store.save(&mut session).await?;
                println!("Saved as session {}", id);
            }
        }
        other => anyhow::bail!("Not a session command: {:?}", other),
    }
    Ok(())
}

/// Run a document library command
pub(crate) async fn run_library(library: &DocumentLibrary, command: Command) -> anyhow::Result<()> {
    match command {
        Command::LibraryList => {
            let documents = library.list().await?;
            let plural = if documents.len() == 1 { "" } else { "s" };
            println!("{} book{}", documents.len(), plural);
            for d in documents {
                println!("{:<15} {:>10}  {}", d.id, d.size, d.title);
            }
        }
        Command::LibraryAdd(path) => {
            let upload = FileUpload::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let meta = library.add(&upload).await?;
            println!("Added {} as document {} ({})", meta.title, meta.id, meta.size);
        }
        Command::LibraryDelete(id) => {
            library.delete(id).await?;
            println!("Deleted document {}", id);
        }
        other => anyhow::bail!("Not a library command: {:?}", other),
    }
    Ok(())
}

fn print_session(session: &Session) -> anyhow::Result<()> {
    println!("id:        {}", session.id.map(|id| id.to_string()).unwrap_or_default());
    println!("name:      {}", session.name.as_deref().unwrap_or("-"));
    println!("date:      {}", session.date.as_deref().unwrap_or("-"));
    println!("mode:      {}", session.mode());
    println!("items:     {}", session.item_count());

    if let Some(caller) = &session.caller_state {
        print_attachments("header audio", &caller.header_audio_blobs);
        print_attachments("item audio", &caller.item_audio_blobs);
    }

    println!("generatorState:");
    println!("{}", serde_json::to_string_pretty(&session.generator_state)?);
    Ok(())
}

fn print_attachments(label: &str, attachments: &Attachments) {
    println!("{}: {}", label, attachments.len());
    for (key, blob) in attachments {
        println!("  {:<20} {:<24} {} bytes", key, blob.mime_type(), blob.len());
    }
}
