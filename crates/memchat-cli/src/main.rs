// ============================================================================
// memchat — command-line front end for the memory-consent chat engine
// ============================================================================
// Usage:
//   memchat list                                    List conversations
//   memchat show <ID>                               Messages (re-read from disk)
//   memchat new <TITLE>                             Start a conversation
//   memchat send <ID> <CONTENT>                     Send a user message
//   memchat approve <ID> --signature S --wallet W   Grant memory access
//   memchat reject <ID>                             Decline memory access
//   memchat stats                                   Summarize the chat document
//   memchat export                                  Dump the chat document
//
// Each invocation is one process: messages sent before access is approved
// are not written and will be gone on the next run.
// ============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use memchat_core::{AccessStatus, ChatConfig, ConversationEngine};
use serde::Serialize;
use std::io::Write;
use tracing::info;

/// Memory-consent chat tool
#[derive(Parser)]
#[command(name = "memchat", version, about = "Chat with memory access gated by wallet approval")]
struct Cli {
    /// Path to the chat document (default: ~/.memchat/chat.data.json)
    #[arg(long, global = true)]
    data_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all conversations
    List,

    /// Show a conversation's messages as stored on disk
    Show {
        /// Conversation id
        id: String,
    },

    /// Start a new conversation
    New {
        /// Conversation title
        title: String,
    },

    /// Send a message and print the updated conversation
    Send {
        /// Conversation id
        id: String,
        /// Message text
        content: String,
    },

    /// Approve memory access with a wallet signature
    Approve {
        /// Conversation id
        id: String,
        /// Signature produced by the user's wallet
        #[arg(long)]
        signature: String,
        /// Wallet address that produced the signature
        #[arg(long)]
        wallet: String,
    },

    /// Reject memory access
    Reject {
        /// Conversation id
        id: String,
    },

    /// Show conversation counts by access status
    Stats,

    /// Export the full chat document as JSON
    Export,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Could not load .env file: {}", e);
        }
    }

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("memchat_core=info".parse()?)
                .add_directive("memchat=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = ChatConfig::resolve(cli.data_path.as_deref())
        .context("Cannot determine home directory; pass --data-path or set MEMCHAT_DATA_PATH")?;
    info!("Using chat document {}", config.data_path.display());

    let mut engine = ConversationEngine::open(config.store());

    match cli.command {
        Commands::List => print_json(&engine.list_conversations()),
        Commands::Show { id } => print_json(&engine.get_messages(&id)),
        Commands::New { title } => print_json(&engine.create_conversation(&title)),
        Commands::Send { id, content } => print_json(&engine.send_message(&id, &content)),
        Commands::Approve {
            id,
            signature,
            wallet,
        } => print_json(&engine.approve_memory_access(&id, &signature, &wallet)),
        Commands::Reject { id } => print_json(&engine.reject_memory_access(&id)),
        Commands::Stats => cmd_stats(&engine, &mut std::io::stdout().lock()),
        Commands::Export => cmd_export(&engine),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn cmd_stats<W: Write>(engine: &ConversationEngine, out: &mut W) -> Result<()> {
    let conversations = engine.list_conversations();

    writeln!(out, "=== Memchat Document Stats ===")?;
    writeln!(out, "Document: {}", engine.store().path().display())?;
    writeln!(out)?;
    writeln!(out, "Conversations: {}", conversations.len())?;

    for status in [
        AccessStatus::Pending,
        AccessStatus::Approved,
        AccessStatus::Rejected,
    ] {
        let count = conversations
            .iter()
            .filter(|c| c.access_request().map(|r| r.status) == Some(status))
            .count();
        writeln!(out, "  {:10} {}", status.to_string(), count)?;
    }

    let messages: usize = conversations.iter().map(|c| c.messages.len()).sum();
    writeln!(out, "Messages:      {}", messages)?;

    if let Some(latest) = conversations.iter().max_by_key(|c| c.updated_at) {
        writeln!(
            out,
            "Last update:   {} ({})",
            format_timestamp(&latest.updated_at),
            latest.title
        )?;
    }

    Ok(())
}

/// Durable document as an export envelope
fn export_document(engine: &ConversationEngine) -> Result<serde_json::Value> {
    // Read straight from disk so the export shows exactly what is durable
    let data = engine
        .store()
        .try_load()
        .with_context(|| format!("Failed to read {}", engine.store().path().display()))?;

    Ok(serde_json::json!({
        "exported_at": Utc::now().to_rfc3339(),
        "path": engine.store().path().display().to_string(),
        "conversations": data.conversations,
    }))
}

fn cmd_export(engine: &ConversationEngine) -> Result<()> {
    print_json(&export_document(engine)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use memchat_core::ChatStore;
    use tempfile::tempdir;

    /// One pending, one approved, one rejected conversation
    fn seeded_engine(path: &std::path::Path) -> ConversationEngine {
        let mut engine = ConversationEngine::open(ChatStore::new(path));
        engine.create_conversation("Pending");
        let approved = engine.create_conversation("Approved").id;
        let rejected = engine.create_conversation("Rejected").id;
        engine.approve_memory_access(&approved, "sig1", "0xABC");
        engine.send_message(&approved, "remember this");
        engine.reject_memory_access(&rejected);
        engine
    }

    #[test]
    fn test_stats_counts_by_status() {
        let dir = tempdir().unwrap();
        let engine = seeded_engine(&dir.path().join("chat.data.json"));

        let mut out = Vec::new();
        cmd_stats(&engine, &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert!(report.contains("Conversations: 3"));
        assert!(report.contains("  pending    1\n"));
        assert!(report.contains("  approved   1\n"));
        assert!(report.contains("  rejected   1\n"));
        // 1 + (1 + ack + user + bot) + (1 + ack)
        assert!(report.contains("Messages:      7"));
        assert!(report.contains("Last update:"));
    }

    #[test]
    fn test_export_reads_durable_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.data.json");
        let mut engine = seeded_engine(&path);
        let pending = engine.list_conversations()[0].id.clone();
        // Not approved, so never written
        engine.send_message(&pending, "forget this");

        let export = export_document(&engine).unwrap();

        assert_eq!(export["path"], path.display().to_string());
        let conversations = export["conversations"].as_array().unwrap();
        assert_eq!(conversations.len(), 3);
        assert_eq!(conversations[0]["messages"].as_array().unwrap().len(), 1);
        assert_eq!(conversations[1]["messages"].as_array().unwrap().len(), 4);
        assert_eq!(
            conversations[1]["messages"][0]["memoryAccess"]["status"],
            "approved"
        );
    }

    #[test]
    fn test_export_missing_document_is_an_error() {
        let dir = tempdir().unwrap();
        let engine = ConversationEngine::open(ChatStore::new(dir.path().join("absent.json")));

        assert!(export_document(&engine).is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_approve() {
        let cli = Cli::parse_from([
            "memchat",
            "--data-path",
            "/tmp/chat.json",
            "approve",
            "1700000000000",
            "--signature",
            "sig1",
            "--wallet",
            "0xABC",
        ]);

        assert_eq!(cli.data_path.as_deref(), Some("/tmp/chat.json"));
        match cli.command {
            Commands::Approve {
                id,
                signature,
                wallet,
            } => {
                assert_eq!(id, "1700000000000");
                assert_eq!(signature, "sig1");
                assert_eq!(wallet, "0xABC");
            }
            _ => panic!("expected approve"),
        }
    }
}
