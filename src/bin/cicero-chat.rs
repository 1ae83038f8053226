//! Interactive chat application for a retrieval-augmented backend.
//!
//! This binary provides a streaming REPL interface for chatting against
//! a cicero-compatible backend, with thread and document management.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against a local backend
//! cicero-chat
//!
//! # Point at another backend
//! cicero-chat --base-url http://chat.example.com/api/
//!
//! # Resume an existing thread
//! cicero-chat --thread 1f0c9a
//!
//! # Enable web search context
//! cicero-chat --web-search
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/threads` - List threads
//! - `/switch <id>` - Switch to a thread
//! - `/upload <file>` - Upload a document for retrieval
//! - `/quit` - Exit the application

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use cicero::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use cicero::{Client, Document, Thread};

/// Main entry point for the cicero-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("cicero-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;
    let resume_thread = config.thread_id.clone();

    let client = Client::new(config.base_url.clone())?;
    let mut session = ChatSession::new(client, config);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Flag for interrupt handling during streaming.
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler.
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("cicero chat ({})", session.client().base_url());
    println!("Type /help for commands, /quit to exit\n");

    let mut active_thread: Option<Thread> = None;
    if let Some(thread_id) = resume_thread {
        match resolve_thread(&session, &thread_id).await {
            Ok(Some(thread)) => {
                session.load_messages(&thread.id).await?;
                renderer.print_info(&format!(
                    "Resumed thread {} ({} messages)",
                    thread.title,
                    session.message_count()
                ));
                active_thread = Some(thread);
            }
            Ok(None) => {
                renderer.print_error(&format!("No such thread: {}", thread_id));
            }
            Err(err) => {
                renderer.print_error(&err.to_string());
            }
        }
    }

    loop {
        // Reset interrupt flag before each input.
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands.
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear_messages();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Threads => match session.client().list_threads().await {
                            Ok(threads) => print_threads(&threads, active_thread.as_ref()),
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Switch(thread_id) => {
                            match resolve_thread(&session, &thread_id).await {
                                Ok(Some(thread)) => match session.load_messages(&thread.id).await {
                                    Ok(_) => {
                                        renderer.print_info(&format!(
                                            "Switched to {} ({} messages)",
                                            thread.title,
                                            session.message_count()
                                        ));
                                        active_thread = Some(thread);
                                    }
                                    Err(err) => renderer.print_error(&err.to_string()),
                                },
                                Ok(None) => {
                                    renderer.print_error(&format!("No such thread: {}", thread_id));
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::New(title) => {
                            match session.client().create_thread(title.as_deref()).await {
                                Ok(thread) => {
                                    session.clear_messages();
                                    renderer.print_info(&format!(
                                        "Created thread {} ({})",
                                        thread.title, thread.id
                                    ));
                                    active_thread = Some(thread);
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::DeleteThread(thread_id) => {
                            match session.client().delete_thread(&thread_id).await {
                                Ok(_) => {
                                    renderer.print_info(&format!("Deleted thread {}", thread_id));
                                    if active_thread.as_ref().is_some_and(|t| t.id == thread_id) {
                                        active_thread = None;
                                        session.clear_messages();
                                    }
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Documents => match session.client().list_documents().await {
                            Ok(documents) => print_documents(&documents),
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Upload(path) => {
                            match session.client().upload_document(Path::new(&path)).await {
                                Ok(document) => renderer.print_info(&format!(
                                    "Uploaded {} ({} chunks)",
                                    document.filename, document.chunk_count
                                )),
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::DeleteDocument(document_id) => {
                            match session.client().delete_document(&document_id).await {
                                Ok(_) => renderer
                                    .print_info(&format!("Deleted document {}", document_id)),
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::WebSearch(enabled) => {
                            session.set_web_search(enabled);
                            if enabled {
                                renderer.print_info("Web search enabled.");
                            } else {
                                renderer.print_info("Web search disabled.");
                            }
                        }
                        ChatCommand::Rag(enabled) => {
                            session.set_rag(enabled);
                            if enabled {
                                renderer.print_info("Document retrieval enabled.");
                            } else {
                                renderer.print_info("Document retrieval disabled.");
                            }
                        }
                        ChatCommand::Sources => {
                            if session.sources().is_empty() {
                                renderer.print_info("No sources for the last response.");
                            } else {
                                let sources = session.sources().to_vec();
                                renderer.print_sources(&sources);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session, active_thread.as_ref());
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message: make sure a thread exists, then send.
                if active_thread.is_none() {
                    match session.client().create_thread(None).await {
                        Ok(thread) => {
                            renderer.print_info(&format!("Started thread {}", thread.id));
                            active_thread = Some(thread);
                        }
                        Err(err) => {
                            renderer
                                .print_error(&format!("Failed to create thread: {}", err));
                            continue;
                        }
                    }
                }
                let Some(thread_id) = active_thread.as_ref().map(|t| t.id.clone()) else {
                    continue;
                };

                println!("Assistant:");
                let title = session
                    .send_message(line, &thread_id, &mut renderer, interrupted.clone())
                    .await;
                if let Some(title) = title {
                    if let Some(thread) = active_thread.as_mut() {
                        thread.title = title.clone();
                    }
                    renderer.print_info(&format!("Thread renamed to: {}", title));
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt.
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit.
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Finds a thread by id via the list endpoint.
async fn resolve_thread(session: &ChatSession, thread_id: &str) -> cicero::Result<Option<Thread>> {
    let threads = session.client().list_threads().await?;
    Ok(threads.into_iter().find(|t| t.id == thread_id))
}

fn print_threads(threads: &[Thread], active: Option<&Thread>) {
    if threads.is_empty() {
        println!("    No threads yet. Send a message or use /new to start one.");
        return;
    }
    println!("    Threads:");
    for thread in threads {
        let marker = if active.is_some_and(|a| a.id == thread.id) {
            "*"
        } else {
            " "
        };
        println!("      {} {}  {}", marker, thread.id, thread.title);
    }
}

fn print_documents(documents: &[Document]) {
    if documents.is_empty() {
        println!("    No documents uploaded.");
        return;
    }
    println!("    Documents:");
    for document in documents {
        let state = if document.processed {
            "indexed"
        } else {
            "processing"
        };
        println!(
            "      {}  {} ({} chunks, {})",
            document.id, document.filename, document.chunk_count, state
        );
    }
}

fn print_stats(session: &ChatSession, active: Option<&Thread>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    match active {
        Some(thread) => println!("      Thread: {} ({})", thread.title, thread.id),
        None => println!("      Thread: (none)"),
    }
    println!("      Messages: {}", stats.message_count);
    println!("      Turns: {} ({} failed)", stats.turn_count, stats.failure_count);
    println!("      Web search: {}", describe_toggle(stats.enable_web_search));
    println!("      Retrieval: {}", describe_toggle(stats.enable_rag));
    println!("      Backend: {}", stats.base_url);
}

fn print_config(session: &ChatSession) {
    let stats = session.stats();
    println!("    Current Configuration:");
    println!("      Backend: {}", stats.base_url);
    println!("      Web search: {}", describe_toggle(stats.enable_web_search));
    println!("      Retrieval: {}", describe_toggle(stats.enable_rag));
}

fn describe_toggle(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
