use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use skychat::cli::{Cli, Commands};
use skychat::catalog::{Catalog, PathConvention};
use skychat::core::llm::ChatMessage;
use skychat::{schema, server, utils, Orchestrator, Settings, TurnEvent};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone())),
        )
        .init();

    match cli.command {
        Commands::Serve { host, port } => handle_serve(settings, host, port).await,
        Commands::Chat { prompt, system } => handle_chat(settings, prompt, system).await,
        Commands::Operations => handle_operations(),
    }
}

async fn handle_serve(mut settings: Settings, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    server::serve(settings).await
}

async fn handle_chat(settings: Settings, prompt: String, system: Option<String>) -> Result<()> {
    let api_key = Settings::api_key()?;
    let orchestrator = Orchestrator::new(&settings, &api_key)?;

    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));

    let (tx, mut rx) = mpsc::channel(64);
    let turn = tokio::spawn(async move { orchestrator.run_turn(messages, tx).await });

    utils::print_info("Assistant:");
    while let Some(event) = rx.recv().await {
        match event {
            TurnEvent::Token { content } => {
                print!("{content}");
                std::io::stdout().flush()?;
            }
            TurnEvent::ToolResult { tool, payload } => {
                println!();
                utils::print_info(&format!("[{tool}] {payload}"));
            }
            TurnEvent::Done => println!(),
            TurnEvent::Error { message } => utils::print_error(&message),
        }
    }

    turn.await??;
    Ok(())
}

fn handle_operations() -> Result<()> {
    let document = schema::vetric_schema()?;
    let catalog = Catalog::build(&document, &PathConvention::vetric())?;

    utils::print_header("Vetric operations");
    for (name, operation) in catalog.iter() {
        println!("{:<6} {:<32} {}", operation.method.as_str(), name, operation.path);
    }
    utils::print_success(&format!(
        "{} operations against {}",
        catalog.len(),
        catalog.base_url()
    ));

    Ok(())
}
