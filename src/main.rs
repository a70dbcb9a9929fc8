use anyhow::{Context, Result};
use polyglot_chat::{Config, Pipeline};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("polyglot_chat=info".parse()?),
        )
        .init();

    info!("Starting polyglot chat session");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Role comes from a --role= flag or the DOMAIN_ROLE variable
    let mut role = std::env::var("DOMAIN_ROLE").unwrap_or_default();
    let mut args: Vec<String> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.strip_prefix("--role=") {
            Some(value) => role = value.to_string(),
            None => args.push(arg),
        }
    }
    if !role.trim().is_empty() {
        info!("Domain role: {}", role.trim());
    }

    let pipeline = Arc::new(Pipeline::new(&config)?);

    // Probe the backend before taking any input
    pipeline
        .ensure_ready()
        .await
        .context("Inference backend is not ready")?;

    // One-shot mode: the remaining argument list is the question
    if !args.is_empty() {
        let question = args.join(" ");
        let record = pipeline.handle_turn(&question, &role).await;
        println!("{}", record.final_answer);
        return Ok(());
    }

    repl(pipeline, &role).await
}

/// Read questions from stdin until EOF or an exit command.
async fn repl(pipeline: Arc<Pipeline>, role: &str) -> Result<()> {
    println!("polyglot-chat: ask in any supported language (Ctrl-D or 'exit' to quit)");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let record = pipeline.handle_turn(line, role).await;
        println!("{}", record.final_answer);
    }

    info!("Session ended");
    Ok(())
}
