use anyhow::{Context, Result};
use clap::Parser;
use interview_core::{CoachClient, InterviewSession, OpenAiClient};
use interview_service::config::Config;
use interview_service::console::Console;
use tokio::io::BufReader;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Practice job interviews with questions and feedback from a language model.
#[derive(Parser)]
#[command(version, about)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse();

    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    // Logs go to stderr so they don't interleave with the interview prompts.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        model = %config.chat_model,
        key_source = ?config.key_source,
        "Configuration loaded successfully. Starting interview coach..."
    );

    // --- 3. Initialize API Client ---
    let mut client = OpenAiClient::new(config.openai_api_key, config.chat_model)
        .context("Failed to create OpenAI client")?;
    if let Some(base_url) = &config.base_url {
        client = client.with_base_url(base_url);
    }
    let coach = CoachClient::new(client);

    // --- 4. Run the interview loop ---
    let mut session = InterviewSession::new();
    let mut console = Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    console.run(&mut session, &coach).await?;

    tracing::info!("Shutting down...");
    Ok(())
}
