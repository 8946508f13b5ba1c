use clap::Parser;
use pmm_chat::cli::Cli;
use pmm_chat::config::Settings;
use pmm_chat::repl::{self, Repl, TranscriptRenderer};
use pmm_chat::session::{HttpAgentService, SessionClient};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they do not interleave with the transcript
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .init();

    let settings = Settings::new_with_cli(&cli)?;
    info!(
        "Connecting to {} (assistant {})",
        settings.service.url, settings.service.assistant_id
    );

    let service = Arc::new(HttpAgentService::new(&settings.service)?);
    let client = SessionClient::from_settings(service, &settings.service);

    if let Some(prompt) = cli.prompt.as_deref() {
        let mut renderer = TranscriptRenderer::new(std::io::stdout(), settings.repl.show_tool_args);
        return repl::run_once(&client, &mut renderer, prompt).await;
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut repl = Repl::new(client, stdin, std::io::stdout(), &settings.repl);
    repl.run().await
}
