use clap::Parser;
use std::path::PathBuf;

/// PMM chat - terminal client for the product-marketing evaluation agent
#[derive(Parser, Debug, Clone)]
#[command(name = "pmm-chat", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "PMM_CONFIG", default_value = "pmm.toml")]
    pub config: PathBuf,

    /// Agent service base URL
    #[arg(long, env = "PMM_AGENT_URL")]
    pub url: Option<String>,

    /// Assistant (graph) id to run
    #[arg(long, env = "PMM_ASSISTANT_ID")]
    pub assistant_id: Option<String>,

    /// Environment variable holding the agent service API key
    #[arg(long, env = "PMM_API_KEY_ENV")]
    pub api_key_env: Option<String>,

    /// Seconds without stream output before a response is abandoned (0 disables)
    #[arg(long, env = "PMM_IDLE_TIMEOUT")]
    pub idle_timeout: Option<u64>,

    /// Print tool call arguments
    #[arg(long)]
    pub show_tool_args: bool,

    /// Send a single prompt, print the answer and exit
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Log level written to stderr
    #[arg(long, env = "PMM_LOG", default_value = "warn")]
    pub log_level: tracing::Level,
}
