//! gitlab-mcp entry point.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use gitlab_api::{
    GitlabClient, GitlabError, GitlabResult, MergeRequest, MergeRequestApi, NewMergeRequest,
    DEFAULT_TIMEOUT_SECS,
};
use gitlab_mcp::config::Config;
use gitlab_mcp::protocol::ProtocolHandler;
use gitlab_mcp::tools::ToolRegistry;
use gitlab_mcp::transport::framing::DEFAULT_MAX_LINE_BYTES;
use gitlab_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "gitlab-mcp",
    about = "MCP server that lets LLM agents open GitLab merge requests",
    version
)]
struct Cli {
    /// GitLab personal access token. Also reads GITLAB_PERSONAL_ACCESS_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,

    /// GitLab API base URL, e.g. https://gitlab.com/api/v4. Also reads GITLAB_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Timeout for each GitLab API request, in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    /// Longest accepted input line in bytes (0 for no limit).
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES, global = true)]
    max_line_bytes: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   gitlab-mcp completions bash > ~/.local/share/bash-completion/completions/gitlab-mcp
    ///   gitlab-mcp completions zsh > ~/.zfunc/_gitlab-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Report panics through the log subscriber; a panic never stops the server.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Panic: {info}");
    }));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = Config::resolve(cli.token, cli.api_url)?
                .with_timeout(Duration::from_secs(cli.timeout_secs))
                .with_max_line_bytes(cli.max_line_bytes);

            tracing::info!("GitLab MCP server");
            tracing::info!("API: {}", config.api_url);

            let client =
                GitlabClient::new(config.api_url.clone(), config.token.clone(), config.timeout)?;
            let handler = ProtocolHandler::new(ToolRegistry::gitlab(Arc::new(client)));
            let transport = StdioTransport::new(handler).with_max_line_bytes(config.max_line_bytes);
            transport.run().await?;
        }

        Commands::Info => {
            let capabilities = gitlab_mcp::types::InitializeResult::default();
            let registry = ToolRegistry::gitlab(Arc::new(Detached));
            let tools = registry.list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "gitlab-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Backend for describing tools without GitLab credentials. Never reached by
/// `info`, which only lists definitions.
struct Detached;

#[async_trait]
impl MergeRequestApi for Detached {
    async fn create_merge_request(
        &self,
        _project: &str,
        _request: &NewMergeRequest,
    ) -> GitlabResult<MergeRequest> {
        Err(GitlabError::InvalidUrl("no GitLab API configured".to_string()))
    }
}
