//! ytdl-gateway command-line entry point
//!
//! # Usage
//!
//! ## Server Mode
//! ```bash
//! ytdl-gateway server --port 8000 --host 0.0.0.0
//! ```
//!
//! ## One-shot Mode
//! ```bash
//! ytdl-gateway --query "barota"
//! ytdl-gateway --url "https://youtu.be/dQw4w9WgXcQ" --type audio --quality 128
//! ```

use clap::{Parser, Subcommand};

use ytdl_gateway::cli::{
    resolve::{ResolveArgs, run_resolve_mode},
    server::{ServerArgs, run_server_mode},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "ytdl-gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // One-shot options (when no subcommand is provided)
    /// Search text; the top hit is resolved
    #[arg(short, long, value_name = "QUERY")]
    query: Option<String>,

    /// Video URL or id to resolve without searching
    #[arg(short, long, value_name = "URL", allow_hyphen_values = true)]
    url: Option<String>,

    /// Quality to make sure is attempted (e.g. 720, 128kbps)
    #[arg(long, value_name = "QUALITY")]
    quality: Option<String>,

    /// Media type for --quality: video or audio
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    media_type: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server mode
    Server {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Configuration file path
        #[arg(long)]
        config: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Server {
            port,
            host,
            config,
            verbose,
        }) => {
            let args = ServerArgs {
                port,
                host,
                config,
                verbose,
            };
            run_server_mode(args).await
        }
        None => {
            let args = ResolveArgs {
                query: cli.query,
                url: cli.url,
                quality: cli.quality,
                media_type: cli.media_type,
                config: cli.config,
                verbose: cli.verbose,
            };
            run_resolve_mode(args).await
        }
    }
}
