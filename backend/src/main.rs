//! Attendance CLI - serve the attendance export as nested JSON
//!
//! # Commands
//!
//! ```bash
//! attendance serve                       # Start HTTP server (port 5000)
//! attendance serve --host 127.0.0.1 -p 8080
//! ```

use attendance::{
    server::{start_server, ServerConfig},
    FetchOptions, DEFAULT_SOURCE_URL,
};
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;

#[derive(Parser)]
#[command(name = "attendance")]
#[command(about = "Serve the SGS Academy attendance export as nested JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Export location flags
#[derive(Args)]
struct SourceArgs {
    /// URL of the attendance CSV export
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    source_url: String,

    /// Download timeout in seconds (0 disables the timeout)
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

impl SourceArgs {
    fn into_options(self) -> FetchOptions {
        FetchOptions {
            source_url: self.source_url,
            timeout_secs: (self.timeout_secs > 0).then_some(self.timeout_secs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { host, port, source } => {
            cmd_serve(ServerConfig {
                host,
                port,
                fetch: source.into_options(),
            })
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    start_server(config).await?;
    Ok(())
}
