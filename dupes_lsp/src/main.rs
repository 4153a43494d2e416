//! dupes-lsp binary entry point

use clap::Parser;
use dupes_lsp::run_server;

#[derive(Parser, Debug)]
#[command(name = "dupes-lsp")]
#[command(about = "Language server that highlights jscpd duplicates")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Accepted for client compatibility; stdio is the only transport
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if args.stdio {
        tracing::debug!("--stdio given; serving over stdio");
    }

    if let Err(e) = run_server().await {
        tracing::error!("LSP server error: {}", e);
        std::process::exit(1);
    }
}
