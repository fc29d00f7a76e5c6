//! Headless API server entrypoint.

use rawpaste_core::{
    env::ALLOW_PUBLIC_ACCESS, DEFAULT_IDENTIFIER_LENGTH, DEFAULT_IDENTIFIER_MAX_ATTEMPTS,
    DEFAULT_INTERSTITIAL_PREFIX, DEFAULT_MAX_SNIPPETS_PER_OWNER, DEFAULT_OWNER_HEADER, DEFAULT_PORT,
};
use rawpaste_server::{config::Config, db::Database, serve_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rawpaste=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let database = Database::new(&config.db_path)?;
    tracing::info!(
        db_path = %config.db_path,
        max_snippets_per_owner = config.max_snippets_per_owner,
        identifier_length = config.identifier_length,
        "Snippet store opened"
    );

    let state = AppState::new(config.clone(), database);

    let allow_public = rawpaste_server::config::env_flag_enabled(ALLOW_PUBLIC_ACCESS);
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = rawpaste_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure the owner header is set only by a trusted proxy",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("RawPaste running at http://{}", actual_addr);

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("RawPaste stopped");

    Ok(())
}

fn print_help() {
    println!("RawPaste Server\n");
    println!("Usage: rawpaste [OPTIONS]\n");
    println!("Options:");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory (default: ~/.cache/rawpaste/db)");
    println!("  PORT              Server port (default: {})", DEFAULT_PORT);
    println!("  MAX_SNIPPET_SIZE  Maximum snippet size in bytes (default: 10MB)");
    println!(
        "  MAX_SNIPPETS_PER_OWNER  Live snippets allowed per owner (default: {})",
        DEFAULT_MAX_SNIPPETS_PER_OWNER
    );
    println!(
        "  IDENTIFIER_LENGTH Identifier length, clamped to 2..=20 (default: {})",
        DEFAULT_IDENTIFIER_LENGTH
    );
    println!(
        "  IDENTIFIER_MAX_ATTEMPTS  Collision retries per submission (default: {})",
        DEFAULT_IDENTIFIER_MAX_ATTEMPTS
    );
    println!(
        "  INTERSTITIAL_PREFIX  Browser redirect prefix (default: {})",
        DEFAULT_INTERSTITIAL_PREFIX
    );
    println!(
        "  OWNER_HEADER      Trusted header carrying the owner id (default: {})",
        DEFAULT_OWNER_HEADER
    );
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin and non-loopback binds");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_flags, CliFlags};

    #[test]
    fn parse_cli_flags_rejects_unknown_and_positional_arguments() {
        let cases = [
            (
                vec!["rawpaste".to_string(), "--hepl".to_string()],
                "Unknown option",
            ),
            (
                vec!["rawpaste".to_string(), "serve".to_string()],
                "Unexpected positional argument",
            ),
        ];

        for (args, expected_fragment) in cases {
            let err = parse_cli_flags(&args).expect_err("invalid args should be rejected");
            assert!(err.to_string().contains(expected_fragment));
        }
    }

    #[test]
    fn parse_cli_flags_accepts_help_and_no_arguments() {
        let none = parse_cli_flags(&["rawpaste".to_string()]).expect("no args");
        assert_eq!(none, CliFlags::default());

        for flag in ["--help", "-h"] {
            let flags =
                parse_cli_flags(&["rawpaste".to_string(), flag.to_string()]).expect("help flag");
            assert_eq!(flags, CliFlags { help: true });
        }
    }
}
