// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, resolve the API key, build the client
//   and hand everything to the UI loop.
// - Returns `anyhow::Result` so startup failures exit non-zero with a
//   readable diagnostic.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::style::Stylize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use moltbook_cli::api::ApiClient;
use moltbook_cli::config::{
    SessionConfig, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS,
};
use moltbook_cli::credentials::{resolve, CredentialSource, CredentialSources};
use moltbook_cli::prompt::{Prompter, TerminalPrompter};
use moltbook_cli::store::{CredentialRecord, CredentialStore};
use moltbook_cli::ui::{self, Session};

/// Manual, menu-driven client for the Moltbook API.
#[derive(Parser, Debug)]
#[command(name = "moltbook", version, about)]
struct Cli {
    /// API base URL. Anything outside https://www.moltbook.com/api/v1 is refused.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds (1-300).
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Print a masked Authorization line with every response.
    #[arg(long)]
    debug_auth: bool,

    /// Credentials file to read and write instead of the default location.
    #[arg(long, value_name = "PATH")]
    credentials: Option<PathBuf>,

    /// Disable coloured output.
    #[arg(long)]
    no_color: bool,

    /// Verbose logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("moltbook_cli=debug,moltbook=debug")
        } else {
            EnvFilter::new("moltbook_cli=warn,moltbook=warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn banner(base_url: &str, color: bool) {
    if color {
        println!("{}  {}", "Moltbook CLI".bold(), "manual API interaction".dim());
        println!("Base URL: {}", base_url.cyan());
        println!("{}", format!("Tip: set {API_KEY_ENV} to avoid prompting.").dim());
    } else {
        println!("Moltbook CLI  manual API interaction");
        println!("Base URL: {base_url}");
        println!("Tip: set {API_KEY_ENV} to avoid prompting.");
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let color = !cli.no_color && std::io::stdout().is_terminal();
    let interactive = std::io::stdin().is_terminal();
    banner(&cli.base_url, color);

    // Fail closed before any key is read.
    let client = ApiClient::builder()
        .base_url(cli.base_url.clone())
        .build()
        .context("Failed to set up the API client")?;
    client.ensure_safe_base_url()?;

    let store = cli
        .credentials
        .map(CredentialStore::new)
        .unwrap_or_else(CredentialStore::default_location);

    let mut prompter = TerminalPrompter;
    let sources = CredentialSources {
        session: None,
        env_value: std::env::var(API_KEY_ENV).ok(),
        stored: store.load(),
    };
    let resolved = resolve(
        sources,
        interactive.then_some(&mut prompter as &mut dyn Prompter),
    )
    .context("Cannot start without an API key")?;

    if resolved.source == CredentialSource::Prompt {
        let question = format!("Save this key to {}?", store.path().display());
        if prompter.confirm(&question, false)? {
            if let Err(e) = store.save(&CredentialRecord::new(resolved.credential.expose())) {
                tracing::warn!(error = %e, "Could not save credentials");
                eprintln!("WARN: {e}; the key is kept for this session only.");
            }
        }
    }

    let mut session = Session {
        client,
        credential: resolved.credential,
        config: SessionConfig::new(cli.timeout, cli.debug_auth),
        store,
        color,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    ui::run(&mut session, &mut prompter, &mut out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_base_url_defaults_to_the_api_root() {
        let cli = Cli::try_parse_from(["moltbook"]).unwrap();
        let expected =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        assert_eq!(cli.base_url, expected);
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_base_url_flag() {
        let cli = Cli::try_parse_from(["moltbook", "--base-url", "https://example.com/api/v1"])
            .unwrap();
        assert_eq!(cli.base_url, "https://example.com/api/v1");
    }
}
