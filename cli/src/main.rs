use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use atelier::config::{load_dotenv, RelayConfig, SiteConfig};
use atelier::intake::{QuoteClient, QuoteForm, SubmitStatus};
use atelier::mail::MemoryMailer;
use atelier::quote::{QuoteRelay, ServiceCategory};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atelier", about = "Studio website server and quote relay")]
struct Cli {
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the static pages and the quote relay.
    Serve {
        /// Overrides ATELIER_PORT.
        #[arg(short, long)]
        port: Option<u16>,

        /// Overrides ATELIER_SITE_DIR.
        #[arg(long)]
        site_dir: Option<PathBuf>,

        /// Accept quotes but only log them instead of sending email.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Report whether the SMTP relay settings are complete.
    Check,

    /// Submit a quote request to a running site.
    Quote {
        /// Base URL of the site, e.g. https://studio.example
        #[arg(long, default_value = "http://localhost:3000")]
        site: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "Publishing")]
        service: String,

        #[arg(long)]
        message: String,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},tower_http={level}")));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    load_dotenv();

    match cli.command {
        Commands::Serve {
            port,
            site_dir,
            dry_run,
        } => serve(port, site_dir, dry_run).await,
        Commands::Check => check(),
        Commands::Quote {
            site,
            name,
            email,
            service,
            message,
        } => quote(&site, name, email, &service, message).await,
    }
}

async fn serve(port: Option<u16>, site_dir: Option<PathBuf>, dry_run: bool) -> Result<ExitCode> {
    let mut site = SiteConfig::load().context("reading ATELIER_* settings")?;
    if let Some(port) = port {
        site.port = port;
    }
    if let Some(site_dir) = site_dir {
        site.site_dir = site_dir;
    }

    let relay_config = RelayConfig::load().context("reading SMTP settings")?;
    let relay = if dry_run {
        tracing::warn!("dry run: quote requests are logged, not emailed");
        QuoteRelay::new(MemoryMailer::new(), relay_config.recipient())
    } else {
        QuoteRelay::from_config(&relay_config)
    };

    tracing::info!(site_dir = %site.site_dir.display(), "serving static pages");
    let router = atelier::site_router(&site.site_dir, relay);
    atelier::serve(site.socket_addr(), router)
        .await
        .context("running HTTP server")?;

    Ok(ExitCode::SUCCESS)
}

fn check() -> Result<ExitCode> {
    let config = RelayConfig::load().context("reading SMTP settings")?;
    let relay = QuoteRelay::from_config(&config);

    println!("recipient: {}", relay.recipient());
    match relay.unavailable_reason() {
        None => {
            let mailer = config.mailer_config()?;
            println!(
                "relay: {}:{} ({:?} TLS) as {}",
                mailer.host,
                mailer.port,
                mailer.tls(),
                mailer.from
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(reason) => {
            println!("relay disabled: {}", reason);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn quote(
    site: &str,
    full_name: String,
    email: String,
    service: &str,
    message: String,
) -> Result<ExitCode> {
    let service: ServiceCategory = service.parse()?;
    let mut form = QuoteForm::new(full_name, email, service, message);

    let client = QuoteClient::for_site(site);
    match form.submit(&client).await {
        SubmitStatus::Sent => {
            println!("Quote request sent.");
            Ok(ExitCode::SUCCESS)
        }
        SubmitStatus::Error(message) => {
            eprintln!("{}", message);
            Ok(ExitCode::FAILURE)
        }
        status => anyhow::bail!("submission ended in unexpected state {:?}", status),
    }
}
