//! consentctl: drive the consent engine from a terminal
//!
//! Usage:
//!   consentctl load                        → page load: banner or icon
//!   consentctl accept-all                  → accept every category
//!   consentctl reject-all                  → keep only required categories
//!   consentctl set --grant a --deny b      → confirm a preferences choice
//!   consentctl dismiss                     → open and close preferences
//!   consentctl status [--json]             → show the stored decision
//!   consentctl dump-config                 → print effective settings as TOML

use clap::{Parser, Subcommand};
use consentkit::commands::{self, Action, SessionOptions, StatusReport};
use consentkit::TerminalRenderer;
use consentkit_engine::SurfaceRenderer;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "consentctl",
    about = "Consent banner state machine, driven from the terminal",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML, or JSON by extension)
    #[arg(short, long, global = true, default_value = "consent.toml")]
    config: PathBuf,

    /// Storage document holding recorded decisions
    #[arg(short, long, global = true, default_value = "consent-storage.json")]
    storage: PathBuf,

    /// Storage namespace; overrides bannerSuffix from the settings file
    #[arg(long, global = true)]
    suffix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a page load
    Load,
    /// Accept all categories
    AcceptAll,
    /// Reject all non-essential categories
    RejectAll,
    /// Choose categories through the preferences surface
    Set {
        /// Category to grant (repeatable)
        #[arg(long)]
        grant: Vec<String>,
        /// Category to deny (repeatable)
        #[arg(long)]
        deny: Vec<String>,
    },
    /// Open preferences and close them without confirming
    Dismiss,
    /// Show the stored decision
    Status {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the effective settings as TOML
    DumpConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let opts = SessionOptions {
        config: cli.config,
        storage: cli.storage,
        suffix: cli.suffix,
    };

    let action = match cli.command {
        Commands::Load => Action::Load,
        Commands::AcceptAll => Action::AcceptAll,
        Commands::RejectAll => Action::RejectAll,
        Commands::Set { grant, deny } => Action::Set { grant, deny },
        Commands::Dismiss => Action::Dismiss,
        Commands::Status { json } => {
            let report = commands::status(&opts);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
            return Ok(());
        }
        Commands::DumpConfig => {
            print!("{}", commands::load_settings(&opts).to_toml());
            return Ok(());
        }
    };

    let manager = commands::run(&opts, &action, Box::new(terminal))?;
    println!();
    print!("{}", StatusReport::from_engine(manager.engine()));
    Ok(())
}

fn terminal() -> Box<dyn SurfaceRenderer> {
    Box::new(TerminalRenderer::stdout())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consentkit=info,consentctl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
