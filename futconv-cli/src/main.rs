//! futconv CLI: vendor futures file normalization and price loading.
//!
//! Commands:
//! - `rename`: classify a vendor download directory and move configured
//!   files to canonical names (dry run unless `--execute`)
//! - `load`: write relocated CSV files into the price store
//! - `check`: show stored and vendor prices for one contract side by side
//! - `profile show`: print the active vendor profile as TOML
//! - `profile list`: list the built-in vendor profiles

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use futconv_core::config::VendorProfile;
use futconv_runner::{
    BatchOrchestrator, ConfigValidator, ConsistencyChecker, PriceLoader, Settings,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "futconv=info,futconv_core=info,futconv_runner=info";

#[derive(Parser)]
#[command(
    name = "futconv",
    about = "Normalize vendor futures price files and load them into the price store"
)]
struct Cli {
    #[command(flatten)]
    overrides: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override `futconv.toml`.
#[derive(Args)]
struct SettingsArgs {
    /// Settings file. Defaults to ./futconv.toml when present.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Price store root directory.
    #[arg(long, global = true)]
    store_root: Option<PathBuf>,

    /// Instrument configuration CSV.
    #[arg(long, global = true)]
    instrument_config: Option<PathBuf>,

    /// Roll configuration CSV.
    #[arg(long, global = true)]
    roll_config: Option<PathBuf>,

    /// Built-in vendor profile: norgate, norgate-compact.
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Vendor profile TOML file (overrides --profile).
    #[arg(long, global = true)]
    profile_file: Option<PathBuf>,
}

impl SettingsArgs {
    fn resolve(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.settings.as_deref()).context("loading settings")?;
        if let Some(root) = &self.store_root {
            settings.store_root = root.clone();
        }
        if let Some(path) = &self.instrument_config {
            settings.instrument_config = path.clone();
        }
        if let Some(path) = &self.roll_config {
            settings.roll_config = path.clone();
        }
        if let Some(name) = &self.profile {
            settings.profile = name.clone();
            settings.profile_file = None;
        }
        if let Some(path) = &self.profile_file {
            settings.profile_file = Some(path.clone());
        }
        Ok(settings)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rename vendor files (CODE-YYYYL.csv) into the sibling `<dir>_conv` directory.
    Rename {
        /// Vendor download directory.
        dir: PathBuf,

        /// Only process files of this vendor code (e.g. ES).
        #[arg(long)]
        code: Option<String>,

        /// Actually move files (without this flag, only previews the moves).
        #[arg(long, default_value_t = false)]
        execute: bool,

        /// Print the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Load relocated price files into the store.
    Load {
        /// Directory of canonical price files (usually `<dir>_conv`).
        dir: PathBuf,

        /// Only this canonical instrument.
        #[arg(long)]
        instrument: Option<String>,

        /// Only this contract (YYYYMM00); daily prices only.
        #[arg(long, requires = "instrument")]
        contract: Option<String>,

        /// Print the summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show stored and vendor prices for one contract.
    Check {
        /// Directory of canonical price files.
        dir: PathBuf,

        /// Canonical instrument code (e.g. SP500_micro).
        instrument: String,

        /// Contract date (YYYYMM00).
        contract: String,
    },
    /// Vendor profile commands.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the active vendor profile as TOML.
    Show,
    /// List the built-in profiles.
    List,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.overrides.resolve()?;

    match cli.command {
        Commands::Rename {
            dir,
            code,
            execute,
            json,
        } => run_rename(&settings, &dir, code.as_deref(), execute, json),
        Commands::Load {
            dir,
            instrument,
            contract,
            json,
        } => run_load(&settings, &dir, instrument.as_deref(), contract.as_deref(), json),
        Commands::Check {
            dir,
            instrument,
            contract,
        } => run_check(&settings, &dir, &instrument, &contract),
        Commands::Profile { action } => match action {
            ProfileAction::Show => run_profile_show(&settings),
            ProfileAction::List => {
                for name in VendorProfile::PRESETS {
                    println!("{name}");
                }
                Ok(())
            }
        },
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_rename(
    settings: &Settings,
    dir: &Path,
    code: Option<&str>,
    execute: bool,
    json: bool,
) -> Result<()> {
    let profile = settings.vendor_profile()?;
    let instruments = settings
        .instrument_store()
        .context("opening instrument configuration")?;
    let rolls = settings.roll_store().context("opening roll configuration")?;

    info!(profile = %profile.name, dry_run = !execute, "rename");
    let orchestrator =
        BatchOrchestrator::new(&profile.mapping, ConfigValidator::new(&instruments, &rolls));
    let report = orchestrator.run(dir, code, !execute)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for relocation in &report.relocations {
            println!("{relocation}");
        }
        print!("{report}");
    }

    if report.has_failures() {
        for failure in &report.failed {
            eprintln!("Error for {}: {}", failure.file, failure.error);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run_load(
    settings: &Settings,
    dir: &Path,
    instrument: Option<&str>,
    contract: Option<&str>,
    json: bool,
) -> Result<()> {
    let profile = settings.vendor_profile()?;
    let store = settings.price_store();
    let loader = PriceLoader::new(&store, &profile);

    let summary = match (instrument, contract) {
        (Some(instrument), Some(contract)) => loader.load_contract(instrument, contract, dir),
        (Some(instrument), None) => loader.load_instrument(instrument, dir),
        (None, _) => loader.load_directory(dir),
    }
    .with_context(|| format!("loading prices from {}", dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}

fn run_check(settings: &Settings, dir: &Path, instrument: &str, contract: &str) -> Result<()> {
    let profile = settings.vendor_profile()?;
    let store = settings.price_store();

    println!("Checking that vendor and stored prices match for {instrument}");
    let comparison = ConsistencyChecker::new(&store, &profile)
        .check(dir, instrument, contract)
        .with_context(|| format!("checking {instrument} {contract}"))?;
    print!("{comparison}");
    Ok(())
}

fn run_profile_show(settings: &Settings) -> Result<()> {
    let profile = settings.vendor_profile()?;
    print!("{}", profile.to_toml()?);
    Ok(())
}
