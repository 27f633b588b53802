//! Roam VPN CLI
//!
//! A command-line front-end over the Roam application interface.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use roam_app_interface::{AppEngine, AppEvent, AppSettings};

/// Roam VPN - manage tunnel configurations and the connection
#[derive(Parser)]
#[command(name = "roam")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = "roam.toml")]
    settings: PathBuf,

    /// Log level override (error, warn, info, debug, trace)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a configuration file under a name
    Import {
        /// Name to store the configuration under
        name: String,

        /// Path to the configuration text file
        file: PathBuf,
    },

    /// List stored configurations
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one stored configuration
    Show {
        /// Name of the configuration
        name: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Delete a stored configuration
    Delete {
        /// Name of the configuration
        name: String,
    },

    /// Connect using a stored configuration and run until Ctrl-C
    Up {
        /// Name of the configuration
        name: String,
    },

    /// Write a sample settings file
    SampleSettings {
        /// Output path for the settings file
        #[arg(short, long, default_value = "roam.toml")]
        output: PathBuf,
    },

    /// Print a sample tunnel configuration text
    SampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(&cli.settings)?;
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&settings.log.level)
        .to_string();
    init_logging(&level);

    match cli.command {
        Commands::Import { name, file } => run_import(&settings, &name, &file).await,
        Commands::List { json } => run_list(&settings, json).await,
        Commands::Show { name, json } => run_show(&settings, &name, json).await,
        Commands::Delete { name } => run_delete(&settings, &name).await,
        Commands::Up { name } => run_up(&settings, &name).await,
        Commands::SampleSettings { output } => write_sample_settings(&output),
        Commands::SampleConfig => {
            print!("{}", SAMPLE_CONFIG);
            Ok(())
        }
    }
}

fn load_settings(path: &Path) -> Result<AppSettings> {
    if path.exists() {
        AppSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    } else {
        Ok(AppSettings::default())
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_engine(settings: &AppSettings) -> Result<AppEngine> {
    AppEngine::from_settings(settings).context("failed to initialize the application engine")
}

async fn run_import(settings: &AppSettings, name: &str, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let engine = build_engine(settings)?;
    let record = engine
        .save_config(name, &text)
        .await
        .context("failed to save configuration")?;

    if !record.has_directives() {
        warn!(name, "no recognizable directives in the imported text");
    }
    println!(
        "imported '{}' ({} peer(s), endpoint {})",
        record.name,
        record.peer_count,
        record.display_endpoint()
    );
    Ok(())
}

async fn run_list(settings: &AppSettings, json: bool) -> Result<()> {
    let engine = build_engine(settings)?;
    let configs = engine.configs().await.context("failed to list configurations")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&configs)?);
        return Ok(());
    }

    if configs.is_empty() {
        println!("no configurations stored");
        return Ok(());
    }

    let active = engine.active_name().await?;
    for config in configs {
        let marker = if active.as_deref() == Some(config.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:<20} {:<28} {} peer(s)",
            marker,
            config.name,
            config.display_endpoint(),
            config.peer_count
        );
    }
    Ok(())
}

async fn run_show(settings: &AppSettings, name: &str, json: bool) -> Result<()> {
    let engine = build_engine(settings)?;
    let record = engine
        .config(name)
        .await
        .with_context(|| format!("failed to load '{}'", name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("name:      {}", record.name);
    println!("endpoint:  {}", record.display_endpoint());
    println!("peers:     {}", record.peer_count);
    println!("address:   {}", record.interface.address);
    println!("dns:       {}", record.interface.dns);
    println!();
    print!("{}", record.raw);
    Ok(())
}

async fn run_delete(settings: &AppSettings, name: &str) -> Result<()> {
    let engine = build_engine(settings)?;
    engine
        .delete_config(name)
        .await
        .with_context(|| format!("failed to delete '{}'", name))?;

    println!("deleted '{}'", name);
    Ok(())
}

async fn run_up(settings: &AppSettings, name: &str) -> Result<()> {
    let engine = build_engine(settings)?;

    let mut events = engine.subscribe();
    engine.connect(name).await?;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(AppEvent::StateChanged(state)) => {
                    if let Some(message) = state.error {
                        bail!("connect failed: {}", message);
                    }
                    info!(link = %state.link, "state changed");
                }
                Ok(AppEvent::ConfigsChanged) => {}
                Err(_) => bail!("event channel closed"),
            },
            _ = signal::ctrl_c() => {
                info!("shutting down...");
                engine
                    .disconnect()
                    .await
                    .context("failed to disconnect")?;
                break;
            }
        }
    }

    Ok(())
}

fn write_sample_settings(output: &Path) -> Result<()> {
    if output.exists() {
        bail!("{} already exists, not overwriting", output.display());
    }

    std::fs::write(output, AppSettings::sample())
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("wrote sample settings to {}", output.display());
    Ok(())
}

const SAMPLE_CONFIG: &str = "\
[Interface]
PrivateKey = <base64 private key>
Address = 10.0.0.2/24
DNS = 8.8.8.8

[Peer]
PublicKey = <base64 public key>
Endpoint = vpn.example.com:51820
AllowedIPs = 0.0.0.0/0
PersistentKeepalive = 25
";
