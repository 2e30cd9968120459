use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "splitwarden",
    version,
    about = "Keep AnyConnect dynamic split-tunnel domains in sync across VPN headends"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Init {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
    Config {
        #[arg(long)]
        print: bool,
    },
    /// Compare each device's domains with the configured policy
    Audit {
        /// Device to target; repeat for several (defaults to the inventory)
        #[arg(long = "device")]
        devices: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Push the configured domains to each device
    Update {
        #[arg(long = "device")]
        devices: Vec<String>,
        #[arg(long)]
        json: bool,
        /// Record the batches instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove both split-tunnel directions from each device
    Clear {
        #[arg(long = "device")]
        devices: Vec<String>,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the command batches an operation would send
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PlanCommand {
    Update {
        #[arg(long = "device")]
        devices: Vec<String>,
    },
    Clear {
        #[arg(long = "device")]
        devices: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, force } => init_config(path, force),
        Commands::Config { print } => {
            if print {
                commands::config::print_effective(cli.config)
            } else {
                Ok(())
            }
        }
        Commands::Audit { devices, json } => commands::audit::execute(cli.config, devices, json),
        Commands::Update {
            devices,
            json,
            dry_run,
        } => commands::update::execute(commands::update::UpdateInputs {
            config_path: cli.config,
            devices,
            json,
            dry_run,
        }),
        Commands::Clear {
            devices,
            json,
            dry_run,
        } => commands::clear::execute(commands::clear::ClearInputs {
            config_path: cli.config,
            devices,
            json,
            dry_run,
        }),
        Commands::Plan { action } => {
            let action = match action {
                PlanCommand::Update { devices } => commands::plan::PlanAction::Update { devices },
                PlanCommand::Clear { devices } => commands::plan::PlanAction::Clear { devices },
            };
            commands::plan::execute(cli.config, action)
        }
    }
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let paths = splitwarden_core::config::ConfigPaths::resolve()?;
    let config_path = path.unwrap_or(paths.config_path);
    if config_path.exists() && !force {
        return Err(anyhow::anyhow!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
    }
    let config = splitwarden_core::config::Config::default_config();
    config.save(&config_path)?;
    println!("Config written to {}", config_path.display());
    Ok(())
}
