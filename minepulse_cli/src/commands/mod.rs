// Copyright (C) 2024-2026 MinePulse Developers (see AUTHORS)
//
// This file is part of MinePulse
//
// MinePulse is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// MinePulse is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// MinePulse. If not, see <https://www.gnu.org/licenses/>.

pub mod challenge;
pub mod mine;

use chrono::Utc;
use clap::{Parser, Subcommand};
use minepulse_lib::cli_commands;
use minepulse_lib::config::Config;
use minepulse_lib::logging::setup_logging;
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to minepulse config file (not required for challenge or draw)
    #[arg(short, long, env("MINEPULSE_CONFIG"), global = true)]
    pub config: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the hash rate and efficiency breakdown for the configured profile
    Rates,
    /// Project earnings hour by hour
    Project {
        /// Number of hours to project
        #[arg(short = 'H', long, default_value = "24")]
        hours: u32,
    },
    /// Draw lucky booster candidates without applying them
    Draw {
        /// Number of draws
        #[arg(short, long, default_value = "1")]
        count: u32,
    },
    /// List past mining sessions of the configured wallet
    History {
        /// Maximum number of sessions to return
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },
    /// Start or resume a mining session and follow it until it completes
    Mine {
        /// Stop the session when interrupted instead of leaving it running remotely
        #[arg(long, default_value = "false")]
        stop_on_exit: bool,
    },
    /// Print the challenge message a wallet has to sign for the [wallet] section
    Challenge {
        /// Wallet address
        address: String,
    },
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    let config_path = cli
        .config
        .as_ref()
        .ok_or("Config file required for this command. Use --config")?;
    Ok(Config::load(config_path)?)
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Challenge { address }) => {
            tracing_subscriber::fmt::init();
            challenge::execute(address, Utc::now())?;
        }
        Some(Commands::Draw { count }) => {
            tracing_subscriber::fmt::init();
            cli_commands::draw::execute(*count, Utc::now())?;
        }
        Some(command) => {
            let config = load_config(&cli)?;
            let _guard = setup_logging(&config.logging)?;

            match command {
                Commands::Rates => cli_commands::rates::execute(&config, Utc::now())?,
                Commands::Project { hours } => {
                    cli_commands::project::execute(&config, *hours, Utc::now())?
                }
                Commands::History { limit } => {
                    let client = cli_commands::client::open_session_client(&config)?;
                    let user_id = mine::wallet_user_id(&config)?;
                    cli_commands::history::execute(&client, &user_id, *limit).await?;
                }
                Commands::Mine { stop_on_exit } => {
                    mine::execute(config, *stop_on_exit).await?;
                }
                Commands::Challenge { .. } | Commands::Draw { .. } => unreachable!(),
            }
        }
        None => {
            println!("No command specified. Use --help for usage information.");
        }
    }

    Ok(())
}
