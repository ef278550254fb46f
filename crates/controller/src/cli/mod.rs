use crate::settings::Settings;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "rsvp-service")]
pub struct Args {
    #[arg(
        short,
        long,
        default_value = "config.toml",
        help = "Path to the configuration file"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    cmd: Option<SubCommand>,
}

#[derive(Subcommand, Debug, Clone)]
enum SubCommand {
    /// Apply pending database migrations without starting the service
    ///
    /// Startup applies them as well, the subcommand exists for running
    /// migrations ahead of a deployment.
    MigrateDb,
}

impl Args {
    /// True when no subcommand ran and the service itself should start
    pub fn service_should_start(&self) -> bool {
        self.cmd.is_none()
    }
}

/// Parses the command line and runs any given subcommand
///
/// The returned [`Args`] tell the caller whether the service should start,
/// see [`Args::service_should_start`].
pub async fn parse_args() -> Result<Args> {
    let args = Args::parse();

    if let Some(sub_command) = args.cmd.clone() {
        let settings = Settings::load(&args.config)?;
        match sub_command {
            SubCommand::MigrateDb => {
                db_storage::migrations::migrate_from_url(&settings.database.url)
                    .await
                    .context("Database migration failed")?;
            }
        }
    }

    Ok(args)
}
