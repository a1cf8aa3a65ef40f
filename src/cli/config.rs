//! Config subcommand implementation.

use super::Context;
use crate::config::AppSettings;
use crate::error::{CliError, CliResult, ConfigError};
use crate::output;
use clap::{Parser, Subcommand};

/// Manage settings.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Settings actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings as JSON
    Show,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },

    /// Print the settings file location
    Path,
}

impl ConfigCommand {
    /// Execute the config command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        match &self.action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&ctx.settings)?);
                Ok(())
            }
            ConfigAction::Init { force } => {
                let paths = ctx.paths.as_ref().ok_or(ConfigError::DirectoryNotFound)?;
                let file = paths.settings_file();
                if file.exists() && !force {
                    return Err(CliError::Other(format!(
                        "settings file already exists at {} (use --force to overwrite)",
                        file.display()
                    )));
                }
                let written = AppSettings::default().save(paths)?;
                if !ctx.quiet {
                    output::print_success(&format!("Wrote {}", written.display()));
                }
                Ok(())
            }
            ConfigAction::Path => {
                let paths = ctx.paths.as_ref().ok_or(ConfigError::DirectoryNotFound)?;
                println!("{}", paths.settings_file().display());
                Ok(())
            }
        }
    }
}
