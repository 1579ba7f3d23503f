use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::config::{mask, Config, ConfigValue};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# userbook configuration

remote:
  # Google Cloud project that owns the Firestore database
  project_id: your-project-id

  # Firestore database and collection holding the users
  # database: (default)
  # collection: Users

  # Web API key, sent as the `key` query parameter
  # api_key: your-api-key

  # Full collection URL; overrides project_id/database/collection
  # collection_url: https://firestore.googleapis.com/v1/projects/your-project-id/databases/(default)/documents/Users
"#;

fn print_value(key: &str, value: &ConfigValue<String>) {
    println!("{}: {}", key, value.value);
    println!("  source: {}", value.source);
}

fn print_optional(key: &str, value: &ConfigValue<Option<String>>, secret: bool) {
    let shown = match value.value.as_deref() {
        Some(v) if secret => mask(v),
        Some(v) => v.to_string(),
        None => "(not set)".to_string(),
    };
    println!("{}: {}", key, shown);
    println!("  source: {}", value.source);
}

/// Writes the default config template, unless a file already exists.
fn write_default_config(config_path: &Path) -> std::io::Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(config_path)?;
    file.write_all(DEFAULT_CONFIG.as_bytes())?;
    Ok(true)
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        let remote = &config.remote;
                        print_value("base_url", &remote.base_url);
                        print_optional("project_id", &remote.project_id, false);
                        print_value("database", &remote.database);
                        print_value("collection", &remote.collection);
                        print_optional("collection_url", &remote.collection_url, false);
                        print_optional("api_key", &remote.api_key, true);
                        println!();

                        match remote.collection_url() {
                            Ok(url) => println!("Resolved collection: {}", url),
                            Err(e) => println!("Resolved collection: {}", e),
                        }
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                if write_default_config(&config_path)? {
                    println!("Created config file: {}", config_path.display());
                    println!("\nEdit this file to customize your settings.");
                } else {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'userbook config show' to view current configuration.");
                }
                Ok(())
            }
        }
    }
}
