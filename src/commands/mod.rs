mod config_cmd;
mod shell;
mod user;

pub use config_cmd::ConfigCommand;
pub use shell::ShellCommand;
pub use user::UserCommand;

use clap::ValueEnum;
use std::io::{self, Write};
use userbook_core::{FirestoreClient, NoticeKind, NoticeReceiver, Record, SyncError, SyncLayer};

use crate::config::{Config, ConfigError};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Builds a sync layer over the configured Firestore collection.
pub(crate) fn open_layer(
    config: &Config,
) -> Result<(SyncLayer<FirestoreClient>, NoticeReceiver), ConfigError> {
    let url = config.remote.collection_url()?;
    tracing::debug!("Using collection {}", url);
    let client = FirestoreClient::new(url, config.remote.api_key());
    Ok(SyncLayer::new(client))
}

/// Prints pending notices: successes to stdout, everything else to stderr.
pub(crate) fn print_notices(notices: &mut NoticeReceiver) {
    while let Ok(notice) = notices.try_recv() {
        match notice.kind {
            NoticeKind::Info => println!("{}", notice.message),
            _ => eprintln!("{}", notice),
        }
    }
}

/// Resolves an operation result for one-shot commands.
///
/// Success notices are printed; on failure the blocking notice (which names
/// the failed action) becomes the returned error.
pub(crate) fn finish<T>(
    result: Result<T, SyncError>,
    notices: &mut NoticeReceiver,
) -> Result<T, Box<dyn std::error::Error>> {
    match result {
        Ok(value) => {
            print_notices(notices);
            Ok(value)
        }
        Err(e) => {
            let mut message = None;
            while let Ok(notice) = notices.try_recv() {
                if notice.is_blocking() {
                    message = Some(notice.message);
                }
            }
            Err(message.unwrap_or_else(|| e.to_string()).into())
        }
    }
}

/// Asks on stdin whether `record` should be deleted.
pub(crate) fn confirm_delete(record: &Record) -> bool {
    print!("Delete user '{}' ({})? [y/N] ", record.name, record.email);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(_) => input.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let kept: String = value.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

pub(crate) fn print_records(records: &[Record], format: &OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No users found");
                return Ok(());
            }
            println!("{:<20}  {:<24}  {:<30}  AGE", "ID", "NAME", "EMAIL");
            println!("{}", "-".repeat(82));
            for record in records {
                println!(
                    "{:<20}  {:<24}  {:<30}  {}",
                    record.id,
                    truncate(&record.name, 24),
                    truncate(&record.email, 30),
                    record.age
                );
            }
            println!("\nTotal: {} user(s)", records.len());
        }
    }
    Ok(())
}
