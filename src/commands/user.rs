use clap::{Args, Subcommand};
use userbook_core::{Field, Record};

use super::{confirm_delete, finish, open_layer, print_records, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// List all users
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a new user
    Create {
        /// Full name
        name: String,

        /// Email address
        email: String,

        /// Age in years
        age: String,
    },

    /// Update an existing user
    Update {
        /// User ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New email
        #[arg(long)]
        email: Option<String>,

        /// New age
        #[arg(long)]
        age: Option<String>,
    },

    /// Delete a user
    Delete {
        /// User ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl UserCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let (mut layer, mut notices) = open_layer(config)?;

        match &self.command {
            UserSubcommand::List { format } => {
                let records = layer.fetch_all().await?;
                print_records(records, format)?;
                Ok(())
            }

            UserSubcommand::Create { name, email, age } => {
                let result = layer.create(name, email, age).await;
                let created = finish(result, &mut notices)?;
                println!("ID: {}", created.id);
                Ok(())
            }

            UserSubcommand::Update {
                id,
                name,
                email,
                age,
            } => {
                if name.is_none() && email.is_none() && age.is_none() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                layer.fetch_all().await?;
                let record = match layer.find(id) {
                    Some(r) => r.clone(),
                    None => return Err(format!("User not found: {}", id).into()),
                };

                // Start from the stored values and overlay the changes
                layer.select_for_edit(&record);
                let changes = [(Field::Name, name), (Field::Email, email), (Field::Age, age)];
                for (field, value) in changes {
                    if let Some(value) = value {
                        layer.set_field(field, value.as_str());
                    }
                }

                let result = layer.submit().await;
                let updated = finish(result, &mut notices)?;
                println!("{}", updated);
                Ok(())
            }

            UserSubcommand::Delete { id, force } => {
                layer.fetch_all().await?;

                let force = *force;
                let result = layer
                    .delete(id, |r: &Record| force || confirm_delete(r))
                    .await;
                if !finish(result, &mut notices)? {
                    println!("Deletion cancelled.");
                }
                Ok(())
            }
        }
    }
}
