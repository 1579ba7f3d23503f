//! Interactive session over a single sync layer.
//!
//! The collection is fetched once on start and then kept in step with each
//! add, edit and delete, the same way a form-and-list screen would.

use clap::Args;
use std::io::{self, Write};
use userbook_core::{Field, FirestoreClient, NoticeReceiver, Record, SyncLayer};

use super::{confirm_delete, open_layer, print_notices, print_records, OutputFormat};
use crate::config::Config;

const HELP: &str = "\
Commands:
  list                        Show the user list
  refresh                     Reload the list from the server
  add <name> <email> <age>    Add a new user
  edit <id>                   Load a user into the form for editing
  set <field> <value>         Change a form field (name, email, age)
  form                        Show the form and the edit target
  submit                      Save the form (update when editing, add otherwise)
  reset                       Clear the form and stop editing
  delete <id>                 Delete a user (asks for confirmation)
  help                        Show this help
  quit                        Leave the shell

Quote values that contain spaces: add \"Ann Lee\" ann@x.com 30";

/// Start an interactive session
#[derive(Args)]
pub struct ShellCommand {}

/// One parsed shell line.
#[derive(Debug, PartialEq, Eq)]
enum ShellAction {
    Empty,
    List,
    Refresh,
    Add {
        name: String,
        email: String,
        age: String,
    },
    Edit(String),
    Set(Field, String),
    ShowForm,
    Submit,
    Reset,
    Delete(String),
    Help,
    Quit,
}

/// Splits a line into words, honoring single and double quotes.
fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}

fn parse_action(args: &[String]) -> Result<ShellAction, String> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(ShellAction::Empty);
    };

    let action = match (command.to_lowercase().as_str(), rest) {
        ("list" | "ls", []) => ShellAction::List,
        ("refresh", []) => ShellAction::Refresh,
        ("add", [name, email, age]) => ShellAction::Add {
            name: name.clone(),
            email: email.clone(),
            age: age.clone(),
        },
        ("edit", [id]) => ShellAction::Edit(id.clone()),
        ("set", [field, value @ ..]) if !value.is_empty() => {
            ShellAction::Set(field.parse()?, value.join(" "))
        }
        ("form", []) => ShellAction::ShowForm,
        ("submit" | "save", []) => ShellAction::Submit,
        ("reset" | "cancel", []) => ShellAction::Reset,
        ("delete" | "rm", [id]) => ShellAction::Delete(id.clone()),
        ("help" | "?", _) => ShellAction::Help,
        ("quit" | "exit", []) => ShellAction::Quit,
        (name, _) => {
            return Err(format!(
                "Bad command or arguments: '{}'. Type 'help' for usage.",
                name
            ))
        }
    };
    Ok(action)
}

impl ShellCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let (mut layer, mut notices) = open_layer(config)?;

        if let Err(e) = layer.fetch_all().await {
            eprintln!("Could not load users: {}", e);
        }
        print_records(layer.records(), &OutputFormat::Text)?;
        println!("Type 'help' for commands.");

        loop {
            match layer.edit_selection() {
                Some(id) => print!("userbook (editing {})> ", id),
                None => print!("userbook> "),
            }
            io::stdout().flush()?;

            let mut line = String::new();
            if io::stdin().read_line(&mut line)? == 0 {
                println!();
                break;
            }

            let action = match split_args(&line).and_then(|args| parse_action(&args)) {
                Ok(action) => action,
                Err(e) => {
                    eprintln!("{}", e);
                    continue;
                }
            };

            if action == ShellAction::Quit {
                break;
            }
            Self::apply(&mut layer, &mut notices, action).await?;
        }

        Ok(())
    }

    async fn apply(
        layer: &mut SyncLayer<FirestoreClient>,
        notices: &mut NoticeReceiver,
        action: ShellAction,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match action {
            ShellAction::Empty | ShellAction::Quit => {}
            ShellAction::Help => println!("{}", HELP),
            ShellAction::List => print_records(layer.records(), &OutputFormat::Text)?,
            ShellAction::Refresh => match layer.fetch_all().await {
                Ok(records) => print_records(records, &OutputFormat::Text)?,
                Err(e) => eprintln!("Could not load users: {}", e),
            },
            ShellAction::Add { name, email, age } => {
                // Failures are reported through notices
                let _ = layer.create(&name, &email, &age).await;
            }
            ShellAction::Edit(id) => match layer.find(&id).cloned() {
                Some(record) => {
                    layer.select_for_edit(&record);
                    print_form(layer);
                }
                None => eprintln!("User not found: {}", id),
            },
            ShellAction::Set(field, value) => layer.set_field(field, value),
            ShellAction::ShowForm => print_form(layer),
            ShellAction::Submit => {
                let _ = layer.submit().await;
            }
            ShellAction::Reset => layer.reset(),
            ShellAction::Delete(id) => {
                if let Ok(false) = layer.delete(&id, |r: &Record| confirm_delete(r)).await {
                    println!("Deletion cancelled.");
                }
            }
        }

        print_notices(notices);
        Ok(())
    }
}

fn print_form(layer: &SyncLayer<FirestoreClient>) {
    let form = layer.form();
    match layer.edit_selection() {
        Some(id) => println!("Editing user {}", id),
        None => println!("New user"),
    }
    println!("  name:  {}", form.name);
    println!("  email: {}", form.email);
    println!("  age:   {}", form.age);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        split_args(line).unwrap()
    }

    #[test]
    fn test_split_args_plain() {
        assert_eq!(args("add Ann a@x.com 30"), vec!["add", "Ann", "a@x.com", "30"]);
        assert_eq!(args("   list  \n"), vec!["list"]);
        assert!(args("").is_empty());
    }

    #[test]
    fn test_split_args_quotes() {
        assert_eq!(
            args(r#"add "Ann Lee" 'a@x.com' 30"#),
            vec!["add", "Ann Lee", "a@x.com", "30"]
        );
        assert_eq!(args(r#"set name """#), vec!["set", "name", ""]);
    }

    #[test]
    fn test_split_args_unterminated_quote() {
        assert!(split_args(r#"add "Ann a@x.com 30"#).is_err());
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse_action(&args(r#"add "Ann Lee" a@x.com 30"#)).unwrap(),
            ShellAction::Add {
                name: "Ann Lee".to_string(),
                email: "a@x.com".to_string(),
                age: "30".to_string(),
            }
        );
        assert!(parse_action(&args("add Ann a@x.com")).is_err());
    }

    #[test]
    fn test_parse_set_joins_words() {
        assert_eq!(
            parse_action(&args("set name Ann Lee")).unwrap(),
            ShellAction::Set(Field::Name, "Ann Lee".to_string())
        );
        assert!(parse_action(&args("set phone 123")).is_err());
        assert!(parse_action(&args("set name")).is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_action(&args("")).unwrap(), ShellAction::Empty);
        assert_eq!(parse_action(&args("LIST")).unwrap(), ShellAction::List);
        assert_eq!(
            parse_action(&args("edit 42")).unwrap(),
            ShellAction::Edit("42".to_string())
        );
        assert_eq!(
            parse_action(&args("rm 42")).unwrap(),
            ShellAction::Delete("42".to_string())
        );
        assert_eq!(parse_action(&args("submit")).unwrap(), ShellAction::Submit);
        assert_eq!(parse_action(&args("quit")).unwrap(), ShellAction::Quit);
        assert!(parse_action(&args("frobnicate")).is_err());
    }
}
