//! Vars command - global Cortex variables.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use serde_json::{Map, Value};

use super::Context;

/// Arguments for the vars command.
#[derive(Args, Debug)]
pub struct VarsArgs {
    #[command(subcommand)]
    pub command: VarsCommand,
}

#[derive(Subcommand, Debug)]
pub enum VarsCommand {
    /// Show all variables
    Get,

    /// Set a variable
    Set {
        /// Variable name
        name: String,
        /// Value, parsed as JSON when possible and kept as a string otherwise
        value: String,
    },

    /// Remove a variable and print its last value
    Pop {
        /// Variable name
        name: String,
    },
}

/// Run the vars command.
pub async fn run(args: VarsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect().await?;
    let vars = client.vars();
    let dim = Style::new().dim();

    match args.command {
        VarsCommand::Get => {
            let all = vars.get().await?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else if all.is_empty() {
                println!("{}", dim.apply_to("No variables set"));
            } else {
                for (name, value) in &all {
                    println!("{} = {}", name, value);
                }
            }
        }
        VarsCommand::Set { name, value } => {
            let mut update = Map::new();
            update.insert(name.clone(), parse_value(&value));
            vars.set(&update).await?;
            let green = Style::new().green();
            println!("{} {} set", green.apply_to("✓"), name);
        }
        VarsCommand::Pop { name } => {
            let value = vars.pop(&name).await?;
            println!("{}", value);
        }
    }

    Ok(())
}

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("10"), serde_json::json!(10));
        assert_eq!(parse_value("[1, 2]"), serde_json::json!([1, 2]));
        assert_eq!(parse_value("vertex.link"), serde_json::json!("vertex.link"));
    }
}
