//! Axon command - blob storage.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::Style;

use super::Context;

/// Arguments for the axon command.
#[derive(Args, Debug)]
pub struct AxonArgs {
    #[command(subcommand)]
    pub command: AxonCommand,
}

#[derive(Subcommand, Debug)]
pub enum AxonCommand {
    /// Upload a file
    Put {
        /// File to upload
        file: PathBuf,
    },

    /// Check whether a blob exists
    Has {
        /// SHA-256 of the blob
        sha256: String,
    },

    /// Download a blob
    Get {
        /// SHA-256 of the blob
        sha256: String,

        /// Where to write the blob
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Delete blobs
    Del {
        /// SHA-256 of each blob to delete
        #[arg(required = true)]
        sha256s: Vec<String>,
    },
}

/// Run the axon command.
pub async fn run(args: AxonArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect().await?;
    let axon = client.axon();
    let green = Style::new().green();
    let dim = Style::new().dim();

    match args.command {
        AxonCommand::Put { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let result = axon.put(bytes).await?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{} Uploaded {} {}",
                    green.apply_to("✓"),
                    result.sha256,
                    dim.apply_to(format!("({} bytes)", result.size))
                );
            }
        }
        AxonCommand::Has { sha256 } => {
            let present = axon.has(&sha256).await?;
            if ctx.json_output {
                println!("{}", serde_json::json!({ "sha256": sha256, "present": present }));
            } else if present {
                println!("{} {}", green.apply_to("present"), sha256);
            } else {
                println!("{} {}", dim.apply_to("missing"), sha256);
            }
        }
        AxonCommand::Get { sha256, output } => {
            let bytes = axon.get(&sha256).await?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "{} Wrote {} bytes to {}",
                green.apply_to("✓"),
                bytes.len(),
                output.display()
            );
        }
        AxonCommand::Del { sha256s } => {
            let deleted = axon.delete(&sha256s).await?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&deleted)?);
            } else {
                for (sha256, existed) in &deleted {
                    let status = if *existed { "deleted" } else { "not found" };
                    println!("{} {}", sha256, dim.apply_to(status));
                }
            }
        }
    }

    Ok(())
}
