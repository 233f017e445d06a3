//! Storm command - interactive query prompt.
//!
//! Each query's decoded results are appended to the output file as one
//! JSON line: `{"init": [..], "nodes": [..], "prints": [..], "fini": [..]}`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use console::{Style, style};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use synapse_client::{StormOpts, StormResults, SynapseClient};

use super::{Context, print_results};

/// Arguments for the storm command.
#[derive(Args, Debug)]
pub struct StormArgs {
    /// File that results are appended to, one JSON line per query
    #[arg(short, long, default_value = "storm_results.json")]
    pub output: PathBuf,
}

/// Run the storm command.
pub async fn run(args: StormArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect().await?;
    let mut prompt = StormPrompt::new(client, ctx.storm_opts(), args.output, ctx.verbose)?;
    prompt.run().await
}

/// Prompt state.
struct StormPrompt {
    client: SynapseClient,
    opts: Option<StormOpts>,
    output: PathBuf,
    editor: Editor<(), DefaultHistory>,
    verbose: bool,
}

impl StormPrompt {
    fn new(
        client: SynapseClient,
        opts: Option<StormOpts>,
        output: PathBuf,
        verbose: bool,
    ) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();

        let editor = Editor::with_config(config)?;

        Ok(Self {
            client,
            opts,
            output,
            editor,
            verbose,
        })
    }

    /// Run the prompt loop until an empty line, `quit`/`exit` or Ctrl+D.
    async fn run(&mut self) -> Result<()> {
        let dim = Style::new().dim();
        println!(
            "{} {}",
            style("Storm").bold(),
            dim.apply_to(format!("(results -> {})", self.output.display()))
        );

        loop {
            match self.editor.readline("storm> ") {
                Ok(line) => {
                    let line = line.trim();
                    if is_exit(line) {
                        break;
                    }
                    if let Err(e) = self.run_query(line).await {
                        let red = Style::new().red();
                        eprintln!("{} {:#}", red.apply_to("Error:"), e);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", dim.apply_to("(Interrupted - type quit to exit)"));
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(e) => {
                    let red = Style::new().red();
                    eprintln!("{} {}", red.apply_to("Input error:"), e);
                    break;
                }
            }
        }

        Ok(())
    }

    async fn run_query(&self, query: &str) -> Result<()> {
        let results = self.client.storm().query(query, self.opts.clone()).await?;
        print_results(&results, self.verbose);
        append_results(&self.output, &results)
    }
}

/// Empty input or `quit`/`exit` (any case) ends the prompt.
fn is_exit(line: &str) -> bool {
    line.is_empty() || line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit")
}

/// Append one query's results as a single JSON line.
fn append_results(path: &Path, results: &StormResults) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let line = serde_json::to_string(results)?;
    writeln!(file, "{}", line)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
