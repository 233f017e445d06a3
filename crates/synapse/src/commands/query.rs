//! Query command - run one Storm query and print the results.

use anyhow::Result;
use clap::Args;
use synapse_client::{SchemaPolicy, StormRequest};

use super::{Context, print_results};

/// Arguments for the query command.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Storm query text
    pub query: String,

    /// Fail on the first message that does not match its schema
    #[arg(long)]
    pub strict: bool,
}

/// Run the query command.
pub async fn run(args: QueryArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect().await?;

    let request = StormRequest::new(args.query).with_opts(ctx.storm_opts().unwrap_or_default());
    let policy = if args.strict {
        SchemaPolicy::Fail
    } else {
        SchemaPolicy::Skip
    };

    let results = client.storm().run(&request, policy).await?;
    if results.skipped > 0 {
        tracing::warn!(skipped = results.skipped, "Some response lines could not be decoded");
    }

    if ctx.json_output {
        println!("{}", serde_json::to_string(&results)?);
    } else {
        print_results(&results, ctx.verbose);
    }

    Ok(())
}
