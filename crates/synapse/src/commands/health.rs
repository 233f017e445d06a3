//! Health command - checks the Cortex is up and answering queries.

use anyhow::{Result, bail};
use clap::Args;
use console::Style;
use serde::Serialize;
use synapse_client::HealthReport;

use super::Context;

/// Arguments for the health command.
#[derive(Args, Debug)]
pub struct HealthArgs {}

/// Health report for JSON output.
#[derive(Debug, Serialize)]
struct HealthOutput<'a> {
    server_url: String,
    view: &'a str,
    healthy: bool,
    #[serde(flatten)]
    checks: HealthReport,
}

/// Run the health command.
pub async fn run(_args: HealthArgs, ctx: &Context) -> Result<()> {
    let view = ctx.require_view()?;
    if ctx.api_key.as_deref().is_none_or(str::is_empty) && ctx.user.is_none() {
        bail!("No credentials configured: pass --api-key or set SYNAPSE_API_KEY");
    }

    let client = ctx.connect().await?;
    let report = client.health().run(view).await?;

    if ctx.json_output {
        let output = HealthOutput {
            server_url: ctx.server_url(),
            view,
            healthy: report.is_healthy(),
            checks: report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let green = Style::new().green();
        let red = Style::new().red();
        let dim = Style::new().dim();

        for (name, passed) in [
            ("/active", report.active),
            ("/storm/call", report.storm_call),
            ("/storm", report.storm_stream),
        ] {
            let mark = if passed {
                green.apply_to("✓")
            } else {
                red.apply_to("✗")
            };
            println!("  {} {}", mark, dim.apply_to(name));
        }
    }

    if !report.is_healthy() {
        bail!("Health check failed for {}", ctx.server_url());
    }

    if !ctx.json_output {
        println!("✅ All health checks passed.");
    }
    Ok(())
}
