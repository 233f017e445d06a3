//! CLI command handlers.

pub mod auth;
pub mod axon;
pub mod health;
pub mod query;
pub mod storm;
pub mod vars;

use anyhow::{Context as _, Result};
use console::Style;
use synapse_client::{StormOpts, StormResults, SynapseClient};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Cortex host name.
    pub host: String,
    /// Cortex HTTPS port.
    pub port: String,
    /// API key, if any.
    pub api_key: Option<String>,
    /// View iden for Storm queries.
    pub view: Option<String>,
    /// User to log in as.
    pub user: Option<String>,
    /// Password for `user`.
    pub password: Option<String>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Base URL of the Cortex.
    pub fn server_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }

    /// Build a client and log in if a user was given.
    pub async fn connect(&self) -> Result<SynapseClient> {
        let mut builder = SynapseClient::builder()
            .host_port(&self.host, &self.port)
            .danger_accept_invalid_certs(self.insecure);
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        let client = builder.build().context("Failed to create client")?;

        if let Some(user) = &self.user {
            let password = match &self.password {
                Some(p) => p.clone(),
                None => rpassword::prompt_password(format!("Password for {}: ", user))
                    .context("Failed to read password")?,
            };
            client
                .auth()
                .login(user, &password)
                .await
                .with_context(|| format!("Login failed for {}", user))?;
        }

        Ok(client)
    }

    /// Storm options for the configured view.
    pub fn storm_opts(&self) -> Option<StormOpts> {
        self.view.as_deref().map(StormOpts::in_view)
    }

    /// The configured view, or an error naming the setting to fix.
    pub fn require_view(&self) -> Result<&str> {
        self.view
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .context("No view configured: pass --view or set SYNAPSE_VIEW_ID")
    }
}

/// Print the prints, nodes and a one-line summary of a query.
pub(crate) fn print_results(results: &StormResults, verbose: bool) {
    let dim = Style::new().dim();
    let cyan = Style::new().cyan();

    for print in &results.prints {
        println!("{}", print.message);
    }

    for node in &results.nodes {
        let ndef: Vec<String> = node
            .pairs
            .iter()
            .map(|(form, valu)| format!("{}={}", form, valu))
            .collect();
        println!("{}", cyan.apply_to(ndef.join(" ")));
        if verbose {
            for (name, valu) in &node.info.props {
                println!("        {} = {}", dim.apply_to(name), valu);
            }
            for tag in node.info.tags.keys() {
                println!("        {}", dim.apply_to(format!("#{}", tag)));
            }
        }
    }

    let summary = match results.finis.last() {
        Some(fini) => format!("complete. {} nodes in {} ms.", fini.count, fini.took),
        None => format!("{} nodes (no fini message received)", results.nodes.len()),
    };
    println!("{}", dim.apply_to(summary));
}
