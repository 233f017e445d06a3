//! HTTP client and Storm stream decoder for the Synapse Cortex API.
//!
//! The core of this crate is [`storm::decode`], which turns the
//! newline-delimited JSON body of a `/api/v1/storm` response into typed
//! `init`, `node`, `print` and `fini` records. The HTTP client wraps the
//! rest of the Cortex REST surface.
//!
//! # Example
//!
//! ```no_run
//! use synapse_client::{Result, StormOpts, SynapseClient};
//!
//! # async fn example() -> Result<()> {
//! let client = SynapseClient::builder()
//!     .host_port("cortex.local", "4443")
//!     .api_key("secret")
//!     .build()?;
//!
//! // Check the Cortex is up
//! if client.cortex().active().await? {
//!     println!("Cortex is active");
//! }
//!
//! // Run a query and collect the results
//! let results = client
//!     .storm()
//!     .query("inet:fqdn=vertex.link", Some(StormOpts::in_view("8a9f...")))
//!     .await?;
//! for print in &results.prints {
//!     println!("{}", print.message);
//! }
//! println!("{} nodes", results.nodes.len());
//!
//! // Or stream messages as they arrive
//! use futures::StreamExt;
//! use tokio::pin;
//! let stream = client
//!     .storm()
//!     .stream(synapse_client::StormRequest::new("inet:fqdn"))
//!     .await?;
//! pin!(stream);
//! while let Some(message) = stream.next().await {
//!     if let synapse_client::StormMessage::Node(node) = message? {
//!         println!("{:?}", node.pairs);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Decoding a body you already have needs no client at all:
//!
//! ```
//! let body = b"[\"print\", {\"mesg\": \"hello\"}]\n";
//! let results = synapse_client::storm::decode(body).unwrap();
//! assert_eq!(results.prints[0].message, "hello");
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: Login/logout, users, roles, grants, passwords
//! - **Storm**: Query (decoded or streamed), call, export
//! - **Cortex**: Active status, core info, data model, feed
//! - **Vars**: Get, set, pop
//! - **Axon**: Put, has, get, delete blobs
//! - **Health**: Composite health check

pub mod api;
pub mod client;
pub mod error;
pub mod storm;
pub mod types;

pub use client::{ClientBuilder, SynapseClient};
pub use error::{Error, Result};
pub use storm::{
    DecodeError, FiniMessage, InitMessage, MessageKind, NodeInfo, NodeMessage, PrintMessage,
    SchemaPolicy, StormMessage, StormResults,
};
pub use types::*;
