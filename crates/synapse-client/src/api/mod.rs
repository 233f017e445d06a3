//! API endpoint implementations.

mod auth;
mod axon;
mod cortex;
mod health;
mod storm;
mod vars;

pub use auth::AuthApi;
pub use axon::AxonApi;
pub use cortex::CortexApi;
pub use health::{HealthApi, MD5_PROBE_QUERY};
pub use storm::StormApi;
pub use vars::VarsApi;
