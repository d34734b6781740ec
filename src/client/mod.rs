//! # FatSecret HTTP Client
//!
//! This module provides an HTTP client for the FatSecret platform API: it
//! authenticates with the client-credentials grant, searches the food database
//! and fetches nutrition details for a chosen food.
//!
//! ## Modules
//!
//! - [`auth`] - Token acquisition, caching and refresh
//! - [`client`] - The lookup client with `foods.search` and `food.get`
//! - [`error`] - The closed error taxonomy every operation returns
//! - [`retry`] - Opt-in retry wrapper for transient network failures
//! - [`types`] - Wire and domain types
//!
//! ## Quick Start
//!
//! ```no_run
//! use mcp_fatsecret::client::FatSecretClient;
//! use mcp_fatsecret::FatSecretConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = FatSecretClient::new(FatSecretConfig::new("client-id", "client-secret"))?;
//!
//! // Search by barcode, then fetch the details of the first match
//! let foods = client.search_foods("051000012517").await?;
//! if let Some(food) = foods.first() {
//!     let details = client.get_food(&food.id).await?;
//!     println!("{} has {} servings", details.name, details.servings.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
#[allow(clippy::module_inception)]
pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use auth::{Credential, TokenManager};
pub use client::{FatSecretClient, RequestOptions, SearchParams};
pub use error::FatSecretError;
pub use types::*;
