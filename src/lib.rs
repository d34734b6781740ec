//! # FatSecret MCP Library
//!
//! This library looks up nutrition data in the FatSecret food database and
//! exposes it through the Model Context Protocol (MCP). It consists of three
//! components:
//!
//! ## Client Module
//!
//! The [`client`] module is the authenticated HTTP client. It manages the
//! OAuth2 access token and performs the two dependent lookups: search by
//! barcode or text, then fetch details by food id.
//!
//! ## Config Module
//!
//! [`config`] holds credentials and endpoints, loadable from the environment.
//!
//! ## Server Module
//!
//! The [`server`] module implements an MCP server that exposes the lookups as
//! tools that AI assistants can use.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use mcp_fatsecret::{FatSecretClient, FatSecretConfig, FatSecretMcpServer};
//!
//! # fn example() -> anyhow::Result<()> {
//! // Use the client directly
//! let client = FatSecretClient::new(FatSecretConfig::new("client-id", "client-secret"))?;
//!
//! // Or share it with an MCP server
//! let server = FatSecretMcpServer::new(Arc::new(client));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod server;

pub use client::{FatSecretClient, FatSecretError};
pub use config::FatSecretConfig;
pub use server::FatSecretMcpServer;
