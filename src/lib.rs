//! # Mudkeep - Multi-Tenant Text Dungeon Server
//!
//! Mudkeep is a small MUD server: clients connect over TCP, log in with a
//! username, and create or join independent "dungeon" instances - navigable
//! location graphs they can move through, look around, and pick up items
//! from, under per-dungeon capacity limits.
//!
//! ## Features
//!
//! - **Multiple Dungeons**: A bounded catalog of independently created world
//!   instances, each loaded from plain-text descriptor files.
//! - **Capacity Limits**: A global player cap with a waiting list, and a
//!   per-dungeon roster cap chosen at creation time.
//! - **Serialized World Access**: All world-mutating operations pass through
//!   one global gate with a bounded wait, so concurrent sessions can never
//!   corrupt shared state.
//! - **Line Protocol**: A plain prompt/response text protocol; any TCP line
//!   client (netcat, telnet) works.
//! - **Async Design**: Built with Tokio, one lightweight task per connection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mudkeep::config::Config;
//! use mudkeep::server::MudServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let server = Arc::new(MudServer::new(config));
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`server`] - the core server: session registry, dungeon catalog,
//!   remote-operation surface, and the per-connection command loop
//! - [`world`] - location graphs, descriptor parsing, and dungeon instances
//! - [`config`] - configuration management and validation
//! - [`logutil`] - log sanitization helpers

pub mod config;
pub mod logutil;
pub mod server;
pub mod world;
