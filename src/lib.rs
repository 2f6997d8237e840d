//! Async client for the myenergi cloud API — connection and dispatch layer.
//!
//! The myenergi cloud splits its API across two service families with two
//! unrelated authentication schemes:
//!
//! - the **hub** (device-telemetry) service, reached via HTTP Digest auth on
//!   a per-account server instance that must be discovered through the
//!   public director endpoint and can move at any time;
//! - the **account** service (`myaccount.myenergi.com`), reached via a
//!   bearer token issued by an external identity provider.
//!
//! [`Connection`] owns the credentials and the discovered endpoint and
//! exposes one request strategy per service family. Failures are classified
//! into a small stable taxonomy ([`MyenergiError`]).
//!
//! # Quick Start
//!
//! ```no_run
//! use myenergi::Connection;
//!
//! # async fn example() -> myenergi::Result<()> {
//! let mut conn = Connection::new().with_hub_credentials("12345678", "hub-api-key");
//! let status = conn.device().get("/cgi-jstatus-*").await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod identity;

pub use connection::{AccountApi, Connection, DeviceApi, HubCredentials};
pub use error::{MyenergiError, Result};
pub use identity::IdentityProvider;
