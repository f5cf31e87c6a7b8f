//! # radsnap
//!
//! **Drive a running RAD Studio IDE from Rust through its DataSnap REST server.**
//!
//! The IDE side runs a DataSnap server exposing expert methods (package
//! manager, main menu, environment). This crate turns a method name and its
//! positional arguments into a request URL, sends it with optional basic
//! authentication, and repairs the server's doubly-quoted JSON reply into a
//! plain [`serde_json::Value`].
//!
//! ## Quickstart (async)
//!
//! ```no_run
//! use radsnap::{ConnectionConfig, Packages, RadClient};
//!
//! # async fn run() -> Result<(), radsnap::RadError> {
//! let config = ConnectionConfig::new("localhost", 5555, "datasnap/rest/TServerClass")
//!     .with_credentials("dsclient", "Ds_1234");
//! let client = RadClient::builder()
//!     .config(config)
//!     .check_connection("CheckConnection")
//!     .connect()
//!     .await?;
//!
//! let packages = Packages::new(&client);
//! println!("{} packages", packages.count().await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Quickstart (blocking)
//!
//! ```no_run
//! # #[cfg(feature = "blocking")]
//! # fn run() -> Result<(), radsnap::RadError> {
//! use radsnap::RadClientBlocking;
//! // program arguments: hostname port URL [login password]
//! let client = RadClientBlocking::connect()?;
//! for package in client.packages_iter() {
//!     let package = package?;
//!     println!("{}", package.name().unwrap_or("-"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Architecture layers:
//! - config
//! - transport
//! - envelope
//! - client
//! - IDE proxies

/// High-level async client.
pub mod client;
/// Request descriptions: method name, positional arguments, verb.
pub mod commands;
/// Connection settings and their sources.
pub mod config;
/// Response repair and payload extraction.
///
/// Public for debugging replies captured from a server; most users should go
/// through [`crate::client::RadClient`].
pub mod envelope;
/// Error types returned by this crate.
pub mod error;
/// Typed proxies for the IDE experts.
pub mod ide;
/// Records decoded from known reply shapes.
pub mod model;
mod transport;

#[cfg(feature = "blocking")]
/// Blocking wrapper over the async client.
pub mod blocking;

#[cfg(feature = "blocking")]
pub use crate::blocking::{BlockingPackageIter, RadClientBlocking, RadClientBlockingBuilder};
pub use crate::client::{ClientBuilder, RadClient, DEFAULT_CHECK_CONNECTION_METHOD};
pub use crate::commands::{HttpVerb, RemoteArg, RequestSpec};
pub use crate::config::{ConnectionConfig, Credentials};
pub use crate::envelope::render_result;
pub use crate::error::RadError;
pub use crate::ide::{Common, MainMenu, Package, PackageIter, Packages, DEFAULT_MENU_DELIMITER};
pub use crate::model::environment::IdeEnvironment;
pub use crate::model::package::{PackageInfo, PackageRef};
