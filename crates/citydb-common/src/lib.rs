//! citydb common library
//!
//! Functionality shared by the citydb workspace members. Currently this is
//! the tracing setup used by every binary.
//!
//! # Example
//!
//! ```no_run
//! use citydb_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::default().apply_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod logging;

pub use logging::{init_logging, LogConfig, LogGuard};
