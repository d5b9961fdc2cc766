//! # metal-core
//!
//! Core types and utilities for talking to the out-of-band management agent
//! of a bare-metal machine.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy shared by every management operation
//! - [`client`] - Per-instance HTTP client configuration
//! - [`config`] - Deserializable management API configuration
//! - [`types`] - Wire models returned by the management agent

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::PowerStatus;
