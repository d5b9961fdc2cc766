//! Management API client for bare-metal machines.
//!
//! Provides an asynchronous client for the out-of-band management agent that
//! powers machines on and off and arranges PXE boots, plus the
//! [`PowerManager`] abstraction orchestrators program against.

#![cfg_attr(not(test), deny(missing_docs))]

pub mod client;
pub mod manager;

pub use client::{ManagementClient, ManagementClientBuilder};
pub use manager::{boot_from_network, PowerManager};
pub use metal_core::{Error, PowerStatus};

/// Convenient result alias that reuses the shared management error type.
pub type Result<T> = metal_core::Result<T>;
