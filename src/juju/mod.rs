//! Juju CLI backend
//!
//! Drives the `juju` command line to place charms into models. Authentication
//! is whatever the local Juju client is already logged into.

mod client;
mod types;

pub use client::{JujuClient, JUJU_INTERFACE_VERSION};
