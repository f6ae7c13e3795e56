//! Core types, configuration, and errors shared by the cloudfiles crates.
//!
//! This crate holds the building blocks every other cloudfiles crate leans
//! on: validated container and object names, the large-object manifest
//! flavours, and the client configuration loaded from the environment.

mod config;
mod error;
mod types;

pub use config::ClientConfig;
pub use error::{CoreError, CoreResult};
pub use types::{ContainerName, ManifestKind, ObjectName};
