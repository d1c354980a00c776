//! Testing utilities.
//!
//! This module provides:
//! - Transports that answer from a script or a URL table instead of the network
//! - Synthetic product page builders

mod fixtures;
mod mocks;

pub use fixtures::{maintenance_page, ProductPage};
pub use mocks::{RequestLog, RoutedTransport, ScriptedTransport};
