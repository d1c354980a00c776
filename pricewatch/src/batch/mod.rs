//! Batch price checks.
//!
//! This module provides:
//! - [`PriceAlert`], [`PriceReport`] and [`BatchSummary`]
//! - The [`PriceSink`] trait with logging and collecting sinks
//! - [`DomainPacer`] for per-site request spacing
//! - [`BatchRunner`], which checks many alerts concurrently

mod models;
mod pacer;
mod runner;
mod sink;

pub use models::{BatchSummary, PriceAlert, PriceReport};
pub use pacer::DomainPacer;
pub use runner::BatchRunner;
pub use sink::{CollectingPriceSink, LoggingPriceSink, PriceSink};
