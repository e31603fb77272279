//! Harvest metadata from HAPI servers, reconcile it with what is known
//! locally, and publish JSON/CSV/HTML artifacts.

pub mod availability;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod servers;
pub mod spase;
pub mod store;

pub type Result<T> = anyhow::Result<T>;
