//! Schema module - Catalog, configuration and requirement types.

mod catalog;
mod config;

pub use catalog::*;
pub use config::*;
