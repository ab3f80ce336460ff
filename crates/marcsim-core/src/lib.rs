//! marcsim core: MARC record model, field selectors, configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod select;

pub use config::{AppConfig, BatchConfig, EngineConfig, StrategyItem};
pub use error::{CoreError, Result};
pub use models::*;
pub use select::{Selector, select};
