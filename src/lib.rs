pub mod actions;
pub mod assets;
pub mod config;
pub mod error;
pub mod generator;
pub mod graph;
pub mod portfolio;
pub mod runtime;

pub use error::{FlowError, Result};
