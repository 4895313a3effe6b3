pub mod config;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod raster;
pub mod server;

pub use error::{Error, Result};
