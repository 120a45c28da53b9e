//! Pipeline module - loading, preparation and analysis steps

pub mod correlation;
pub mod cutoff;
pub mod error;
pub mod loader;
pub mod prepare;
pub mod stats;

pub use correlation::*;
pub use cutoff::*;
pub use error::PrepareError;
pub use loader::*;
pub use prepare::*;
pub use stats::*;
