//! Report module - charts, text artifacts and terminal summaries

pub mod charts;
pub mod cutoff_file;
pub mod eda_export;
pub mod summary;

pub use charts::*;
pub use cutoff_file::*;
pub use eda_export::*;
pub use summary::*;
