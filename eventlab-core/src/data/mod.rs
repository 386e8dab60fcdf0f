//! Data sources and multi-symbol alignment.

pub mod align;
pub mod source;

pub use align::{pad_forward, AlignedData};
pub use source::{DataError, DataSource, HistoricalSource};
