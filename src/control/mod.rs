// Controller orchestration module

pub mod curve_batch;
pub mod selection;

pub use curve_batch::*;
pub use selection::*;
