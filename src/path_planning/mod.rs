// Geometric path planning module

pub mod dubins_path;

pub use dubins_path::*;
