//! Utility modules for journey_control

pub mod logger;
pub mod visualization;

pub use logger::{logger_init, LevelFilter, LoggerInitError};
pub use visualization::{Visualizer, PathStyle, PointStyle, colors, quick_plot_curve};
