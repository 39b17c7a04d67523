// Closed-loop trajectory generation module

pub mod feedback_trajectory;

pub use feedback_trajectory::*;
