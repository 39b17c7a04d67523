//! journey_control - curve generation for tracked robots
//!
//! Each robot seen by the tracker has a current pose and, optionally, a goal.
//! This crate turns such a start/goal [`Journey`] into the [`Curve`] of
//! integer screen points the robot should drive along.
//!
//! Two interchangeable strategies implement [`CurveController`]:
//!
//! - [`FeedbackTrajectoryController`] simulates a unicycle driven by a
//!   proportional law until it reaches the goal radius.
//! - [`GeometricPathController`] picks the shortest Dubins path between the
//!   two poses and samples it by arclength.
//!
//! [`CurveBatchGenerator`] applies the active strategy to every robot that
//! has a goal.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Algorithm modules
pub mod path_planning;
pub mod path_tracking;
pub mod control;

// Re-export common types for convenience
pub use common::{Point2D, Pose2D, Goal, Journey, Curve, GridPoint, EntityId};
pub use common::CurveController;
pub use common::{ControlError, ControlResult};
pub use control::{CurveBatch, CurveBatchGenerator, ControllerKind, build_controller, build_batch_generator};
pub use path_planning::GeometricPathController;
pub use path_tracking::FeedbackTrajectoryController;
pub use config::JourneyControlConfig;
