//! Closed-loop feedback trajectory generation
//!
//! Simulates a unicycle (differential drive) robot steered towards the goal
//! position by a proportional law and records the visited positions:
//!
//! * forward speed  `v = K_v * |x_r|`
//! * turning rate   `w = K_w * y_r`
//!
//! where `(x_r, y_r)` is the goal expressed in the robot frame. The forward
//! speed ignores the sign of `x_r`, so a goal straight behind a robot facing
//! away is never reached; the simulation is capped and reports
//! [`ControlError::DidNotConverge`] in that case.
//!
//! P. I. Corke, "Robotics, Vision & Control", Springer 2017, ISBN 978-3-319-54413-7

use log::debug;
use serde::Deserialize;

use crate::common::{
    ControlError, ControlInput, ControlResult, Curve, CurveController, GridPoint, Journey,
    Point2D, Pose2D,
};

/// Configuration for the feedback controller
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Simulation time step [s]
    pub timestep: f64,
    /// Gain from forward error to forward speed
    pub linear_gain: f64,
    /// Gain from lateral error to turning rate
    pub angular_gain: f64,
    /// Distance to the goal under which the simulation stops
    pub goal_radius: f64,
    /// Step cap for the simulation
    pub max_iterations: usize,
    /// Shift of the simulated start along the start heading. The emitted
    /// curve still begins at the true start position.
    pub start_offset: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            timestep: 0.001,
            linear_gain: 1.0,
            angular_gain: 0.02,
            goal_radius: 5.0,
            max_iterations: 100_000,
            start_offset: 0.0,
        }
    }
}

impl FeedbackConfig {
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.timestep > 0.0 && self.timestep.is_finite()) {
            return Err(ControlError::InvalidParameter(format!(
                "feedback timestep must be positive, got {}",
                self.timestep
            )));
        }
        if !(self.goal_radius > 0.0 && self.goal_radius.is_finite()) {
            return Err(ControlError::InvalidParameter(format!(
                "feedback goal_radius must be positive, got {}",
                self.goal_radius
            )));
        }
        if !self.linear_gain.is_finite() || !self.angular_gain.is_finite() {
            return Err(ControlError::InvalidParameter(
                "feedback gains must be finite".to_string(),
            ));
        }
        if !self.start_offset.is_finite() {
            return Err(ControlError::InvalidParameter(
                "feedback start_offset must be finite".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ControlError::InvalidParameter(
                "feedback max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unrounded result of one simulation run
#[derive(Debug, Clone)]
pub struct FeedbackRollout {
    /// Simulated pose after every step (the initial pose is not included)
    pub poses: Vec<Pose2D>,
    /// True if the goal radius was reached
    pub converged: bool,
    /// Number of integration steps taken
    pub iterations: usize,
}

/// Advance a unicycle pose by one explicit Euler step
///
/// Position is integrated with the heading at the start of the step.
pub fn unicycle_step(pose: &Pose2D, input: &ControlInput, dt: f64) -> Pose2D {
    Pose2D {
        x: pose.x + input.v * pose.yaw.cos() * dt,
        y: pose.y + input.v * pose.yaw.sin() * dt,
        yaw: pose.yaw + input.omega * dt,
    }
}

/// Closed-loop controller integrating the feedback law step by step
#[derive(Debug, Clone)]
pub struct FeedbackTrajectoryController {
    config: FeedbackConfig,
}

impl FeedbackTrajectoryController {
    /// Create a controller, rejecting configurations that could not terminate
    pub fn new(config: FeedbackConfig) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: FeedbackConfig::default(),
        }
    }

    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    /// Control law for the current pose
    pub fn control(&self, pose: &Pose2D, goal: Point2D) -> ControlInput {
        let goal_local = pose.to_local(goal);
        ControlInput::new(
            self.config.linear_gain * goal_local.x.abs(),
            self.config.angular_gain * goal_local.y,
        )
    }

    /// Run the simulation without rounding
    pub fn simulate(&self, journey: &Journey) -> FeedbackRollout {
        let goal = journey.goal.position();
        let mut pose = journey.start;
        pose.x += self.config.start_offset * pose.yaw.cos();
        pose.y += self.config.start_offset * pose.yaw.sin();

        let mut poses = Vec::new();
        let mut iterations = 0;

        let converged = loop {
            let distance = pose.position().distance(&goal);
            if distance < self.config.goal_radius {
                break true;
            }
            // a non-finite distance means the state blew up
            if iterations >= self.config.max_iterations || !distance.is_finite() {
                break false;
            }

            let input = self.control(&pose, goal);
            pose = unicycle_step(&pose, &input, self.config.timestep);
            poses.push(pose);
            iterations += 1;
        };

        FeedbackRollout {
            poses,
            converged,
            iterations,
        }
    }
}

impl Default for FeedbackTrajectoryController {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CurveController for FeedbackTrajectoryController {
    fn generate_curve(&self, journey: &Journey) -> ControlResult<Curve> {
        journey.validate()?;

        let rollout = self.simulate(journey);

        let mut curve = Curve::with_capacity(rollout.poses.len() + 1);
        curve.push(GridPoint::from(journey.start.position()));
        for pose in rollout.poses.iter().filter(|p| p.is_finite()) {
            curve.push(GridPoint::from(pose.position()));
        }

        if !rollout.converged {
            debug!(
                "Feedback controller stopped after {} iterations, {:.1} units from goal",
                rollout.iterations,
                rollout
                    .poses
                    .last()
                    .map_or(journey.distance(), |p| p.position().distance(&journey.goal.position()))
            );
            return Err(ControlError::DidNotConverge {
                iterations: rollout.iterations,
                partial: curve,
            });
        }

        debug!(
            "Feedback curve generated with {} points in {} iterations",
            curve.len(),
            rollout.iterations
        );
        Ok(curve)
    }

    fn name(&self) -> &'static str {
        "feedback"
    }
}
