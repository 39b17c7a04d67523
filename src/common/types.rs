//! Common types used throughout journey_control

use itertools::Itertools;
use nalgebra::{Rotation2, Vector2};

use crate::common::error::{ControlError, ControlResult};

/// Identifier of a tracked robot (the id of its fiducial marker)
pub type EntityId = u32;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + heading)
///
/// `yaw` is the heading in radians, measured from the +x axis of the output
/// frame. It is never normalized by the controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.yaw.is_finite()
    }

    /// Express a world-frame point in this pose's own frame
    pub fn to_local(&self, point: Point2D) -> Point2D {
        let offset = point.to_vector() - self.position().to_vector();
        Point2D::from(Rotation2::new(-self.yaw) * offset)
    }

    /// Inverse of [`Pose2D::to_local`]
    pub fn to_world(&self, point: Point2D) -> Point2D {
        let rotated = Rotation2::new(self.yaw) * point.to_vector();
        Point2D::from(rotated + self.position().to_vector())
    }
}

/// Control input for differential drive robot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pub v: f64,      // linear velocity
    pub omega: f64,  // angular velocity
}

impl ControlInput {
    pub fn new(v: f64, omega: f64) -> Self {
        Self { v, omega }
    }
}

/// Goal handed out by the goal-assignment layer for one entity
///
/// The heading is optional: when it is missing the journey reuses the start
/// heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub position: Point2D,
    pub yaw: Option<f64>,
}

impl Goal {
    pub fn new(position: Point2D, yaw: Option<f64>) -> Self {
        Self { position, yaw }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self::new(Point2D::new(x, y), None)
    }

    pub fn with_yaw(x: f64, y: f64, yaw: f64) -> Self {
        Self::new(Point2D::new(x, y), Some(yaw))
    }
}

/// One robot's commanded motion for a single planning cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Journey {
    pub start: Pose2D,
    pub goal: Pose2D,
}

impl Journey {
    pub fn new(start: Pose2D, goal: Pose2D) -> Self {
        Self { start, goal }
    }

    /// Build a journey from a detected pose and an assigned goal
    pub fn from_goal(start: Pose2D, goal: &Goal) -> Self {
        let yaw = goal.yaw.unwrap_or(start.yaw);
        Self::new(start, Pose2D::new(goal.position.x, goal.position.y, yaw))
    }

    /// Straight-line distance between start and goal positions
    pub fn distance(&self) -> f64 {
        self.start.position().distance(&self.goal.position())
    }

    /// Reject journeys with non-finite coordinates or headings
    pub fn validate(&self) -> ControlResult<()> {
        if !self.start.is_finite() {
            return Err(ControlError::InvalidJourney(format!(
                "non-finite start pose {:?}",
                self.start
            )));
        }
        if !self.goal.is_finite() {
            return Err(ControlError::InvalidJourney(format!(
                "non-finite goal pose {:?}",
                self.goal
            )));
        }
        Ok(())
    }
}

/// Point on the integer rendering grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a continuous position onto the grid
    pub fn from_rounded(x: f64, y: f64) -> Self {
        Self::new(x.round() as i32, y.round() as i32)
    }

    pub fn to_point(&self) -> Point2D {
        Point2D::new(self.x as f64, self.y as f64)
    }
}

impl From<Point2D> for GridPoint {
    fn from(p: Point2D) -> Self {
        Self::from_rounded(p.x, p.y)
    }
}

/// Ordered sequence of grid points a robot should traverse
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Curve {
    points: Vec<GridPoint>,
}

impl Curve {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { points: Vec::with_capacity(capacity) }
    }

    pub fn from_points(points: Vec<GridPoint>) -> Self {
        Self { points }
    }

    /// Round paired coordinates onto the grid, stopping at the shorter slice
    pub(crate) fn from_xy(x: &[f64], y: &[f64]) -> Self {
        let points = x.iter().zip(y.iter())
            .map(|(&x, &y)| GridPoint::from_rounded(x, y))
            .collect();
        Self { points }
    }

    pub(crate) fn push(&mut self, point: GridPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<GridPoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<GridPoint> {
        self.points.last().copied()
    }

    pub fn x_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x as f64).collect()
    }

    pub fn y_coords(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y as f64).collect()
    }

    pub fn total_length(&self) -> f64 {
        self.points.iter()
            .tuple_windows()
            .map(|(a, b)| a.to_point().distance(&b.to_point()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_pose2d_local_world_roundtrip() {
        let pose = Pose2D::new(10.0, -5.0, FRAC_PI_2);
        let local = pose.to_local(Point2D::new(10.0, 5.0));
        // 10 units "up" is straight ahead when facing +y
        assert!((local.x - 10.0).abs() < 1e-10);
        assert!(local.y.abs() < 1e-10);

        let world = pose.to_world(local);
        assert!((world.x - 10.0).abs() < 1e-10);
        assert!((world.y - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_journey_from_goal_defaults_heading() {
        let start = Pose2D::new(1.0, 2.0, 0.7);
        let journey = Journey::from_goal(start, &Goal::at(5.0, 5.0));
        assert_eq!(journey.goal.yaw, 0.7);

        let journey = Journey::from_goal(start, &Goal::with_yaw(5.0, 5.0, -1.0));
        assert_eq!(journey.goal.yaw, -1.0);
    }

    #[test]
    fn test_journey_validate_rejects_nan() {
        let ok = Journey::new(Pose2D::origin(), Pose2D::new(1.0, 1.0, 0.0));
        assert!(ok.validate().is_ok());

        let bad = Journey::new(Pose2D::new(f64::NAN, 0.0, 0.0), Pose2D::origin());
        assert!(matches!(bad.validate(), Err(ControlError::InvalidJourney(_))));

        let bad = Journey::new(Pose2D::origin(), Pose2D::new(0.0, 0.0, f64::INFINITY));
        assert!(matches!(bad.validate(), Err(ControlError::InvalidJourney(_))));
    }

    #[test]
    fn test_grid_point_rounding() {
        assert_eq!(GridPoint::from_rounded(1.4, -1.6), GridPoint::new(1, -2));
        assert_eq!(GridPoint::from_rounded(2.5, -2.5), GridPoint::new(3, -3));
    }

    #[test]
    fn test_curve_total_length() {
        let curve = Curve::from_xy(&[0.0, 1.0, 1.0], &[0.0, 0.0, 1.0]);
        assert!((curve.total_length() - 2.0).abs() < 1e-10);
        assert_eq!(curve.first(), Some(GridPoint::new(0, 0)));
        assert_eq!(curve.last(), Some(GridPoint::new(1, 1)));
    }

    #[test]
    fn test_curve_from_uneven_slices() {
        let curve = Curve::from_xy(&[0.0, 1.0, 2.0], &[0.0, 1.0]);
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.last(), Some(GridPoint::new(1, 1)));
    }
}
