// Dubins Path Planner
//
// Author: Atsushi Sakai(@Atsushi_twi)
//         Rust implementation
//
// Shortest forward-only path between two oriented poses for a vehicle with a
// minimum turning radius. Every candidate is made of three segments drawn
// from {left turn, right turn, straight}.
//
// L. E. Dubins, "On Curves of Minimal Length with a Constraint on Average
// Curvature", American Journal of Mathematics, 1957.

use std::f64::consts::PI;
use std::fmt;

use itertools::Itertools;
use log::{debug, error};
use ordered_float::OrderedFloat;
use serde::Deserialize;

use crate::common::{
    ControlError, ControlResult, Curve, CurveController, GridPoint, Journey, Point2D, Pose2D,
};

/// Heading difference under which a near-coincident goal needs no manoeuvre
const HEADING_TOLERANCE: f64 = 1e-6;

/// Segment kind of a path primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentType {
    LeftTurn,
    RightTurn,
    Straight,
    /// Placeholder for a leg of zero length
    NoMotion,
}

impl SegmentType {
    pub fn as_char(&self) -> char {
        match self {
            SegmentType::LeftTurn => 'L',
            SegmentType::RightTurn => 'R',
            SegmentType::Straight => 'S',
            SegmentType::NoMotion => '-',
        }
    }

    fn mirrored(&self) -> SegmentType {
        match self {
            SegmentType::LeftTurn => SegmentType::RightTurn,
            SegmentType::RightTurn => SegmentType::LeftTurn,
            other => *other,
        }
    }
}

/// Ordered triple of segment types naming a path family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathPrimitiveMode(pub [SegmentType; 3]);

impl PathPrimitiveMode {
    pub const LSL: Self = Self([SegmentType::LeftTurn, SegmentType::Straight, SegmentType::LeftTurn]);
    pub const RSR: Self = Self([SegmentType::RightTurn, SegmentType::Straight, SegmentType::RightTurn]);
    pub const LSR: Self = Self([SegmentType::LeftTurn, SegmentType::Straight, SegmentType::RightTurn]);
    pub const RSL: Self = Self([SegmentType::RightTurn, SegmentType::Straight, SegmentType::LeftTurn]);
    pub const RLR: Self = Self([SegmentType::RightTurn, SegmentType::LeftTurn, SegmentType::RightTurn]);
    pub const LRL: Self = Self([SegmentType::LeftTurn, SegmentType::RightTurn, SegmentType::LeftTurn]);

    pub fn segments(&self) -> &[SegmentType; 3] {
        &self.0
    }

    /// Same family with left and right swapped
    pub fn mirrored(&self) -> Self {
        Self([self.0[0].mirrored(), self.0[1].mirrored(), self.0[2].mirrored()])
    }
}

impl fmt::Display for PathPrimitiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.0.iter() {
            write!(f, "{}", segment.as_char())?;
        }
        Ok(())
    }
}

/// Goal heading used for planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalHeading {
    /// Arrive with the start heading, whatever the journey asks for
    StartHeading,
    /// Arrive with the journey's goal heading
    Journey,
    /// Arrive facing along the start-to-goal line
    FaceGoal,
}

impl GoalHeading {
    pub fn resolve(&self, journey: &Journey) -> f64 {
        match self {
            GoalHeading::StartHeading => journey.start.yaw,
            GoalHeading::Journey => journey.goal.yaw,
            GoalHeading::FaceGoal => {
                let dy = journey.goal.y - journey.start.y;
                let dx = journey.goal.x - journey.start.x;
                if dx == 0.0 && dy == 0.0 {
                    journey.start.yaw
                } else {
                    dy.atan2(dx)
                }
            }
        }
    }
}

impl Default for GoalHeading {
    fn default() -> Self {
        GoalHeading::StartHeading
    }
}

/// Configuration for the geometric planner
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometricConfig {
    /// Minimum turning radius
    pub turning_radius: f64,
    /// Arclength between emitted samples
    pub sample_step: f64,
    /// Which heading the path must arrive with
    pub goal_heading: GoalHeading,
    /// Paths needing more samples than this are rejected
    pub max_samples: usize,
}

impl Default for GeometricConfig {
    fn default() -> Self {
        Self {
            turning_radius: 50.0,
            sample_step: 1.0,
            goal_heading: GoalHeading::StartHeading,
            max_samples: 100_000,
        }
    }
}

impl GeometricConfig {
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.turning_radius > 0.0 && self.turning_radius.is_finite()) {
            return Err(ControlError::InvalidParameter(format!(
                "geometric turning_radius must be positive, got {}",
                self.turning_radius
            )));
        }
        if !(self.sample_step > 0.0 && self.sample_step.is_finite()) {
            return Err(ControlError::InvalidParameter(format!(
                "geometric sample_step must be positive, got {}",
                self.sample_step
            )));
        }
        if self.max_samples < 2 {
            return Err(ControlError::InvalidParameter(format!(
                "geometric max_samples must be at least 2, got {}",
                self.max_samples
            )));
        }
        Ok(())
    }
}

/// Closed-form solution of one family, lengths at unit turning radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilySolution {
    pub mode: PathPrimitiveMode,
    pub lengths: [f64; 3],
}

impl FamilySolution {
    pub fn cost(&self) -> f64 {
        self.lengths.iter().sum()
    }

    fn is_feasible(&self) -> bool {
        self.lengths.iter().all(|l| l.is_finite() && *l >= 0.0)
    }
}

/// Sampled path in the world frame
#[derive(Debug, Clone)]
pub struct DubinsPath {
    pub mode: PathPrimitiveMode,
    /// Segment lengths in distance units
    pub lengths: [f64; 3],
    /// Total length in distance units
    pub length: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yaw: Vec<f64>,
}

impl DubinsPath {
    /// Mode with legs shorter than `tolerance` reported as `NoMotion`
    pub fn effective_mode(&self, tolerance: f64) -> PathPrimitiveMode {
        let mut segments = self.mode.0;
        for (segment, length) in segments.iter_mut().zip(self.lengths.iter()) {
            if *length < tolerance {
                *segment = SegmentType::NoMotion;
            }
        }
        PathPrimitiveMode(segments)
    }

    /// Polyline length of the samples
    pub fn sampled_length(&self) -> f64 {
        self.x.iter()
            .zip(self.y.iter())
            .tuple_windows()
            .map(|((x0, y0), (x1, y1))| (x1 - x0).hypot(y1 - y0))
            .sum()
    }

    pub fn to_curve(&self) -> Curve {
        Curve::from_xy(&self.x, &self.y)
    }
}

/// Wrap an angle into [-pi, pi)
fn pi_2_pi(x: f64) -> f64 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

fn mod2pi(x: f64) -> f64 {
    x.rem_euclid(2.0 * PI)
}

struct TrigTerms {
    sin_a: f64,
    sin_b: f64,
    cos_a: f64,
    cos_b: f64,
    cos_ab: f64,
}

impl TrigTerms {
    fn new(alpha: f64, beta: f64) -> Self {
        Self {
            sin_a: alpha.sin(),
            sin_b: beta.sin(),
            cos_a: alpha.cos(),
            cos_b: beta.cos(),
            cos_ab: (alpha - beta).cos(),
        }
    }
}

fn left_straight_left(alpha: f64, beta: f64, d: f64) -> Option<[f64; 3]> {
    let t = TrigTerms::new(alpha, beta);
    let p_squared = 2.0 + d * d - 2.0 * t.cos_ab + 2.0 * d * (t.sin_a - t.sin_b);
    if p_squared < 0.0 {
        return None;
    }
    let tmp = (t.cos_b - t.cos_a).atan2(d + t.sin_a - t.sin_b);
    Some([mod2pi(-alpha + tmp), p_squared.sqrt(), mod2pi(beta - tmp)])
}

fn right_straight_right(alpha: f64, beta: f64, d: f64) -> Option<[f64; 3]> {
    let t = TrigTerms::new(alpha, beta);
    let p_squared = 2.0 + d * d - 2.0 * t.cos_ab + 2.0 * d * (t.sin_b - t.sin_a);
    if p_squared < 0.0 {
        return None;
    }
    let tmp = (t.cos_a - t.cos_b).atan2(d - t.sin_a + t.sin_b);
    Some([mod2pi(alpha - tmp), p_squared.sqrt(), mod2pi(-beta + tmp)])
}

fn left_straight_right(alpha: f64, beta: f64, d: f64) -> Option<[f64; 3]> {
    let t = TrigTerms::new(alpha, beta);
    let p_squared = -2.0 + d * d + 2.0 * t.cos_ab + 2.0 * d * (t.sin_a + t.sin_b);
    if p_squared < 0.0 {
        return None;
    }
    let p = p_squared.sqrt();
    let tmp = (-t.cos_a - t.cos_b).atan2(d + t.sin_a + t.sin_b) - (-2.0_f64).atan2(p);
    Some([mod2pi(-alpha + tmp), p, mod2pi(-mod2pi(beta) + tmp)])
}

fn right_straight_left(alpha: f64, beta: f64, d: f64) -> Option<[f64; 3]> {
    let t = TrigTerms::new(alpha, beta);
    let p_squared = d * d - 2.0 + 2.0 * t.cos_ab - 2.0 * d * (t.sin_a + t.sin_b);
    if p_squared < 0.0 {
        return None;
    }
    let p = p_squared.sqrt();
    let tmp = (t.cos_a + t.cos_b).atan2(d - t.sin_a - t.sin_b) - (2.0_f64).atan2(p);
    Some([mod2pi(alpha - tmp), p, mod2pi(beta - tmp)])
}

fn right_left_right(alpha: f64, beta: f64, d: f64) -> Option<[f64; 3]> {
    let t = TrigTerms::new(alpha, beta);
    let tmp = (6.0 - d * d + 2.0 * t.cos_ab + 2.0 * d * (t.sin_a - t.sin_b)) / 8.0;
    if tmp.abs() > 1.0 {
        return None;
    }
    let middle = mod2pi(2.0 * PI - tmp.acos());
    let first = mod2pi(alpha - (t.cos_a - t.cos_b).atan2(d - t.sin_a + t.sin_b) + middle / 2.0);
    Some([first, middle, mod2pi(alpha - beta - first + middle)])
}

fn left_right_left(alpha: f64, beta: f64, d: f64) -> Option<[f64; 3]> {
    let t = TrigTerms::new(alpha, beta);
    let tmp = (6.0 - d * d + 2.0 * t.cos_ab + 2.0 * d * (t.sin_b - t.sin_a)) / 8.0;
    if tmp.abs() > 1.0 {
        return None;
    }
    let middle = mod2pi(2.0 * PI - tmp.acos());
    let first = mod2pi(-alpha - (t.cos_a - t.cos_b).atan2(d + t.sin_a - t.sin_b) + middle / 2.0);
    Some([first, middle, mod2pi(mod2pi(beta) - alpha - first + middle)])
}

type FamilySolver = fn(f64, f64, f64) -> Option<[f64; 3]>;

/// Families in enumeration order; ties go to the earlier entry
const FAMILIES: [(PathPrimitiveMode, FamilySolver); 6] = [
    (PathPrimitiveMode::LSL, left_straight_left),
    (PathPrimitiveMode::RSR, right_straight_right),
    (PathPrimitiveMode::LSR, left_straight_right),
    (PathPrimitiveMode::RSL, right_straight_left),
    (PathPrimitiveMode::RLR, right_left_right),
    (PathPrimitiveMode::LRL, left_right_left),
];

/// Pose reached after travelling `dist` along one unit-radius segment
fn interpolate(dist: f64, segment: SegmentType, origin: &Pose2D) -> Pose2D {
    let (ldx, ldy, dyaw) = match segment {
        SegmentType::Straight => (dist, 0.0, 0.0),
        SegmentType::LeftTurn => (dist.sin(), 1.0 - dist.cos(), dist),
        SegmentType::RightTurn => (dist.sin(), -(1.0 - dist.cos()), -dist),
        SegmentType::NoMotion => (0.0, 0.0, 0.0),
    };
    let offset = origin.to_world(Point2D::new(ldx, ldy));
    Pose2D::new(offset.x, offset.y, origin.yaw + dyaw)
}

/// Sample the path at unit radius, starting from the origin facing +x
fn generate_local_course(solution: &FamilySolution, step_size: f64) -> Vec<Pose2D> {
    let mut poses = vec![Pose2D::origin()];

    for (&segment, &length) in solution.mode.segments().iter().zip(solution.lengths.iter()) {
        if length <= 0.0 {
            continue;
        }
        let origin = poses[poses.len() - 1];
        let mut current = step_size;
        while current + step_size <= length {
            poses.push(interpolate(current, segment, &origin));
            current += step_size;
        }
        poses.push(interpolate(length, segment, &origin));
    }

    poses
}

/// Open-loop planner emitting the shortest Dubins path
#[derive(Debug, Clone)]
pub struct GeometricPathController {
    config: GeometricConfig,
}

impl GeometricPathController {
    /// Create a planner, rejecting configurations that could not terminate
    pub fn new(config: GeometricConfig) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: GeometricConfig::default(),
        }
    }

    pub fn config(&self) -> &GeometricConfig {
        &self.config
    }

    /// Solve every family for the journey, keeping only feasible ones
    ///
    /// Lengths are at unit turning radius; results are in enumeration order.
    pub fn solve_families(&self, journey: &Journey) -> ControlResult<Vec<FamilySolution>> {
        journey.validate()?;

        let radius = self.config.turning_radius;
        let goal_yaw = self.config.goal_heading.resolve(journey);
        let local = journey.start.to_local(journey.goal.position());
        let (x, y) = (local.x / radius, local.y / radius);

        let d = x.hypot(y);
        let theta = mod2pi(y.atan2(x));
        let alpha = mod2pi(-theta);
        let beta = mod2pi(goal_yaw - journey.start.yaw - theta);

        let solutions = FAMILIES
            .iter()
            .filter_map(|(mode, solve)| {
                solve(alpha, beta, d).map(|lengths| FamilySolution { mode: *mode, lengths })
            })
            .filter(FamilySolution::is_feasible)
            .collect();
        Ok(solutions)
    }

    /// Plan the shortest path
    ///
    /// A goal within one grid unit (or one sample step) of the start that
    /// needs no heading change gives a path of at most two points instead of
    /// a full loop.
    pub fn plan(&self, journey: &Journey) -> ControlResult<DubinsPath> {
        journey.validate()?;
        if let Some(path) = self.hop_path(journey) {
            debug!("Goal within {:.2} of the start, no manoeuvre needed", path.length);
            return Ok(path);
        }

        let solutions = self.solve_families(journey)?;
        let best = solutions
            .iter()
            .min_by_key(|s| OrderedFloat(s.cost()))
            .ok_or_else(|| {
                let msg = format!("no family solves {:?} -> {:?}", journey.start, journey.goal);
                error!("Geometric planner: {}", msg);
                ControlError::NoFeasiblePath(msg)
            })?;

        let path = self.build_path(&journey.start, best)?;
        if !path.x.iter().chain(path.y.iter()).all(|v| v.is_finite()) {
            let msg = format!("{} path sampled to non-finite points", best.mode);
            error!("Geometric planner: {}", msg);
            return Err(ControlError::NoFeasiblePath(msg));
        }

        debug!(
            "Dubins {} path of length {:.1} with {} samples",
            path.mode,
            path.length,
            path.x.len()
        );
        Ok(path)
    }

    /// Reconstruct every feasible family, mainly for inspection
    pub fn plan_all(&self, journey: &Journey) -> ControlResult<Vec<DubinsPath>> {
        let solutions = self.solve_families(journey)?;
        solutions
            .iter()
            .map(|s| self.build_path(&journey.start, s))
            .collect()
    }

    /// Straight hop for a goal too close to the start to manoeuvre
    fn hop_path(&self, journey: &Journey) -> Option<DubinsPath> {
        let distance = journey.distance();
        if distance > self.config.sample_step.max(1.0) {
            return None;
        }
        // facing a goal under a unit away is meaningless, keep the start heading
        let heading_error = match self.config.goal_heading {
            GoalHeading::FaceGoal => 0.0,
            policy => pi_2_pi(policy.resolve(journey) - journey.start.yaw),
        };
        if heading_error.abs() > HEADING_TOLERANCE {
            return None;
        }

        let start = journey.start;
        let goal = journey.goal;
        let mut x = vec![start.x];
        let mut y = vec![start.y];
        if GridPoint::from(goal.position()) != GridPoint::from(start.position()) {
            x.push(goal.x);
            y.push(goal.y);
        }
        let yaw = vec![pi_2_pi(start.yaw); x.len()];

        Some(DubinsPath {
            mode: PathPrimitiveMode([SegmentType::NoMotion, SegmentType::Straight, SegmentType::NoMotion]),
            lengths: [0.0, distance, 0.0],
            length: distance,
            x,
            y,
            yaw,
        })
    }

    fn build_path(&self, start: &Pose2D, solution: &FamilySolution) -> ControlResult<DubinsPath> {
        let radius = self.config.turning_radius;
        let step_size = self.config.sample_step / radius;
        let samples = solution.cost() / step_size;
        // also rejects a step that underflowed to zero
        if !(samples <= self.config.max_samples as f64) {
            let msg = format!(
                "{} path of length {:.3e} needs more than {} samples",
                solution.mode,
                solution.cost() * radius,
                self.config.max_samples
            );
            error!("Geometric planner: {}", msg);
            return Err(ControlError::NoFeasiblePath(msg));
        }
        let local = generate_local_course(solution, step_size);

        let mut x = Vec::with_capacity(local.len());
        let mut y = Vec::with_capacity(local.len());
        let mut yaw = Vec::with_capacity(local.len());
        for pose in &local {
            let world = start.to_world(Point2D::new(pose.x * radius, pose.y * radius));
            x.push(world.x);
            y.push(world.y);
            yaw.push(pi_2_pi(pose.yaw + start.yaw));
        }

        let lengths = [
            solution.lengths[0] * radius,
            solution.lengths[1] * radius,
            solution.lengths[2] * radius,
        ];
        Ok(DubinsPath {
            mode: solution.mode,
            lengths,
            length: solution.cost() * radius,
            x,
            y,
            yaw,
        })
    }
}

impl Default for GeometricPathController {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CurveController for GeometricPathController {
    fn generate_curve(&self, journey: &Journey) -> ControlResult<Curve> {
        self.plan(journey).map(|path| path.to_curve())
    }

    fn name(&self) -> &'static str {
        "geometric"
    }
}
