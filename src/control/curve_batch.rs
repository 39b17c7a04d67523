//! Per-cycle curve generation for every tracked robot
//!
//! The batch generator pairs detected poses with assigned goals, builds one
//! [`Journey`] per pair and runs the active controller on each of them.
//! A failure only affects its own entity.

use std::collections::BTreeMap;

use log::{debug, trace, warn};
use serde::Deserialize;

use crate::common::{ControlError, Curve, CurveController, EntityId, Goal, Journey, Pose2D};

/// Configuration for the batch generator
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Keep the partial curve of a controller that did not converge
    pub keep_partial_curves: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            keep_partial_curves: true,
        }
    }
}

/// Curves produced in one cycle
#[derive(Debug, Default)]
pub struct CurveBatch {
    /// Curves in entity id order
    pub curves: Vec<(EntityId, Curve)>,
    /// Every controller error, including the ones whose partial curve was kept
    pub failures: Vec<(EntityId, ControlError)>,
}

impl CurveBatch {
    /// Curves without their entity ids, as the renderer consumes them
    pub fn curves(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter().map(|(_, curve)| curve)
    }

    pub fn curve_for(&self, id: EntityId) -> Option<&Curve> {
        self.curves.iter().find(|(entity, _)| *entity == id).map(|(_, curve)| curve)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

/// Runs one controller over every entity that has a goal
pub struct CurveBatchGenerator {
    controller: Box<dyn CurveController>,
    config: BatchConfig,
}

impl CurveBatchGenerator {
    pub fn new(controller: Box<dyn CurveController>, config: BatchConfig) -> Self {
        Self { controller, config }
    }

    pub fn controller(&self) -> &dyn CurveController {
        self.controller.as_ref()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Generate the curves for one processing cycle
    ///
    /// Detected entities without a goal are skipped. Goals of entities that
    /// were not detected are ignored.
    pub fn generate(
        &self,
        detections: &BTreeMap<EntityId, Pose2D>,
        goals: &BTreeMap<EntityId, Goal>,
    ) -> CurveBatch {
        let mut batch = CurveBatch::default();

        for (&id, pose) in detections {
            let goal = match goals.get(&id) {
                Some(goal) => goal,
                None => {
                    trace!("Entity {} has no goal this cycle", id);
                    continue;
                }
            };

            let journey = Journey::from_goal(*pose, goal);
            match self.controller.generate_curve(&journey) {
                Ok(curve) => batch.curves.push((id, curve)),
                Err(err) => {
                    warn!("Entity {}: {} controller failed: {}", id, self.controller.name(), err);
                    if self.config.keep_partial_curves {
                        if let Some(partial) = err.partial_curve() {
                            batch.curves.push((id, partial.clone()));
                        }
                    }
                    batch.failures.push((id, err));
                }
            }
        }

        debug!(
            "{} controller produced {} curves ({} failures) for {} detections",
            self.controller.name(),
            batch.curves.len(),
            batch.failures.len(),
            detections.len()
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ControlResult, GridPoint};
    use crate::path_tracking::{FeedbackConfig, FeedbackTrajectoryController};
    use std::sync::Mutex;

    /// Records every journey it is asked about
    struct RecordingController {
        seen: Mutex<Vec<Journey>>,
    }

    impl RecordingController {
        fn new() -> Self {
            Self { seen: Mutex::new(Vec::new()) }
        }
    }

    impl CurveController for RecordingController {
        fn generate_curve(&self, journey: &Journey) -> ControlResult<Curve> {
            self.seen.lock().unwrap().push(*journey);
            Ok(Curve::from_points(vec![
                GridPoint::from(journey.start.position()),
                GridPoint::from(journey.goal.position()),
            ]))
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    /// Shares a recorder with the generator so the test can inspect it
    struct SharedRecorder(std::sync::Arc<RecordingController>);

    impl CurveController for SharedRecorder {
        fn generate_curve(&self, journey: &Journey) -> ControlResult<Curve> {
            self.0.generate_curve(journey)
        }

        fn name(&self) -> &'static str {
            self.0.name()
        }
    }

    #[test]
    fn test_entities_without_goal_are_skipped() {
        let recorder = std::sync::Arc::new(RecordingController::new());
        let generator = CurveBatchGenerator::new(
            Box::new(SharedRecorder(recorder.clone())),
            BatchConfig::default(),
        );

        let mut detections = BTreeMap::new();
        detections.insert(1, Pose2D::new(0.0, 0.0, 0.0));
        detections.insert(2, Pose2D::new(50.0, 50.0, 1.0));
        detections.insert(3, Pose2D::new(100.0, 0.0, 0.0));

        let mut goals = BTreeMap::new();
        goals.insert(1, Goal::at(10.0, 0.0));
        goals.insert(3, Goal::with_yaw(200.0, 0.0, 0.5));
        // never detected
        goals.insert(9, Goal::at(0.0, 0.0));

        let batch = generator.generate(&detections, &goals);
        assert_eq!(batch.len(), 2);
        assert!(batch.curve_for(2).is_none());
        assert!(batch.curve_for(9).is_none());
        assert!(batch.failures.is_empty());

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        // missing goal heading falls back to the start heading
        assert_eq!(seen[0].goal.yaw, 0.0);
        assert_eq!(seen[1].goal.yaw, 0.5);
        assert_eq!(batch.curves().count(), 2);
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let controller = FeedbackTrajectoryController::new(FeedbackConfig {
            max_iterations: 200,
            ..Default::default()
        })
        .unwrap();
        let generator = CurveBatchGenerator::new(Box::new(controller), BatchConfig::default());

        let mut detections = BTreeMap::new();
        detections.insert(1, Pose2D::new(0.0, 0.0, 0.0));
        detections.insert(2, Pose2D::new(f64::NAN, 0.0, 0.0));
        detections.insert(3, Pose2D::new(0.0, 0.0, 0.0));

        let mut goals = BTreeMap::new();
        // behind and facing away: never converges
        goals.insert(1, Goal::at(-100.0, 0.0));
        goals.insert(2, Goal::at(10.0, 0.0));
        goals.insert(3, Goal::at(2.0, 0.0));

        let batch = generator.generate(&detections, &goals);
        assert_eq!(batch.failures.len(), 2);
        assert!(matches!(batch.failures[0], (1, ControlError::DidNotConverge { .. })));
        assert!(matches!(batch.failures[1], (2, ControlError::InvalidJourney(_))));

        // partial curve kept, invalid entity dropped
        assert_eq!(batch.curve_for(1).map(|c| c.len()), Some(201));
        assert!(batch.curve_for(2).is_none());
        assert_eq!(batch.curve_for(3).map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_partial_curves_can_be_dropped() {
        let controller = FeedbackTrajectoryController::new(FeedbackConfig {
            max_iterations: 50,
            ..Default::default()
        })
        .unwrap();
        let generator = CurveBatchGenerator::new(
            Box::new(controller),
            BatchConfig {
                keep_partial_curves: false,
            },
        );

        let mut detections = BTreeMap::new();
        detections.insert(4, Pose2D::new(0.0, 0.0, 0.0));
        let mut goals = BTreeMap::new();
        goals.insert(4, Goal::at(-100.0, 0.0));

        let batch = generator.generate(&detections, &goals);
        assert!(batch.is_empty());
        assert_eq!(batch.failures.len(), 1);
    }
}
