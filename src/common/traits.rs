//! Common traits defining the controller interface

use crate::common::error::ControlResult;
use crate::common::types::{Curve, Journey};

/// Trait for curve-generating controllers
///
/// Implementations turn a single [`Journey`] into the [`Curve`] the robot
/// should follow. They must not keep state between calls: the same journey
/// always yields the same curve.
pub trait CurveController: Send + Sync {
    /// Generate the curve from `journey.start` towards `journey.goal`
    ///
    /// On success the curve is non-empty and its first point is the rounded
    /// start position.
    fn generate_curve(&self, journey: &Journey) -> ControlResult<Curve>;

    /// Short human readable name of the strategy
    fn name(&self) -> &'static str;
}

impl<C: CurveController + ?Sized> CurveController for Box<C> {
    fn generate_curve(&self, journey: &Journey) -> ControlResult<Curve> {
        (**self).generate_curve(journey)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{GridPoint, Pose2D};

    // Test that the trait works behind a box
    struct DummyController;

    impl CurveController for DummyController {
        fn generate_curve(&self, journey: &Journey) -> ControlResult<Curve> {
            Ok(Curve::from_points(vec![GridPoint::from(journey.start.position())]))
        }

        fn name(&self) -> &'static str {
            "dummy"
        }
    }

    #[test]
    fn test_boxed_controller() {
        let controller: Box<dyn CurveController> = Box::new(DummyController);
        let journey = Journey::new(Pose2D::new(1.2, 3.7, 0.0), Pose2D::origin());
        let curve = controller.generate_curve(&journey).unwrap();
        assert_eq!(curve.first(), Some(GridPoint::new(1, 4)));
        assert_eq!(controller.name(), "dummy");
    }
}
