//! Start-up selection of the active controller

use log::info;
use serde::Deserialize;

use crate::common::{ControlResult, CurveController};
use crate::config::JourneyControlConfig;
use crate::control::curve_batch::CurveBatchGenerator;
use crate::path_planning::GeometricPathController;
use crate::path_tracking::FeedbackTrajectoryController;

/// Strategy used to turn journeys into curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Closed-loop unicycle simulation
    Feedback,
    /// Open-loop Dubins path
    Geometric,
}

impl Default for ControllerKind {
    fn default() -> Self {
        ControllerKind::Feedback
    }
}

/// Build the configured controller
pub fn build_controller(config: &JourneyControlConfig) -> ControlResult<Box<dyn CurveController>> {
    config.validate()?;

    let controller: Box<dyn CurveController> = match config.controller {
        ControllerKind::Feedback => {
            Box::new(FeedbackTrajectoryController::new(config.feedback.clone())?)
        }
        ControllerKind::Geometric => {
            Box::new(GeometricPathController::new(config.geometric.clone())?)
        }
    };
    info!("Using the {} controller", controller.name());
    Ok(controller)
}

/// Build a batch generator around the configured controller
pub fn build_batch_generator(config: &JourneyControlConfig) -> ControlResult<CurveBatchGenerator> {
    let controller = build_controller(config)?;
    Ok(CurveBatchGenerator::new(controller, config.batch.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ControlError;

    #[test]
    fn test_default_is_feedback() {
        let controller = build_controller(&JourneyControlConfig::default()).unwrap();
        assert_eq!(controller.name(), "feedback");
    }

    #[test]
    fn test_geometric_selection() {
        let config = JourneyControlConfig {
            controller: ControllerKind::Geometric,
            ..Default::default()
        };
        let generator = build_batch_generator(&config).unwrap();
        assert_eq!(generator.controller().name(), "geometric");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = JourneyControlConfig::default();
        config.geometric.sample_step = 0.0;
        assert!(matches!(
            build_controller(&config),
            Err(ControlError::InvalidParameter(_))
        ));
    }
}
