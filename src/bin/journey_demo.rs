// Journey demo: three scripted robots, two of them with goals, run through
// the configured controller once. The curves are logged and plotted.
//
// usage: journey_demo [config.toml]
use std::collections::BTreeMap;
use std::f64::consts::PI;

use log::{error, info, warn};

use journey_control::config::{self, JourneyControlConfig};
use journey_control::utils::{colors, logger_init, LevelFilter, PathStyle, Visualizer};
use journey_control::{build_batch_generator, ControlResult, EntityId, Goal, Pose2D};

const PLOT_PATH: &str = "./img/journey_demo.png";
const SVG_PATH: &str = "./img/journey_demo.svg";

// Camera frame the scripted poses live in
const FRAME_WIDTH: f64 = 640.0;
const FRAME_HEIGHT: f64 = 480.0;

fn scripted_detections() -> BTreeMap<EntityId, Pose2D> {
    let mut detections = BTreeMap::new();
    detections.insert(1, Pose2D::new(100.0, 100.0, 0.0));
    detections.insert(2, Pose2D::new(500.0, 150.0, PI));
    detections.insert(3, Pose2D::new(300.0, 400.0, -PI / 2.0));
    detections
}

fn scripted_goals() -> BTreeMap<EntityId, Goal> {
    let mut goals = BTreeMap::new();
    goals.insert(1, Goal::at(400.0, 300.0));
    goals.insert(2, Goal::with_yaw(150.0, 350.0, PI / 2.0));
    // Robot 3 has no goal and is skipped
    goals
}

fn run(config: &JourneyControlConfig) -> ControlResult<()> {
    let generator = build_batch_generator(config)?;
    let detections = scripted_detections();
    let goals = scripted_goals();

    let batch = generator.generate(&detections, &goals);
    for (id, curve) in &batch.curves {
        let (first, last) = match (curve.first(), curve.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => continue,
        };
        info!(
            "Robot {}: {} points from ({}, {}) to ({}, {}), length {:.1}",
            id,
            curve.len(),
            first.x,
            first.y,
            last.x,
            last.y,
            curve.total_length()
        );
    }
    for (id, err) in &batch.failures {
        warn!("Robot {}: {}", id, err);
    }

    let mut vis = Visualizer::new();
    vis.set_title(&format!("{} controller", generator.controller().name()))
        .set_x_range(0.0, FRAME_WIDTH)
        .set_y_range(0.0, FRAME_HEIGHT)
        .set_invert_y(true);
    for (id, pose) in &detections {
        vis.plot_robot(pose, 1.0);
        if let Some(goal) = goals.get(id) {
            vis.plot_goal(goal.position);
        }
    }
    for (i, (id, curve)) in batch.curves.iter().enumerate() {
        let color = colors::CURVE_CYCLE[i % colors::CURVE_CYCLE.len()];
        vis.plot_curve(curve, &PathStyle::new(color, &format!("Robot {}", id)));
    }

    if let Err(e) = std::fs::create_dir_all("./img") {
        warn!("Cannot create the image directory: {}", e);
        return Ok(());
    }
    vis.save_png(PLOT_PATH, 800, 600)?;
    vis.save_svg(SVG_PATH)?;
    info!("Plots saved to {} and {}", PLOT_PATH, SVG_PATH);
    Ok(())
}

fn main() {
    if let Err(e) = logger_init(LevelFilter::Info) {
        eprintln!("{}", e);
        return;
    }

    let config = match std::env::args().nth(1) {
        Some(path) => match config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            info!("No configuration file given, using defaults");
            JourneyControlConfig::default()
        }
    };

    if let Err(e) = run(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
