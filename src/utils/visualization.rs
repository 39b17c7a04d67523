//! Visualization utilities for journey_control
//!
//! Offline plots of generated curves using gnuplot, for inspecting what a
//! controller produced.

use gnuplot::{Figure, Caption, Color, PointSymbol, PointSize, LineWidth, AxesCommon, AutoOption};

use crate::common::{ControlError, ControlResult, Curve, Point2D, Pose2D};

/// Color palette for consistent styling
pub mod colors {
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const PURPLE: &str = "#800080";

    // Semantic colors
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const CURVE: &str = RED;
    pub const ROBOT: &str = PURPLE;

    /// Cycled through when plotting one curve per robot
    pub const CURVE_CYCLE: [&str; 4] = [RED, ORANGE, "#35C788", "#DD3355"];
}

/// Style for curve rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: colors::CURVE.to_string(),
            line_width: 2.0,
            caption: "Curve".to_string(),
        }
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }
}

/// One queued plot element
#[derive(Debug, Clone)]
enum Layer {
    Lines {
        x: Vec<f64>,
        y: Vec<f64>,
        color: String,
        width: f64,
        caption: Option<String>,
    },
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
        style: PointStyle,
        caption: Option<String>,
    },
}

/// Main visualizer struct
///
/// Plot calls only queue layers; they are drawn on a single set of axes
/// when the figure is saved.
pub struct Visualizer {
    figure: Figure,
    layers: Vec<Layer>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    invert_y: bool,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            layers: Vec::new(),
            title: String::new(),
            x_label: "x [px]".to_string(),
            y_label: "y [px]".to_string(),
            x_range: None,
            y_range: None,
            invert_y: true,
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Set X axis range
    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    /// Set Y axis range
    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Draw y growing downwards, like the screen the curves are meant for
    pub fn set_invert_y(&mut self, invert: bool) -> &mut Self {
        self.invert_y = invert;
        self
    }

    /// Plot a curve
    pub fn plot_curve(&mut self, curve: &Curve, style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: curve.x_coords(),
            y: curve.y_coords(),
            color: style.color.clone(),
            width: style.line_width,
            caption: Some(style.caption.clone()),
        });
        self
    }

    /// Plot a single point (start, goal, etc.)
    pub fn plot_point(&mut self, point: Point2D, style: &PointStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: vec![point.x],
            y: vec![point.y],
            style: style.clone(),
            caption: Some(style.caption.clone()),
        });
        self
    }

    /// Plot robot pose with direction indicator
    pub fn plot_robot(&mut self, pose: &Pose2D, size: f64) -> &mut Self {
        self.layers.push(Layer::Points {
            x: vec![pose.x],
            y: vec![pose.y],
            style: PointStyle::new(colors::ROBOT, "Robot").with_size(size),
            caption: None,
        });

        // Plot direction line (arrow substitute)
        let arrow_len = size * 10.0;
        let end_x = pose.x + arrow_len * pose.yaw.cos();
        let end_y = pose.y + arrow_len * pose.yaw.sin();

        self.layers.push(Layer::Lines {
            x: vec![pose.x, end_x],
            y: vec![pose.y, end_y],
            color: colors::ROBOT.to_string(),
            width: 2.0,
            caption: None,
        });
        self
    }

    /// Plot start position
    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    /// Plot goal position
    pub fn plot_goal(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> ControlResult<()> {
        self.apply_settings();
        self.figure.save_to_png(path, width, height)
            .map_err(|e| ControlError::Visualization(e.to_string()))
    }

    /// Save plot to SVG file
    pub fn save_svg(&mut self, path: &str) -> ControlResult<()> {
        self.apply_settings();
        self.figure.save_to_svg(path, 800, 600)
            .map_err(|e| ControlError::Visualization(e.to_string()))
    }

    fn apply_settings(&mut self) {
        self.figure.clear_axes();
        let axes = self.figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, color, width, caption } => match caption {
                    Some(caption) => {
                        axes.lines(x, y, &[
                            Caption(caption.as_str()),
                            Color(color.as_str()),
                            LineWidth(*width),
                        ]);
                    }
                    None => {
                        axes.lines(x, y, &[Color(color.as_str()), LineWidth(*width)]);
                    }
                },
                Layer::Points { x, y, style, caption } => match caption {
                    Some(caption) => {
                        axes.points(x, y, &[
                            Caption(caption.as_str()),
                            Color(style.color.as_str()),
                            PointSymbol(style.symbol),
                            PointSize(style.size),
                        ]);
                    }
                    None => {
                        axes.points(x, y, &[
                            Color(style.color.as_str()),
                            PointSymbol(style.symbol),
                            PointSize(style.size),
                        ]);
                    }
                },
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        match (self.y_range, self.invert_y) {
            (Some((min, max)), true) => {
                axes.set_y_range(AutoOption::Fix(max), AutoOption::Fix(min));
            }
            (Some((min, max)), false) => {
                axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
            }
            (None, true) => {
                axes.set_y_reverse(true);
            }
            (None, false) => {}
        }
        axes.set_aspect_ratio(AutoOption::Fix(1.0));
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Quick plot of one journey's curve
pub fn quick_plot_curve(curve: &Curve, start: &Pose2D, goal: Point2D, title: &str) -> Visualizer {
    let mut vis = Visualizer::new();
    vis.set_title(title);
    vis.plot_robot(start, 1.0);
    vis.plot_start(start.position());
    vis.plot_goal(goal);
    vis.plot_curve(curve, &PathStyle::default());
    vis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer_creation() {
        let vis = Visualizer::new();
        assert!(vis.invert_y);
        assert!(vis.layers.is_empty());
        assert!(vis.x_range.is_none());
    }

    #[test]
    fn test_layers_are_queued() {
        let curve = Curve::from_xy(&[0.0, 10.0], &[0.0, 5.0]);
        let vis = quick_plot_curve(&curve, &Pose2D::origin(), Point2D::new(10.0, 5.0), "test");
        // robot marker + heading line, start, goal, curve
        assert_eq!(vis.layers.len(), 5);
    }

    #[test]
    fn test_screen_frame_settings() {
        let mut vis = Visualizer::new();
        vis.set_x_range(0.0, 640.0)
            .set_y_range(0.0, 480.0)
            .set_invert_y(false);
        assert_eq!(vis.x_range, Some((0.0, 640.0)));
        assert_eq!(vis.y_range, Some((0.0, 480.0)));
        assert!(!vis.invert_y);
    }

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Curve")
            .with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
    }
}
