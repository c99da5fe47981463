use serde::{Deserialize, Serialize};

/// Straight-alpha color, components in 0..=1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS-style string, the form the drawing backend consumes as an attribute.
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::black()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartTheme {
    pub background: Rgba,
    pub grid_line: Rgba,
    pub axis_line: Rgba,
    pub axis_label: Rgba,
    pub axis_label_size: f32,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub accent: Rgba,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl ChartTheme {
    pub fn dark() -> Self {
        Self {
            background: Rgba::black(),
            grid_line: Rgba::white().alpha(0.1),
            axis_line: Rgba::white().alpha(0.2),
            axis_label: Rgba::white().alpha(0.8),
            axis_label_size: 11.0,
            fill: Rgba::new(0.26, 0.52, 0.96, 1.0),
            stroke: Rgba::white().alpha(0.9),
            accent: Rgba::new(0.96, 0.62, 0.1, 1.0),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Rgba::white(),
            grid_line: Rgba::black().alpha(0.08),
            axis_line: Rgba::black().alpha(0.25),
            axis_label: Rgba::black().alpha(0.85),
            axis_label_size: 11.0,
            fill: Rgba::new(0.13, 0.38, 0.85, 1.0),
            stroke: Rgba::black().alpha(0.9),
            accent: Rgba::new(0.85, 0.42, 0.0, 1.0),
        }
    }
}
