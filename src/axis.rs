//! Axis renderer strategy: pure functions from a data range and a validated
//! axis length to tick, label, and grid geometry. Nothing here touches the
//! invalidation machinery; callers redraw when the output changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::format::{format_tick, AxisFormat};
use crate::path::Path;
use crate::scales::{LinearScale, PositionScale};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AxisEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl AxisEdge {
    pub fn is_vertical(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Visible value range of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickLayout {
    pub value: f64,
    /// Pixel coordinate along the axis.
    pub pixel: f32,
    pub label: String,
    /// Label anchor, offset into the axis' cross dimension.
    pub label_anchor: Vec2,
}

#[derive(Clone, Debug, Default)]
pub struct AxisLayout {
    pub ticks: Vec<TickLayout>,
    pub axis_line: Path,
    pub grid: Vec<Path>,
}

/// Layout strategy for one axis.
#[derive(Clone, Copy, Debug)]
pub struct AxisRenderer {
    pub edge: AxisEdge,
    pub format: AxisFormat,
    /// Minimum pixel spacing between labels; drives tick density.
    pub min_label_spacing: f32,
}

impl AxisRenderer {
    pub fn new(edge: AxisEdge) -> Self {
        Self {
            edge,
            format: AxisFormat::Numeric,
            min_label_spacing: 8.0,
        }
    }

    pub fn with_format(mut self, format: AxisFormat) -> Self {
        self.format = format;
        self
    }

    fn scale(&self, length: f32) -> PositionScale {
        // Vertical value axes grow upward, screen y downward.
        PositionScale::new(length, self.edge.is_vertical())
    }

    /// Pixel coordinate of `value` along an axis of `length` pixels.
    pub fn position_of(&self, range: &AxisRange, value: f64, length: f32) -> f32 {
        let linear = LinearScale::new((range.min, range.max), (0.0, 1.0));
        self.scale(length).position_to_coordinate(linear.map(value))
    }

    /// Inverse of [`position_of`], up to the rounding tolerance.
    pub fn value_at(&self, range: &AxisRange, pixel: f32, length: f32) -> f64 {
        let position = self.scale(length).coordinate_to_position(pixel);
        LinearScale::new((range.min, range.max), (0.0, 1.0)).invert(position)
    }

    /// How many labels fit, estimated from the label footprint per format.
    fn tick_count(&self, length: f32) -> usize {
        let label_size_est = match self.format {
            AxisFormat::Time(_) => 80.0 + self.min_label_spacing,
            AxisFormat::Numeric => 50.0 + self.min_label_spacing,
        };
        ((length / label_size_est).floor() as usize).clamp(2, 20)
    }

    /// Full tick/label/grid geometry for an axis of `length` pixels whose
    /// perpendicular plot dimension is `cross_length` pixels.
    pub fn layout(&self, range: &AxisRange, length: f32, cross_length: f32) -> AxisLayout {
        let mut out = AxisLayout::default();
        let linear = LinearScale::new((range.min, range.max), (0.0, 1.0));
        let scale = self.scale(length);
        let span = range.span();

        for value in linear.ticks(self.tick_count(length)) {
            let pixel = scale.position_to_coordinate(linear.map(value));
            let label = format_tick(value, span, self.format);
            let label_anchor = if self.edge.is_vertical() {
                Vec2::new(0.0, pixel)
            } else {
                Vec2::new(pixel, 0.0)
            };
            let mut grid = Path::new();
            if self.edge.is_vertical() {
                grid.move_to(Vec2::new(0.0, pixel));
                grid.line_to(Vec2::new(cross_length, pixel));
            } else {
                grid.move_to(Vec2::new(pixel, 0.0));
                grid.line_to(Vec2::new(pixel, cross_length));
            }
            out.grid.push(grid);
            out.ticks.push(TickLayout { value, pixel, label, label_anchor });
        }

        if self.edge.is_vertical() {
            out.axis_line.move_to(Vec2::ZERO);
            out.axis_line.line_to(Vec2::new(0.0, length));
        } else {
            out.axis_line.move_to(Vec2::ZERO);
            out.axis_line.line_to(Vec2::new(length, 0.0));
        }
        out
    }

    /// Waved outline marking an axis break between two values.
    pub fn break_path(
        &self,
        range: &AxisRange,
        from: f64,
        to: f64,
        length: f32,
        wave_length: f32,
        wave_height: f32,
    ) -> Path {
        let a = self.position_of(range, from, length);
        let b = self.position_of(range, to, length);
        let (start, end) = if self.edge.is_vertical() {
            (Vec2::new(0.0, a), Vec2::new(0.0, b))
        } else {
            (Vec2::new(a, 0.0), Vec2::new(b, 0.0))
        };
        let mut path = Path::new();
        path.move_to(start);
        path.waved_to(end, wave_length, wave_height);
        path
    }
}
