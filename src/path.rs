//! Abstract path description: move/line commands with point coordinates.
//!
//! Backends turn this into whatever markup or vertex stream they need; the
//! core only composes straight and waved segments and interpolates along them.

use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
}

impl PathCommand {
    pub fn point(&self) -> Vec2 {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) => *p,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Vec2) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Vec2) -> &mut Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    /// Appends a zigzag between the current point and `to`.
    ///
    /// `wave_length` is measured along the segment, `wave_height` perpendicular
    /// to it. The final command always lands exactly on `to` so subsequent
    /// segments stay connected. Used for axis breaks and range outlines.
    pub fn waved_to(&mut self, to: Vec2, wave_length: f32, wave_height: f32) -> &mut Self {
        let from = match self.commands.last() {
            Some(cmd) => cmd.point(),
            None => {
                self.commands.push(PathCommand::MoveTo(to));
                return self;
            }
        };

        let span = to - from;
        let dist = span.length();
        if dist < f32::EPSILON || wave_length <= 0.0 {
            return self.line_to(to);
        }

        let dir = span / dist;
        let normal = Vec2::new(-dir.y, dir.x);
        // Half-wave per step: alternate sides every wave_length/2.
        let steps = ((dist / (wave_length / 2.0)).floor() as usize).max(1);
        let step = dist / steps as f32;

        for i in 1..steps {
            let side = if i % 2 == 1 { 1.0 } else { -1.0 };
            let p = from + dir * (step * i as f32) + normal * (wave_height / 2.0 * side);
            self.line_to(p);
        }
        self.line_to(to)
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Total polyline length, ignoring gaps introduced by extra MoveTo.
    pub fn length(&self) -> f32 {
        let mut total = 0.0;
        for pair in self.commands.windows(2) {
            if let PathCommand::LineTo(b) = pair[1] {
                total += (b - pair[0].point()).length();
            }
        }
        total
    }

    /// Point at normalized position `t` in 0..=1 along the polyline.
    ///
    /// Used for bullet placement on flow-diagram links. Out-of-range `t` clamps
    /// to the endpoints; an empty path yields the origin.
    pub fn point_at(&self, t: f32) -> Vec2 {
        let Some(first) = self.commands.first() else {
            return Vec2::ZERO;
        };
        let total = self.length();
        if total <= f32::EPSILON {
            return first.point();
        }

        let mut remaining = t.clamp(0.0, 1.0) * total;
        for pair in self.commands.windows(2) {
            if let PathCommand::LineTo(b) = pair[1] {
                let a = pair[0].point();
                let seg = (b - a).length();
                if remaining <= seg {
                    if seg <= f32::EPSILON {
                        return a;
                    }
                    return a + (b - a) * (remaining / seg);
                }
                remaining -= seg;
            }
        }
        self.commands.last().map(|c| c.point()).unwrap_or(Vec2::ZERO)
    }

    /// Serializes to the `d`-style attribute string the backend consumes.
    pub fn to_attribute(&self) -> String {
        let mut out = String::new();
        for cmd in &self.commands {
            let (op, p) = match cmd {
                PathCommand::MoveTo(p) => ('M', p),
                PathCommand::LineTo(p) => ('L', p),
            };
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&format!("{}{},{}", op, round1(p.x), round1(p.y)));
        }
        out
    }
}

/// One-decimal rounding shared with the scales: keeps emitted attributes stable
/// across passes so float noise does not force spurious redraws.
pub(crate) fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

/// Converts a polar position (angle in degrees, radius in pixels) to cartesian
/// coordinates relative to `center`. Angle 0 points right, growing clockwise
/// (screen coordinates, y down).
pub fn radial_to_cartesian(center: Vec2, angle_deg: f32, radius: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    center + Vec2::new(rad.cos(), rad.sin()) * radius
}

/// Arc approximation as a polyline, one segment per ~6 degrees. Enough for
/// radar columns; backends that want true arcs can resample.
pub fn arc(center: Vec2, radius: f32, start_deg: f32, end_deg: f32) -> Vec<Vec2> {
    let sweep = end_deg - start_deg;
    let steps = ((sweep.abs() / 6.0).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            let a = start_deg + sweep * (i as f32 / steps as f32);
            radial_to_cartesian(center, a, radius)
        })
        .collect()
}
