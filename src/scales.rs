use crate::path::round1;

/// Abstract-position scale for an axis renderer: maps a relative position in
/// 0..=1 onto the axis' pixel length, optionally inverted (vertical value axes
/// grow upward while screen y grows downward).
///
/// The pixel direction rounds to one decimal place, so repeated conversions of
/// the same position always produce the same pixel value and a validated
/// drawable does not re-invalidate from float noise. The inverse is exact; the
/// rounding re-applies on the next forward conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionScale {
    pub length: f32,
    pub inverted: bool,
}

impl PositionScale {
    pub fn new(length: f32, inverted: bool) -> Self {
        Self { length: length.max(0.0), inverted }
    }

    pub fn position_to_coordinate(&self, position: f32) -> f32 {
        let p = if self.inverted { 1.0 - position } else { position };
        round1(p * self.length)
    }

    pub fn coordinate_to_position(&self, pixels: f32) -> f32 {
        if self.length <= 0.0 {
            return 0.0;
        }
        let p = pixels / self.length;
        if self.inverted {
            1.0 - p
        } else {
            p
        }
    }
}

/// Linear data scale mapping a value domain onto a pixel range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        let (mut d_min, mut d_max) = domain;
        // A degenerate domain would make map() blow up; widen it slightly.
        if (d_max - d_min).abs() < f64::EPSILON {
            d_min -= 0.5;
            d_max += 0.5;
        }
        Self { domain: (d_min, d_max), range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn map(&self, value: f64) -> f32 {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;
        let t = (value - d_min) / (d_max - d_min);
        let res = r_min as f64 + t * (r_max - r_min) as f64;
        if res.is_nan() || res.is_infinite() {
            0.0
        } else {
            res as f32
        }
    }

    pub fn invert(&self, pixel: f32) -> f64 {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;
        let span = (r_max - r_min) as f64;
        if span.abs() < f64::EPSILON {
            return d_min;
        }
        let t = (pixel - r_min) as f64 / span;
        d_min + t * (d_max - d_min)
    }

    /// Round tick values covering the domain, aiming for roughly `count` ticks.
    /// Steps are 1/2/5 times a power of ten.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (min, max) = self.domain;
        let count = count.max(2);
        let raw_step = (max - min) / count as f64;
        if raw_step <= 0.0 || !raw_step.is_finite() {
            return vec![min, max];
        }

        let mag = 10f64.powf(raw_step.log10().floor());
        let norm = raw_step / mag;
        let step = if norm < 1.5 {
            mag
        } else if norm < 3.5 {
            2.0 * mag
        } else if norm < 7.5 {
            5.0 * mag
        } else {
            10.0 * mag
        };

        let first = (min / step).ceil() * step;
        let mut ticks = Vec::new();
        let mut v = first;
        // Small epsilon so max itself survives accumulation error.
        while v <= max + step * 1e-9 {
            ticks.push(v);
            v += step;
        }
        ticks
    }
}
