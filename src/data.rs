//! In-memory datasets and the shared streaming source.
//!
//! The core never fetches anything itself: a finished dataset is assigned to a
//! drawable's `data` property like any other value, which invalidates it the
//! normal way.

use std::sync::Arc;

use eyre::{Result, WrapErr};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DataSet {
    pub points: Vec<DataPoint>,
}

impl DataSet {
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self { points }
    }

    /// Parses a JSON array of `{ "x": .., "y": .. }` records.
    pub fn parse_json(text: &str) -> Result<Self> {
        let points: Vec<DataPoint> =
            serde_json::from_str(text).wrap_err("invalid dataset JSON")?;
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounds as (x_min, x_max, y_min, y_max), `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut iter = self.points.iter();
        let first = iter.next()?;
        let mut b = (first.x, first.x, first.y, first.y);
        for p in iter {
            b.0 = b.0.min(p.x);
            b.1 = b.1.max(p.x);
            b.2 = b.2.min(p.y);
            b.3 = b.3.max(p.y);
        }
        Some(b)
    }
}

/// Dataset a producer thread can append to while the chart reads snapshots.
///
/// The chart side calls `snapshot()` when a drawable validates; the returned
/// `Arc` is what gets assigned to the `data` property, so equality suppression
/// still works (same snapshot, same Arc contents).
#[derive(Clone, Default)]
pub struct SharedDataSource {
    inner: Arc<RwLock<DataSet>>,
}

impl SharedDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, point: DataPoint) {
        self.inner.write().points.push(point);
    }

    pub fn replace(&self, data: DataSet) {
        *self.inner.write() = data;
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn snapshot(&self) -> Arc<DataSet> {
        Arc::new(self.inner.read().clone())
    }
}
