//! chart_core: retained-mode charting core.
//!
//! Drawables hold typed property stores and event dispatchers; mutations are
//! coalesced through an invalidation queue and resolved by [`Scene::drain_pass`]
//! once per external tick: layout children-before-parents, redraw, then
//! reposition parents-before-children.

pub mod axis;
pub mod backend;
pub mod container;
pub mod data;
pub mod drawable;
pub mod error;
pub mod events;
pub mod format;
pub mod invalidation;
pub mod path;
pub mod properties;
pub mod scales;
pub mod scene;
pub mod shapes;
pub mod theme;

pub use axis::{AxisEdge, AxisRange, AxisRenderer};
pub use backend::{DrawingBackend, RecordingBackend};
pub use container::LayoutMode;
pub use data::{DataPoint, DataSet, SharedDataSource};
pub use drawable::{DrawableId, Lifecycle};
pub use error::ChartError;
pub use events::{Event, EventKind, Reactions};
pub use invalidation::InvalidationKind;
pub use properties::{Length, PropertyValue};
pub use scene::{PassReport, Scene};
pub use shapes::{DrawableFactory, DrawableKind};
pub use theme::{ChartTheme, Rgba};
