use glam::Vec2;

use crate::backend::ElementHandle;
use crate::events::EventDispatcher;
use crate::properties::{Length, PropertyStore, PropertyValue};
use crate::shapes::DrawableKind;

/// Stable handle into the scene's drawable arena. Slots are never reused, so a
/// stale id after disposal stays a harmless no-op instead of aliasing a new
/// object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(pub(crate) usize);

impl DrawableId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Lifecycle: `Created → Configured ⇄ Invalid ⇄ Valid → Disposed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed; no backend primitive yet. Property sets are allowed but do
    /// not invalidate anything.
    Created,
    /// Primitive attached, defaults in effect, first pass not yet run.
    Configured,
    /// At least one pending flag set.
    Invalid,
    /// Last draw reflects current property values.
    Valid,
    /// Terminal. Every further mutation is a silent no-op.
    Disposed,
}

/// Mirror of the object's queue membership, one flag per invalidation kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pending {
    pub redraw: bool,
    pub reposition: bool,
    pub layout: bool,
}

impl Pending {
    pub fn any(&self) -> bool {
        self.redraw || self.reposition || self.layout
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

const MAX_DRAW_RETRIES: u8 = 3;

/// Base visual unit: property store, event dispatcher, geometry, and a
/// reference to the backend primitive it controls.
pub struct Drawable {
    pub(crate) kind: DrawableKind,
    pub(crate) parent: Option<DrawableId>,
    pub(crate) children: Vec<DrawableId>,
    pub(crate) properties: PropertyStore,
    pub(crate) events: EventDispatcher,
    pub(crate) state: Lifecycle,
    pub(crate) pending: Pending,
    pub(crate) element: Option<ElementHandle>,
    /// Depth in the tree, roots at 0. Maintained on attach/detach; drives the
    /// children-before-parents / parents-before-children pass ordering.
    pub(crate) depth: u16,
    /// Size resolved by the last layout pass.
    pub(crate) measured: Vec2,
    /// Offset assigned by the parent container's layout strategy.
    pub(crate) slot_offset: Vec2,
    /// Absolute position accumulated down the tree by the reposition phase.
    pub(crate) world_position: Vec2,
    pub(crate) draw_failures: u8,
    pub(crate) failed: bool,
}

impl Drawable {
    pub(crate) fn new(kind: DrawableKind) -> Self {
        let descriptors = kind.descriptors();
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            properties: PropertyStore::new(descriptors),
            events: EventDispatcher::new(),
            state: Lifecycle::Created,
            pending: Pending::default(),
            element: None,
            depth: 0,
            measured: Vec2::ZERO,
            slot_offset: Vec2::ZERO,
            world_position: Vec2::ZERO,
            draw_failures: 0,
            failed: false,
        }
    }

    pub fn kind(&self) -> &DrawableKind {
        &self.kind
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == Lifecycle::Disposed
    }

    pub fn pending(&self) -> Pending {
        self.pending
    }

    pub fn measured(&self) -> Vec2 {
        self.measured
    }

    pub fn world_position(&self) -> Vec2 {
        self.world_position
    }

    pub fn children(&self) -> &[DrawableId] {
        &self.children
    }

    pub fn parent(&self) -> Option<DrawableId> {
        self.parent
    }

    /// True once the retry budget for failing draws is exhausted; further
    /// invalidations are suppressed for this object.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub(crate) fn record_draw_failure(&mut self) {
        self.draw_failures = self.draw_failures.saturating_add(1);
        if self.draw_failures >= MAX_DRAW_RETRIES {
            self.failed = true;
        }
    }

    pub(crate) fn float(&self, name: &str) -> f64 {
        self.properties
            .get(name)
            .and_then(|v| v.as_float())
            .unwrap_or(0.0)
    }

    pub(crate) fn length(&self, name: &str) -> Length {
        self.properties
            .get(name)
            .and_then(|v| v.as_length())
            .unwrap_or(Length::Auto)
    }

    pub(crate) fn local_offset(&self) -> Vec2 {
        Vec2::new(self.float("x") as f32, self.float("y") as f32)
    }

    /// True when either dimension is resolved by layout rather than pinned.
    pub(crate) fn is_auto_sized(&self) -> bool {
        self.length("width").is_auto() || self.length("height").is_auto()
    }

    pub(crate) fn get(&self, name: &str) -> Option<PropertyValue> {
        self.properties.get(name)
    }

    pub(crate) fn has_explicit(&self, name: &str) -> bool {
        self.properties.has_explicit(name)
    }

    /// Invalid/Valid transition bookkeeping after queue membership changed.
    pub(crate) fn sync_state(&mut self) {
        match self.state {
            Lifecycle::Created | Lifecycle::Disposed => {}
            _ => {
                self.state = if self.pending.any() {
                    Lifecycle::Invalid
                } else {
                    Lifecycle::Valid
                };
            }
        }
    }
}
