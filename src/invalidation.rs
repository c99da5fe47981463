use std::collections::HashSet;

use crate::drawable::DrawableId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidationKind {
    Redraw,
    Reposition,
    Layout,
}

/// Ordered set of objects pending the next drain pass, partitioned by kind.
///
/// At most one entry per (object, kind): re-invalidating an already-pending
/// pair is a no-op, so any number of property mutations between two passes
/// costs one queue entry. Insertion order is preserved per partition, which
/// keeps passes deterministic before the depth sort is applied.
#[derive(Default)]
pub struct InvalidationQueue {
    redraw: Vec<DrawableId>,
    reposition: Vec<DrawableId>,
    layout: Vec<DrawableId>,
    members: HashSet<(DrawableId, InvalidationKind)>,
}

impl InvalidationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the pair was already pending.
    pub fn enqueue(&mut self, id: DrawableId, kind: InvalidationKind) -> bool {
        if !self.members.insert((id, kind)) {
            return false;
        }
        self.partition_mut(kind).push(id);
        true
    }

    pub fn is_pending(&self, id: DrawableId, kind: InvalidationKind) -> bool {
        self.members.contains(&(id, kind))
    }

    pub fn is_pending_any(&self, id: DrawableId) -> bool {
        self.is_pending(id, InvalidationKind::Redraw)
            || self.is_pending(id, InvalidationKind::Reposition)
            || self.is_pending(id, InvalidationKind::Layout)
    }

    /// Drops the object from every partition, e.g. on disposal.
    pub fn remove(&mut self, id: DrawableId) {
        for kind in [
            InvalidationKind::Redraw,
            InvalidationKind::Reposition,
            InvalidationKind::Layout,
        ] {
            if self.members.remove(&(id, kind)) {
                self.partition_mut(kind).retain(|x| *x != id);
            }
        }
    }

    /// Snapshots one partition and clears it; entries enqueued afterwards
    /// belong to the next snapshot.
    pub fn take(&mut self, kind: InvalidationKind) -> Vec<DrawableId> {
        let taken = std::mem::take(self.partition_mut(kind));
        for id in &taken {
            self.members.remove(&(*id, kind));
        }
        taken
    }

    pub fn len(&self, kind: InvalidationKind) -> usize {
        match kind {
            InvalidationKind::Redraw => self.redraw.len(),
            InvalidationKind::Reposition => self.reposition.len(),
            InvalidationKind::Layout => self.layout.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn partition_mut(&mut self, kind: InvalidationKind) -> &mut Vec<DrawableId> {
        match kind {
            InvalidationKind::Redraw => &mut self.redraw,
            InvalidationKind::Reposition => &mut self.reposition,
            InvalidationKind::Layout => &mut self.layout,
        }
    }
}
