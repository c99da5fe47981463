//! The scene arena and the drain pass that resolves invalidations.
//!
//! All mutation funnels through [`Scene::set`] and friends on one logical
//! thread; an external tick driver calls [`Scene::drain_pass`] at its own
//! cadence. Handlers never re-enter the scene synchronously; they record
//! deferred work in [`Reactions`], which the scene drains in a flat loop.

use std::cmp::Reverse;

use eyre::Result;
use glam::Vec2;
use tracing::{debug, warn};

use crate::backend::DrawingBackend;
use crate::container::{arrange, ChildMetrics};
use crate::drawable::{Drawable, DrawableId, Lifecycle};
use crate::error::ChartError;
use crate::events::{Event, EventKind, Handler, Reactions, SubscriptionId};
use crate::invalidation::{InvalidationKind, InvalidationQueue};
use crate::path::round1;
use crate::properties::{InvalidationEffect, PropertyValue};
use crate::shapes::{self, DrawableKind};
use crate::theme::ChartTheme;

/// Bound on handler-triggered set cascades drained per mutation. A cascade
/// that still produces work after this many rounds is ping-ponging between
/// values; the remainder is dropped with a warning.
const MAX_REACTION_ROUNDS: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub laid_out: usize,
    pub drawn: usize,
    pub repositioned: usize,
    pub errors: usize,
}

pub struct Scene {
    nodes: Vec<Drawable>,
    queue: InvalidationQueue,
    backend: Box<dyn DrawingBackend>,
    theme: ChartTheme,
}

impl Scene {
    pub fn new(backend: Box<dyn DrawingBackend>) -> Self {
        Self::with_theme(backend, ChartTheme::default())
    }

    pub fn with_theme(backend: Box<dyn DrawingBackend>, theme: ChartTheme) -> Self {
        Self {
            nodes: Vec::new(),
            queue: InvalidationQueue::new(),
            backend,
            theme,
        }
    }

    pub fn theme(&self) -> &ChartTheme {
        &self.theme
    }

    /// Swapping the theme repaints every configured drawable.
    pub fn set_theme(&mut self, theme: ChartTheme) {
        self.theme = theme;
        for i in 0..self.nodes.len() {
            let id = DrawableId(i);
            if self.can_schedule(id) {
                self.enqueue(id, InvalidationKind::Redraw);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn drawable(&self, id: DrawableId) -> Option<&Drawable> {
        self.nodes.get(id.0)
    }

    pub fn state(&self, id: DrawableId) -> Option<Lifecycle> {
        self.drawable(id).map(|n| n.state())
    }

    pub fn measured_size(&self, id: DrawableId) -> Option<Vec2> {
        self.drawable(id).map(|n| n.measured())
    }

    pub fn world_position(&self, id: DrawableId) -> Option<Vec2> {
        self.drawable(id).map(|n| n.world_position())
    }

    /// Backend element id, for correlating with backend logs.
    pub fn element_of(&self, id: DrawableId) -> Option<u64> {
        self.drawable(id).and_then(|n| n.element).map(|e| e.0)
    }

    pub fn is_pending(&self, id: DrawableId, kind: InvalidationKind) -> bool {
        self.queue.is_pending(id, kind)
    }

    pub fn get(&self, id: DrawableId, name: &str) -> Option<PropertyValue> {
        self.drawable(id).and_then(|n| n.get(name))
    }

    // ---- construction ----------------------------------------------------

    /// Allocates a drawable in the `Created` state: no primitive yet, property
    /// sets allowed but nothing scheduled.
    pub fn create(&mut self, kind: DrawableKind) -> DrawableId {
        let id = DrawableId(self.nodes.len());
        self.nodes.push(Drawable::new(kind));
        id
    }

    /// Attaches the backend primitive and schedules the initial full pass.
    pub fn configure(&mut self, id: DrawableId) -> Result<(), ChartError> {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return Ok(());
        };
        if node.is_disposed() || node.element.is_some() {
            return Ok(());
        }
        let element = self.backend.create_element(node.kind.element_kind())?;
        node.element = Some(element);
        node.state = Lifecycle::Configured;
        self.invalidate_full(id);
        Ok(())
    }

    /// `create` + `configure` in one step.
    pub fn spawn(&mut self, kind: DrawableKind) -> Result<DrawableId> {
        let id = self.create(kind);
        self.configure(id)?;
        Ok(id)
    }

    // ---- tree ------------------------------------------------------------

    pub fn add_child(&mut self, parent: DrawableId, child: DrawableId) {
        let index = self.drawable(parent).map(|n| n.children.len()).unwrap_or(0);
        self.insert_child(parent, index, child);
    }

    pub fn insert_child(&mut self, parent: DrawableId, index: usize, child: DrawableId) {
        if parent == child
            || self.drawable(parent).map_or(true, |n| n.is_disposed())
            || self.drawable(child).map_or(true, |n| n.is_disposed())
        {
            return;
        }
        // Reparenting detaches first.
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.remove_child(old_parent, child);
        }

        let index = index.min(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.refresh_depths(child);

        let mut reactions = Reactions::default();
        let event = Event::ChildInserted { parent, child, index };
        self.nodes[parent.0].events.dispatch(&event, &mut reactions);

        self.invalidate_layout(parent);
        if self.can_schedule(child) {
            self.enqueue(child, InvalidationKind::Reposition);
        }
        self.apply_reactions(reactions);
    }

    /// Detaches `child` without disposing it (shared-template case); the child
    /// becomes a root.
    pub fn remove_child(&mut self, parent: DrawableId, child: DrawableId) {
        let Some(pnode) = self.nodes.get_mut(parent.0) else {
            return;
        };
        let before = pnode.children.len();
        pnode.children.retain(|c| *c != child);
        if pnode.children.len() == before {
            return;
        }
        self.nodes[child.0].parent = None;
        self.refresh_depths(child);

        let mut reactions = Reactions::default();
        let event = Event::ChildRemoved { parent, child };
        self.nodes[parent.0].events.dispatch(&event, &mut reactions);
        self.invalidate_layout(parent);
        self.apply_reactions(reactions);
    }

    fn refresh_depths(&mut self, root: DrawableId) {
        let base = self.nodes[root.0]
            .parent
            .map(|p| self.nodes[p.0].depth + 1)
            .unwrap_or(0);
        self.nodes[root.0].depth = base;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let depth = self.nodes[id.0].depth;
            let children = self.nodes[id.0].children.clone();
            for c in children {
                self.nodes[c.0].depth = depth + 1;
                stack.push(c);
            }
        }
    }

    // ---- events ----------------------------------------------------------

    pub fn on(&mut self, id: DrawableId, kind: EventKind, handler: Handler) -> Option<SubscriptionId> {
        self.nodes.get_mut(id.0).map(|n| n.events.on(kind, handler))
    }

    pub fn once(&mut self, id: DrawableId, kind: EventKind, handler: Handler) -> Option<SubscriptionId> {
        self.nodes.get_mut(id.0).map(|n| n.events.once(kind, handler))
    }

    pub fn off(&mut self, id: DrawableId, subscription: SubscriptionId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.events.off(subscription);
        }
    }

    pub fn disable_events(&mut self, id: DrawableId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.events.disable();
        }
    }

    pub fn enable_events(&mut self, id: DrawableId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.events.enable();
        }
    }

    // ---- mutation --------------------------------------------------------

    /// Sets a property. Returns whether anything changed; equal values are a
    /// complete no-op. On a disposed drawable this is a silent no-op.
    pub fn set(&mut self, id: DrawableId, name: &str, value: impl Into<PropertyValue>) -> bool {
        let mut reactions = Reactions::default();
        let changed = self.set_inner(id, name, value.into(), &mut reactions);
        self.apply_reactions(reactions);
        changed
    }

    /// Registers a read-side adapter; the transformed value feeds the next
    /// draw, so the object is invalidated.
    pub fn add_adapter(
        &mut self,
        id: DrawableId,
        name: &'static str,
        f: impl Fn(PropertyValue) -> PropertyValue + 'static,
    ) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            if node.is_disposed() {
                return;
            }
            node.properties.add_adapter(name, f);
        }
        self.invalidate(id);
    }

    fn set_inner(
        &mut self,
        id: DrawableId,
        name: &str,
        value: PropertyValue,
        reactions: &mut Reactions,
    ) -> bool {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        if node.is_disposed() {
            return false;
        }
        let Some(descriptor) = node.properties.descriptor(name) else {
            let error = ChartError::UnknownProperty(name.to_string());
            warn!(drawable = id.0, %error, "rejected property set");
            let event = Event::Error { target: id, error };
            node.events.dispatch(&event, reactions);
            return false;
        };

        match node.properties.set(descriptor.name, value) {
            Err(error) => {
                // Object keeps its last valid state; the mistake is reported,
                // not thrown.
                warn!(drawable = id.0, %error, "rejected property set");
                let event = Event::Error { target: id, error };
                node.events.dispatch(&event, reactions);
                false
            }
            Ok(None) => false,
            Ok(Some((old, new))) => {
                let event = Event::PropertyChanged {
                    target: id,
                    name: descriptor.name,
                    old,
                    new,
                };
                node.events.dispatch(&event, reactions);
                match descriptor.effect {
                    InvalidationEffect::Paint => {
                        if self.can_schedule(id) {
                            self.enqueue(id, InvalidationKind::Redraw);
                        }
                    }
                    InvalidationEffect::Position => self.invalidate_position(id),
                    InvalidationEffect::Layout => self.invalidate(id),
                }
                true
            }
        }
    }

    fn apply_reactions(&mut self, mut reactions: Reactions) {
        let mut rounds = 0;
        while !reactions.is_empty() {
            rounds += 1;
            if rounds > MAX_REACTION_ROUNDS {
                warn!("reaction cascade still active after {MAX_REACTION_ROUNDS} rounds, dropping remainder");
                return;
            }
            let current = std::mem::take(&mut reactions);
            for (owner, subscription) in current.unsubscribes {
                self.off(owner, subscription);
            }
            for target in current.disposals {
                self.dispose_with(target, &mut reactions);
            }
            for (target, name, value) in current.sets {
                self.set_inner(target, name, value, &mut reactions);
            }
        }
    }

    // ---- invalidation ----------------------------------------------------

    fn can_schedule(&self, id: DrawableId) -> bool {
        self.drawable(id)
            .is_some_and(|n| !n.is_disposed() && !n.is_failed() && n.element.is_some())
    }

    fn enqueue(&mut self, id: DrawableId, kind: InvalidationKind) {
        if self.queue.enqueue(id, kind) {
            let node = &mut self.nodes[id.0];
            match kind {
                InvalidationKind::Redraw => node.pending.redraw = true,
                InvalidationKind::Reposition => node.pending.reposition = true,
                InvalidationKind::Layout => node.pending.layout = true,
            }
            node.sync_state();
        }
    }

    /// Size-affecting invalidation: redraw this object, re-run its own layout
    /// (a container re-arranges its children, a leaf re-measures), and
    /// re-layout ancestors whose measurement may depend on it.
    pub fn invalidate(&mut self, id: DrawableId) {
        if !self.can_schedule(id) {
            return;
        }
        self.enqueue(id, InvalidationKind::Redraw);
        self.enqueue(id, InvalidationKind::Layout);
        self.mark_ancestor_layout(id);
    }

    /// Cheaper path: geometry translation only, no redraw.
    pub fn invalidate_position(&mut self, id: DrawableId) {
        if !self.can_schedule(id) {
            return;
        }
        self.enqueue(id, InvalidationKind::Reposition);
    }

    /// Re-run this object's layout (and ancestors', as needed).
    pub fn invalidate_layout(&mut self, id: DrawableId) {
        if !self.can_schedule(id) {
            return;
        }
        self.enqueue(id, InvalidationKind::Layout);
        self.mark_ancestor_layout(id);
    }

    fn invalidate_full(&mut self, id: DrawableId) {
        if !self.can_schedule(id) {
            return;
        }
        self.enqueue(id, InvalidationKind::Redraw);
        self.enqueue(id, InvalidationKind::Reposition);
        self.enqueue(id, InvalidationKind::Layout);
        self.mark_ancestor_layout(id);
    }

    /// The parent always re-arranges; the climb continues only while the
    /// container's own size is auto (a fixed-size ancestor absorbs the size
    /// change).
    fn mark_ancestor_layout(&mut self, id: DrawableId) {
        let mut cur = id;
        while let Some(parent) = self.drawable(cur).and_then(|n| n.parent) {
            if !self.can_schedule(parent) {
                break;
            }
            self.enqueue(parent, InvalidationKind::Layout);
            if !self.nodes[parent.0].is_auto_sized() {
                break;
            }
            cur = parent;
        }
    }

    // ---- disposal --------------------------------------------------------

    /// Terminal: releases the primitive, unsubscribes handlers, clears pending
    /// state, detaches from the parent, and disposes children. Safe to call
    /// at any point, including from event handlers via `Reactions::dispose`.
    pub fn dispose(&mut self, id: DrawableId) {
        let mut reactions = Reactions::default();
        self.dispose_with(id, &mut reactions);
        self.apply_reactions(reactions);
    }

    fn dispose_with(&mut self, id: DrawableId, reactions: &mut Reactions) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        if node.is_disposed() {
            return;
        }
        node.state = Lifecycle::Disposed;
        let event = Event::Disposed { target: id };
        node.events.dispatch(&event, reactions);
        node.events.dispose();
        node.pending.clear();
        let element = node.element.take();
        let parent = node.parent.take();
        let children = std::mem::take(&mut node.children);

        self.queue.remove(id);
        if let Some(el) = element {
            self.backend.remove_element(el);
        }

        let mut removed_from = None;
        if let Some(p) = parent {
            if let Some(pnode) = self.nodes.get_mut(p.0) {
                if !pnode.is_disposed() {
                    pnode.children.retain(|c| *c != id);
                    removed_from = Some(p);
                }
            }
        }
        if let Some(p) = removed_from {
            let event = Event::ChildRemoved { parent: p, child: id };
            self.nodes[p.0].events.dispatch(&event, reactions);
            self.invalidate_layout(p);
        }

        for child in children {
            self.dispose_with(child, reactions);
        }
    }

    // ---- drain pass ------------------------------------------------------

    /// One pass: layout (children before parents), then redraw, then
    /// reposition (parents before children). Invalidations raised while the
    /// pass runs are deferred to the next call, which bounds every pass to the
    /// work pending at its start.
    pub fn drain_pass(&mut self) -> PassReport {
        let mut report = PassReport::default();
        let mut reactions = Reactions::default();
        let mut pass_queue = std::mem::take(&mut self.queue);

        let mut layout_ids = pass_queue.take(InvalidationKind::Layout);
        layout_ids.sort_by_key(|id| Reverse(self.nodes[id.0].depth));
        for id in layout_ids {
            if !self.is_live(id) {
                continue;
            }
            self.nodes[id.0].pending.layout = false;
            self.validate_layout(id, &mut pass_queue);
            self.nodes[id.0].sync_state();
            report.laid_out += 1;
        }

        for id in pass_queue.take(InvalidationKind::Redraw) {
            if !self.is_live(id) {
                continue;
            }
            match self.draw(id) {
                Ok(()) => {
                    self.nodes[id.0].pending.redraw = false;
                    self.nodes[id.0].sync_state();
                    report.drawn += 1;
                }
                Err(error) => {
                    report.errors += 1;
                    self.handle_render_error(id, InvalidationKind::Redraw, error, &mut reactions);
                }
            }
        }

        let mut repos_ids = pass_queue.take(InvalidationKind::Reposition);
        repos_ids.sort_by_key(|id| self.nodes[id.0].depth);
        for id in repos_ids {
            if !self.is_live(id) {
                continue;
            }
            match self.reposition(id) {
                Ok(()) => {
                    self.nodes[id.0].pending.reposition = false;
                    self.nodes[id.0].sync_state();
                    report.repositioned += 1;
                }
                Err(error) => {
                    report.errors += 1;
                    self.handle_render_error(
                        id,
                        InvalidationKind::Reposition,
                        error,
                        &mut reactions,
                    );
                }
            }
        }

        self.apply_reactions(reactions);
        debug!(
            laid_out = report.laid_out,
            drawn = report.drawn,
            repositioned = report.repositioned,
            errors = report.errors,
            "drain pass complete"
        );
        report
    }

    fn is_live(&self, id: DrawableId) -> bool {
        self.drawable(id)
            .is_some_and(|n| !n.is_disposed() && !n.is_failed())
    }

    fn validate_layout(&mut self, id: DrawableId, pass_queue: &mut InvalidationQueue) {
        let node = &self.nodes[id.0];
        let Some(mode) = node.kind().layout_mode() else {
            let size = shapes::intrinsic_size(node);
            self.nodes[id.0].measured = size;
            return;
        };
        let padding = node.float("padding") as f32;
        let gap = node.float("gap") as f32;
        let children = node.children.clone();

        let mut metrics = Vec::with_capacity(children.len());
        for child_id in children {
            let child = &self.nodes[child_id.0];
            if child.is_disposed() {
                continue;
            }
            // Pending child containers ran earlier in this pass (depth order);
            // leaves are measured on the spot.
            let size = if child.kind().is_container() {
                child.measured()
            } else {
                shapes::intrinsic_size(child)
            };
            let offset = child.local_offset();
            self.nodes[child_id.0].measured = size;
            metrics.push(ChildMetrics { id: child_id, size, offset });
        }

        let result = arrange(mode, padding, gap, &metrics);
        let node = &self.nodes[id.0];
        let measured = Vec2::new(
            node.length("width").resolve(result.content_size.x),
            node.length("height").resolve(result.content_size.y),
        );
        let size_changed = self.nodes[id.0].measured != measured;
        self.nodes[id.0].measured = measured;

        // Slot assignments feed this pass's reposition phase directly; this is
        // an internal geometry write, not a property set, so the
        // defer-to-next-pass rule does not apply.
        for (child_id, slot) in result.slots {
            let child = &mut self.nodes[child_id.0];
            if child.slot_offset != slot {
                child.slot_offset = slot;
                child.pending.reposition = true;
                child.sync_state();
                pass_queue.enqueue(child_id, InvalidationKind::Reposition);
            }
        }

        // A container that was only layout-pending still needs its size
        // attributes pushed when measurement moved.
        if size_changed {
            self.nodes[id.0].pending.redraw = true;
            pass_queue.enqueue(id, InvalidationKind::Redraw);
        }
    }

    fn draw(&mut self, id: DrawableId) -> Result<(), ChartError> {
        let node = &self.nodes[id.0];
        let Some(element) = node.element else {
            return Ok(());
        };
        let attrs = shapes::attributes(node, &self.theme);
        self.backend.set_attributes(element, &attrs)
    }

    fn reposition(&mut self, id: DrawableId) -> Result<(), ChartError> {
        let node = &self.nodes[id.0];
        let parent_world = node
            .parent
            .map(|p| self.nodes[p.0].world_position)
            .unwrap_or(Vec2::ZERO);
        let local = node.slot_offset + node.local_offset();
        let rotation = node.float("rotation");
        let scale = node.float("scale");
        let element = node.element;

        self.nodes[id.0].world_position = parent_world + local;
        self.update_subtree_world(id);

        // The emitted transform is parent-relative; backend hierarchies
        // inherit parent motion, so untouched children need no new attributes.
        if let Some(el) = element {
            let transform = format!(
                "translate({},{}) rotate({}) scale({})",
                round1(local.x),
                round1(local.y),
                rotation,
                scale
            );
            self.backend.set_attributes(el, &[("transform", transform)])?;
        }
        Ok(())
    }

    /// Refreshes cached absolute positions below `id` (world positions are a
    /// query convenience; no backend traffic here).
    fn update_subtree_world(&mut self, id: DrawableId) {
        let mut stack = self.nodes[id.0].children.clone();
        while let Some(cid) = stack.pop() {
            let node = &self.nodes[cid.0];
            if node.is_disposed() {
                continue;
            }
            let Some(parent) = node.parent else {
                continue;
            };
            let local = node.slot_offset + node.local_offset();
            let world = self.nodes[parent.0].world_position + local;
            self.nodes[cid.0].world_position = world;
            stack.extend(self.nodes[cid.0].children.iter().copied());
        }
    }

    fn handle_render_error(
        &mut self,
        id: DrawableId,
        kind: InvalidationKind,
        error: ChartError,
        reactions: &mut Reactions,
    ) {
        warn!(drawable = id.0, %error, "backend write failed; pass continues");
        let node = &mut self.nodes[id.0];
        node.record_draw_failure();
        let failed = node.is_failed();
        let event = Event::Error { target: id, error };
        node.events.dispatch(&event, reactions);
        if failed {
            // Retry budget exhausted: stop scheduling this object.
            self.nodes[id.0].pending.clear();
            self.queue.remove(id);
        } else {
            // Stay flagged and retry the failed phase next pass.
            let node = &mut self.nodes[id.0];
            match kind {
                InvalidationKind::Redraw => node.pending.redraw = true,
                InvalidationKind::Reposition => node.pending.reposition = true,
                InvalidationKind::Layout => node.pending.layout = true,
            }
            self.queue.enqueue(id, kind);
        }
    }
}
