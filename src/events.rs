use crate::drawable::DrawableId;
use crate::error::ChartError;
use crate::properties::PropertyValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PropertyChanged,
    ChildInserted,
    ChildRemoved,
    Error,
    Disposed,
}

#[derive(Clone, Debug)]
pub enum Event {
    PropertyChanged {
        target: DrawableId,
        name: &'static str,
        old: PropertyValue,
        new: PropertyValue,
    },
    ChildInserted {
        parent: DrawableId,
        child: DrawableId,
        index: usize,
    },
    ChildRemoved {
        parent: DrawableId,
        child: DrawableId,
    },
    Error {
        target: DrawableId,
        error: ChartError,
    },
    Disposed {
        target: DrawableId,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PropertyChanged { .. } => EventKind::PropertyChanged,
            Self::ChildInserted { .. } => EventKind::ChildInserted,
            Self::ChildRemoved { .. } => EventKind::ChildRemoved,
            Self::Error { .. } => EventKind::Error,
            Self::Disposed { .. } => EventKind::Disposed,
        }
    }
}

/// Deferred work a handler may request while an event is being dispatched.
///
/// Handlers never touch the scene directly (it is mutably borrowed during
/// dispatch); they record property sets, unsubscriptions, and disposals here,
/// and the scene drains the queue iteratively after dispatch returns. This is
/// the flat, non-recursive shape of reentrancy the whole crate relies on.
#[derive(Default)]
pub struct Reactions {
    pub(crate) sets: Vec<(DrawableId, &'static str, PropertyValue)>,
    pub(crate) unsubscribes: Vec<(DrawableId, SubscriptionId)>,
    pub(crate) disposals: Vec<DrawableId>,
}

impl Reactions {
    pub fn set(&mut self, target: DrawableId, name: &'static str, value: impl Into<PropertyValue>) {
        self.sets.push((target, name, value.into()));
    }

    pub fn unsubscribe(&mut self, owner: DrawableId, subscription: SubscriptionId) {
        self.unsubscribes.push((owner, subscription));
    }

    pub fn dispose(&mut self, target: DrawableId) {
        self.disposals.push(target);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty() && self.unsubscribes.is_empty() && self.disposals.is_empty()
    }
}

pub type Handler = Box<dyn FnMut(&Event, &mut Reactions)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
    once: bool,
    dead: bool,
}

/// Per-object publish/subscribe registry.
///
/// Handlers fire in subscription order. Dispatch iterates over a length
/// snapshot: handlers subscribed during a dispatch fire from the next dispatch
/// on, handlers dead-flagged during it are skipped without disturbing the rest
/// of the pass.
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: Vec<Subscription>,
    next_id: u64,
    disabled: bool,
    disposed: bool,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: EventKind, handler: Handler) -> SubscriptionId {
        self.subscribe(kind, handler, false)
    }

    /// Like `on`, but the handler is removed after its first invocation.
    pub fn once(&mut self, kind: EventKind, handler: Handler) -> SubscriptionId {
        self.subscribe(kind, handler, true)
    }

    fn subscribe(&mut self, kind: EventKind, handler: Handler, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        if !self.disposed {
            self.subscriptions.push(Subscription {
                id,
                kind,
                handler,
                once,
                dead: false,
            });
        }
        id
    }

    /// Guarantees the handler never fires again, including when called between
    /// two handler invocations of the same dispatch.
    pub fn off(&mut self, subscription: SubscriptionId) {
        for sub in &mut self.subscriptions {
            if sub.id == subscription {
                sub.dead = true;
            }
        }
        self.sweep();
    }

    /// Suppresses all dispatch until `enable`. Missed events are not queued.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled && !self.disposed
    }

    /// Removes every handler; the dispatcher stays inert afterwards.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.subscriptions.clear();
    }

    pub fn handler_count(&self) -> usize {
        self.subscriptions.iter().filter(|s| !s.dead).count()
    }

    pub fn dispatch(&mut self, event: &Event, reactions: &mut Reactions) {
        if self.disabled || self.disposed {
            return;
        }
        let kind = event.kind();
        let snapshot_len = self.subscriptions.len();
        for i in 0..snapshot_len {
            let sub = &mut self.subscriptions[i];
            if sub.dead || sub.kind != kind {
                continue;
            }
            if sub.once {
                sub.dead = true;
            }
            (sub.handler)(event, reactions);
        }
        self.sweep();
    }

    fn sweep(&mut self) {
        self.subscriptions.retain(|s| !s.dead);
    }
}
