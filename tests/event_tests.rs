//! Scene-level event dispatch and the deferred-reaction discipline that keeps
//! handler cascades flat.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chart_core::backend::RecordingHandle;
use chart_core::{
    ChartError, DrawableKind, Event, EventKind, Length, LayoutMode, PropertyValue,
    RecordingBackend, Scene,
};

fn scene() -> (Scene, RecordingHandle) {
    let backend = RecordingBackend::new();
    let handle = backend.handle();
    (Scene::new(Box::new(backend)), handle)
}

#[test]
fn property_changed_carries_old_and_new_values() {
    let (mut scene, _log) = scene();
    let col = scene.spawn(DrawableKind::Column).unwrap();
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    scene.on(
        col,
        EventKind::PropertyChanged,
        Box::new(move |event, _| {
            if let Event::PropertyChanged { name, old, new, .. } = event {
                *sink.borrow_mut() = Some((*name, old.clone(), new.clone()));
            }
        }),
    );

    scene.set(col, "opacity", 0.5);
    let (name, old, new) = seen.borrow().clone().unwrap();
    assert_eq!(name, "opacity");
    assert_eq!(old, PropertyValue::Float(1.0));
    assert_eq!(new, PropertyValue::Float(0.5));
}

#[test]
fn unknown_property_reports_instead_of_panicking() {
    let (mut scene, _log) = scene();
    let col = scene.spawn(DrawableKind::Column).unwrap();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = errors.clone();
    scene.on(
        col,
        EventKind::Error,
        Box::new(move |event, _| {
            if let Event::Error { error, .. } = event {
                sink.borrow_mut().push(error.to_string());
            }
        }),
    );

    assert!(!scene.set(col, "no_such_property", 1.0));
    assert_eq!(errors.borrow().len(), 1);
    assert!(errors.borrow()[0].contains("no_such_property"));
}

#[test]
fn type_mismatch_keeps_the_last_valid_value() {
    let (mut scene, _log) = scene();
    let col = scene.spawn(DrawableKind::Column).unwrap();
    scene.set(col, "width", Length::Px(30.0));

    let errors = Rc::new(Cell::new(0));
    let sink = errors.clone();
    scene.on(
        col,
        EventKind::Error,
        Box::new(move |event, _| {
            if matches!(event, Event::Error { error: ChartError::Configuration { .. }, .. }) {
                sink.set(sink.get() + 1);
            }
        }),
    );

    assert!(!scene.set(col, "width", 12.0));
    assert_eq!(errors.get(), 1);
    assert_eq!(
        scene.get(col, "width"),
        Some(PropertyValue::Length(Length::Px(30.0)))
    );
}

#[test]
fn non_finite_floats_are_rejected_with_an_error_event() {
    let (mut scene, _log) = scene();
    let col = scene.spawn(DrawableKind::Column).unwrap();
    let errors = Rc::new(Cell::new(0));
    let sink = errors.clone();
    scene.on(
        col,
        EventKind::Error,
        Box::new(move |_, _| sink.set(sink.get() + 1)),
    );

    assert!(!scene.set(col, "opacity", f64::NAN));
    assert!(!scene.set(col, "x", f64::INFINITY));
    assert_eq!(errors.get(), 2);
    assert_eq!(scene.get(col, "opacity"), Some(PropertyValue::Float(1.0)));
}

#[test]
fn handler_sets_cascade_without_recursion() {
    let (mut scene, _log) = scene();
    let a = scene.spawn(DrawableKind::Column).unwrap();
    let b = scene.spawn(DrawableKind::Column).unwrap();

    // a.opacity -> b.opacity -> b.corner_radius, drained flat.
    scene.on(
        a,
        EventKind::PropertyChanged,
        Box::new(move |event, reactions| {
            if let Event::PropertyChanged { name: "opacity", new, .. } = event {
                reactions.set(b, "opacity", new.clone());
            }
        }),
    );
    scene.on(
        b,
        EventKind::PropertyChanged,
        Box::new(move |event, reactions| {
            if matches!(event, Event::PropertyChanged { name: "opacity", .. }) {
                reactions.set(b, "corner_radius", 2.0);
            }
        }),
    );

    scene.set(a, "opacity", 0.5);
    assert_eq!(scene.get(b, "opacity"), Some(PropertyValue::Float(0.5)));
    assert_eq!(scene.get(b, "corner_radius"), Some(PropertyValue::Float(2.0)));
}

#[test]
fn ping_pong_cascade_is_cut_off_by_equality() {
    let (mut scene, _log) = scene();
    let a = scene.spawn(DrawableKind::Column).unwrap();
    let b = scene.spawn(DrawableKind::Column).unwrap();

    // Mutual mirroring converges because the second write of an equal value
    // is suppressed before it can dispatch.
    scene.on(
        a,
        EventKind::PropertyChanged,
        Box::new(move |event, reactions| {
            if let Event::PropertyChanged { new, .. } = event {
                reactions.set(b, "opacity", new.clone());
            }
        }),
    );
    scene.on(
        b,
        EventKind::PropertyChanged,
        Box::new(move |event, reactions| {
            if let Event::PropertyChanged { new, .. } = event {
                reactions.set(a, "opacity", new.clone());
            }
        }),
    );

    scene.set(a, "opacity", 0.25);
    assert_eq!(scene.get(a, "opacity"), Some(PropertyValue::Float(0.25)));
    assert_eq!(scene.get(b, "opacity"), Some(PropertyValue::Float(0.25)));
}

#[test]
fn handler_can_unsubscribe_itself_through_reactions() {
    let (mut scene, _log) = scene();
    let col = scene.spawn(DrawableKind::Column).unwrap();
    let hits = Rc::new(Cell::new(0));

    let counter = hits.clone();
    let slot: Rc<Cell<Option<chart_core::events::SubscriptionId>>> = Rc::new(Cell::new(None));
    let slot_in = slot.clone();
    let sub = scene
        .on(
            col,
            EventKind::PropertyChanged,
            Box::new(move |_, reactions| {
                counter.set(counter.get() + 1);
                if let Some(sub) = slot_in.get() {
                    reactions.unsubscribe(col, sub);
                }
            }),
        )
        .unwrap();
    slot.set(Some(sub));

    scene.set(col, "opacity", 0.5);
    scene.set(col, "opacity", 0.7);
    assert_eq!(hits.get(), 1);
}

#[test]
fn disabled_events_drop_silently_and_resume_on_enable() {
    let (mut scene, _log) = scene();
    let col = scene.spawn(DrawableKind::Column).unwrap();
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    scene.on(
        col,
        EventKind::PropertyChanged,
        Box::new(move |_, _| counter.set(counter.get() + 1)),
    );

    scene.disable_events(col);
    scene.set(col, "opacity", 0.5);
    assert_eq!(hits.get(), 0);

    scene.enable_events(col);
    scene.set(col, "opacity", 0.7);
    assert_eq!(hits.get(), 1);
}

#[test]
fn child_inserted_reports_parent_child_and_index() {
    let (mut scene, _log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let a = scene.spawn(DrawableKind::Column).unwrap();
    let b = scene.spawn(DrawableKind::Column).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    scene.on(
        root,
        EventKind::ChildInserted,
        Box::new(move |event, _| {
            if let Event::ChildInserted { child, index, .. } = event {
                sink.borrow_mut().push((*child, *index));
            }
        }),
    );

    scene.add_child(root, a);
    scene.insert_child(root, 0, b);
    assert_eq!(*seen.borrow(), vec![(a, 0), (b, 0)]);
    assert_eq!(scene.drawable(root).unwrap().children(), &[b, a]);
}

#[test]
fn adapters_shape_reads_without_touching_the_store() {
    let (mut scene, _log) = scene();
    let col = scene.spawn(DrawableKind::Column).unwrap();
    scene.set(col, "opacity", 0.5);
    scene.add_adapter(col, "opacity", |v| match v {
        PropertyValue::Float(f) => PropertyValue::Float(f.clamp(0.0, 0.3)),
        other => other,
    });

    assert_eq!(scene.get(col, "opacity"), Some(PropertyValue::Float(0.3)));
    // The stored value is untouched, so an equal set is still suppressed.
    assert!(!scene.set(col, "opacity", 0.5));
}
