//! Container measurement and the pass ordering it relies on: layout resolves
//! children before parents, reposition applies parents before children.

use glam::Vec2;

use chart_core::backend::RecordingHandle;
use chart_core::{DrawableKind, InvalidationKind, Length, LayoutMode, RecordingBackend, Scene};

fn scene() -> (Scene, RecordingHandle) {
    let backend = RecordingBackend::new();
    let handle = backend.handle();
    (Scene::new(Box::new(backend)), handle)
}

fn column(scene: &mut Scene, width: f32, height: f32) -> chart_core::DrawableId {
    let id = scene.spawn(DrawableKind::Column).unwrap();
    scene.set(id, "width", Length::Px(width));
    scene.set(id, "height", Length::Px(height));
    id
}

#[test]
fn vertical_stack_measures_from_children() {
    let (mut scene, _log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let a = column(&mut scene, 30.0, 10.0);
    let b = column(&mut scene, 50.0, 10.0);
    scene.add_child(root, a);
    scene.add_child(root, b);
    scene.set(root, "gap", 4.0);
    scene.set(root, "padding", 5.0);
    scene.drain_pass();

    // width = 5 + 50 + 5, height = 5 + 10 + 4 + 10 + 5.
    assert_eq!(scene.measured_size(root), Some(Vec2::new(60.0, 34.0)));
    assert_eq!(scene.world_position(a), Some(Vec2::new(5.0, 5.0)));
    assert_eq!(scene.world_position(b), Some(Vec2::new(5.0, 19.0)));
}

#[test]
fn horizontal_stack_measures_from_children() {
    let (mut scene, _log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Horizontal)).unwrap();
    let a = column(&mut scene, 30.0, 10.0);
    let b = column(&mut scene, 20.0, 25.0);
    scene.add_child(root, a);
    scene.add_child(root, b);
    scene.set(root, "gap", 2.0);
    scene.drain_pass();

    // width = 30 + 2 + 20, height = max(10, 25).
    assert_eq!(scene.measured_size(root), Some(Vec2::new(52.0, 25.0)));
    assert_eq!(scene.world_position(b), Some(Vec2::new(32.0, 0.0)));
}

#[test]
fn nested_containers_resolve_inner_before_outer() {
    let (mut scene, _log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let mid = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let leaf = scene.spawn(DrawableKind::Column).unwrap();
    scene.add_child(root, mid);
    scene.add_child(mid, leaf);
    scene.drain_pass();

    scene.set(leaf, "width", Length::Px(50.0));
    scene.set(leaf, "height", Length::Px(20.0));
    scene.drain_pass();

    // The outer container reads the inner one's fresh measurement.
    assert_eq!(scene.measured_size(mid), Some(Vec2::new(50.0, 20.0)));
    assert_eq!(scene.measured_size(root), Some(Vec2::new(50.0, 20.0)));
}

#[test]
fn child_resize_draws_each_affected_object_once() {
    let (mut scene, log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let a = column(&mut scene, 30.0, 10.0);
    let b = column(&mut scene, 30.0, 10.0);
    scene.add_child(root, a);
    scene.add_child(root, b);
    scene.drain_pass();
    log.clear();

    scene.set(b, "width", Length::Px(50.0));
    let report = scene.drain_pass();

    assert_eq!(scene.measured_size(root), Some(Vec2::new(50.0, 20.0)));
    // The resized leaf re-measures, its container re-arranges.
    assert_eq!(report.laid_out, 2);
    // Only the resized child and the re-measured container redraw.
    assert_eq!(log.draw_count(scene.element_of(b).unwrap()), 1);
    assert_eq!(log.draw_count(scene.element_of(root).unwrap()), 1);
    assert_eq!(log.draw_count(scene.element_of(a).unwrap()), 0);
}

#[test]
fn gap_change_rearranges_validated_children() {
    let (mut scene, _log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let a = column(&mut scene, 20.0, 10.0);
    let b = column(&mut scene, 20.0, 10.0);
    scene.add_child(root, a);
    scene.add_child(root, b);
    scene.drain_pass();
    assert_eq!(scene.world_position(b), Some(Vec2::new(0.0, 10.0)));

    scene.set(root, "gap", 4.0);
    assert!(scene.is_pending(root, InvalidationKind::Layout));
    scene.drain_pass();

    assert_eq!(scene.world_position(b), Some(Vec2::new(0.0, 14.0)));
    assert_eq!(scene.measured_size(root), Some(Vec2::new(20.0, 24.0)));
}

#[test]
fn padding_change_rearranges_validated_children() {
    let (mut scene, _log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Horizontal)).unwrap();
    let a = column(&mut scene, 20.0, 10.0);
    scene.add_child(root, a);
    scene.drain_pass();

    scene.set(root, "padding", 6.0);
    scene.drain_pass();

    assert_eq!(scene.world_position(a), Some(Vec2::new(6.0, 6.0)));
    assert_eq!(scene.measured_size(root), Some(Vec2::new(32.0, 22.0)));
}

#[test]
fn pinning_a_nested_container_width_reaches_the_parent() {
    let (mut scene, _log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let inner = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let leaf = column(&mut scene, 50.0, 20.0);
    scene.add_child(root, inner);
    scene.add_child(inner, leaf);
    scene.drain_pass();
    assert_eq!(scene.measured_size(root), Some(Vec2::new(50.0, 20.0)));

    scene.set(inner, "width", Length::Px(80.0));
    scene.drain_pass();

    // The pinned container re-lays out first; the parent reads it fresh.
    assert_eq!(scene.measured_size(inner), Some(Vec2::new(80.0, 20.0)));
    assert_eq!(scene.measured_size(root), Some(Vec2::new(80.0, 20.0)));
}

#[test]
fn fixed_size_ancestor_stops_the_layout_climb() {
    let (mut scene, _log) = scene();
    let outer = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let inner = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let leaf = scene.spawn(DrawableKind::Column).unwrap();
    scene.add_child(outer, inner);
    scene.add_child(inner, leaf);
    scene.set(inner, "width", Length::Px(100.0));
    scene.set(inner, "height", Length::Px(100.0));
    scene.drain_pass();

    scene.set(leaf, "width", Length::Px(40.0));
    // The fixed-size parent re-arranges but absorbs the change.
    assert!(scene.is_pending(inner, InvalidationKind::Layout));
    assert!(!scene.is_pending(outer, InvalidationKind::Layout));
}

#[test]
fn auto_climb_reaches_every_dependent_ancestor() {
    let (mut scene, _log) = scene();
    let outer = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let inner = scene.spawn(DrawableKind::Container(LayoutMode::Vertical)).unwrap();
    let leaf = scene.spawn(DrawableKind::Column).unwrap();
    scene.add_child(outer, inner);
    scene.add_child(inner, leaf);
    scene.drain_pass();

    scene.set(leaf, "width", Length::Px(40.0));
    assert!(scene.is_pending(inner, InvalidationKind::Layout));
    assert!(scene.is_pending(outer, InvalidationKind::Layout));
}

#[test]
fn parent_motion_updates_descendant_world_positions() {
    let (mut scene, log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Absolute)).unwrap();
    let col = column(&mut scene, 10.0, 10.0);
    scene.add_child(root, col);
    scene.set(root, "x", 10.0);
    scene.set(col, "x", 5.0);
    scene.drain_pass();
    assert_eq!(scene.world_position(col), Some(Vec2::new(15.0, 0.0)));
    log.clear();

    scene.set(root, "x", 20.0);
    scene.drain_pass();

    assert_eq!(scene.world_position(root), Some(Vec2::new(20.0, 0.0)));
    assert_eq!(scene.world_position(col), Some(Vec2::new(25.0, 0.0)));
    // Transforms are parent-relative: the untouched child writes nothing.
    assert_eq!(log.transform_count(scene.element_of(root).unwrap()), 1);
    assert_eq!(log.transform_count(scene.element_of(col).unwrap()), 0);
}

#[test]
fn reposition_emits_rounded_parent_relative_transforms() {
    let (mut scene, log) = scene();
    let col = scene.spawn(DrawableKind::Column).unwrap();
    scene.set(col, "x", 10.04);
    scene.set(col, "y", 3.26);
    scene.drain_pass();

    let transform = log
        .last_attribute(scene.element_of(col).unwrap(), "transform")
        .unwrap();
    assert_eq!(transform, "translate(10,3.3) rotate(0) scale(1)");
}

#[test]
fn absolute_mode_leaves_offsets_to_the_children() {
    let (mut scene, _log) = scene();
    let root = scene.spawn(DrawableKind::Container(LayoutMode::Absolute)).unwrap();
    let a = column(&mut scene, 10.0, 10.0);
    scene.add_child(root, a);
    scene.set(a, "x", 40.0);
    scene.set(a, "y", 7.0);
    scene.drain_pass();

    // Extent covers offset + size; the slot itself stays at the origin.
    assert_eq!(scene.measured_size(root), Some(Vec2::new(50.0, 17.0)));
    assert_eq!(scene.world_position(a), Some(Vec2::new(40.0, 7.0)));
}
