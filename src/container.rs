//! Container layout strategies.
//!
//! Pure functions over child metrics: the scene collects sizes, calls
//! [`arrange`], and writes the returned slot offsets back. Keeping this free
//! of the arena makes the math unit-testable without a backend.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::drawable::DrawableId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Children position themselves through their own x/y properties.
    #[default]
    Absolute,
    /// Children stack top to bottom.
    Vertical,
    /// Children stack left to right.
    Horizontal,
}

/// Snapshot of one child the layout strategy needs.
#[derive(Clone, Copy, Debug)]
pub struct ChildMetrics {
    pub id: DrawableId,
    pub size: Vec2,
    /// The child's own x/y offset properties.
    pub offset: Vec2,
}

#[derive(Clone, Debug, Default)]
pub struct ArrangeResult {
    /// Slot offset per child, in container-local coordinates.
    pub slots: Vec<(DrawableId, Vec2)>,
    /// Size of the arranged content including padding; the container's
    /// measured size unless overridden by a fixed width/height.
    pub content_size: Vec2,
}

pub fn arrange(
    mode: LayoutMode,
    padding: f32,
    gap: f32,
    children: &[ChildMetrics],
) -> ArrangeResult {
    let mut result = ArrangeResult::default();
    match mode {
        LayoutMode::Absolute => {
            let mut extent = Vec2::ZERO;
            for child in children {
                // Slot stays at the origin; the child's own offset applies in
                // the reposition phase.
                result.slots.push((child.id, Vec2::ZERO));
                extent = extent.max(child.offset + child.size);
            }
            result.content_size = extent + Vec2::splat(padding * 2.0);
        }
        LayoutMode::Vertical => {
            let mut cursor = padding;
            let mut width = 0.0f32;
            for child in children {
                result.slots.push((child.id, Vec2::new(padding, cursor)));
                cursor += child.size.y + gap;
                width = width.max(child.size.x);
            }
            if !children.is_empty() {
                cursor -= gap;
            }
            result.content_size = Vec2::new(width + padding * 2.0, cursor + padding);
        }
        LayoutMode::Horizontal => {
            let mut cursor = padding;
            let mut height = 0.0f32;
            for child in children {
                result.slots.push((child.id, Vec2::new(cursor, padding)));
                cursor += child.size.x + gap;
                height = height.max(child.size.y);
            }
            if !children.is_empty() {
                cursor -= gap;
            }
            result.content_size = Vec2::new(cursor + padding, height + padding * 2.0);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(id: usize, w: f32, h: f32) -> ChildMetrics {
        ChildMetrics {
            id: DrawableId(id),
            size: Vec2::new(w, h),
            offset: Vec2::ZERO,
        }
    }

    #[test]
    fn vertical_stack_sums_heights() {
        let r = arrange(
            LayoutMode::Vertical,
            10.0,
            5.0,
            &[child(0, 40.0, 20.0), child(1, 60.0, 30.0)],
        );
        // Slots: first at padding, second below first plus gap.
        assert_eq!(r.slots[0].1, Vec2::new(10.0, 10.0));
        assert_eq!(r.slots[1].1, Vec2::new(10.0, 35.0));
        // 20 + 5 + 30 content, plus padding both sides; width is widest child.
        assert_eq!(r.content_size, Vec2::new(80.0, 75.0));
    }

    #[test]
    fn horizontal_stack_sums_widths() {
        let r = arrange(
            LayoutMode::Horizontal,
            0.0,
            2.0,
            &[child(0, 10.0, 8.0), child(1, 10.0, 12.0)],
        );
        assert_eq!(r.slots[1].1, Vec2::new(12.0, 0.0));
        assert_eq!(r.content_size, Vec2::new(22.0, 12.0));
    }

    #[test]
    fn absolute_extent_covers_offset_children() {
        let r = arrange(
            LayoutMode::Absolute,
            0.0,
            0.0,
            &[ChildMetrics {
                id: DrawableId(0),
                size: Vec2::new(10.0, 10.0),
                offset: Vec2::new(30.0, 5.0),
            }],
        );
        assert_eq!(r.content_size, Vec2::new(40.0, 15.0));
        assert_eq!(r.slots[0].1, Vec2::ZERO);
    }

    #[test]
    fn empty_container_collapses_to_padding() {
        let r = arrange(LayoutMode::Vertical, 4.0, 3.0, &[]);
        assert_eq!(r.content_size, Vec2::new(8.0, 8.0));
    }
}
