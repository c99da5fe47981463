//! Concrete drawable variants and their property surfaces.
//!
//! Each kind binds a static descriptor table (validated at set time) and an
//! attribute generator invoked from `draw()`. The factory at the bottom is the
//! explicit create-by-name map: built once at init, passed by reference, no
//! ambient registry.

use std::collections::HashMap;
use std::sync::Arc;

use eyre::{eyre, Result};
use glam::Vec2;

use crate::backend::Attribute;
use crate::container::LayoutMode;
use crate::data::DataSet;
use crate::drawable::{Drawable, DrawableId};
use crate::path::{arc, round1, Path};
use crate::properties::{
    InvalidationEffect, Length, PropertyDescriptor, PropertyValue, ValueKind,
};
use crate::scene::Scene;
use crate::theme::{ChartTheme, Rgba};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawableKind {
    Container(LayoutMode),
    Circle,
    Ellipse,
    Column,
    RadarColumn,
    FlowLink,
    Label,
}

// Splices the base property surface every drawable carries ahead of the
// kind-specific entries.
macro_rules! descriptor_table {
    ($($name:literal : $kind:ident = $default:expr => $effect:ident),* $(,)?) => {
        &[
            PropertyDescriptor { name: "x", kind: ValueKind::Float, default: || PropertyValue::Float(0.0), effect: InvalidationEffect::Position },
            PropertyDescriptor { name: "y", kind: ValueKind::Float, default: || PropertyValue::Float(0.0), effect: InvalidationEffect::Position },
            PropertyDescriptor { name: "rotation", kind: ValueKind::Float, default: || PropertyValue::Float(0.0), effect: InvalidationEffect::Position },
            PropertyDescriptor { name: "scale", kind: ValueKind::Float, default: || PropertyValue::Float(1.0), effect: InvalidationEffect::Position },
            PropertyDescriptor { name: "width", kind: ValueKind::Length, default: || PropertyValue::Length(Length::Auto), effect: InvalidationEffect::Layout },
            PropertyDescriptor { name: "height", kind: ValueKind::Length, default: || PropertyValue::Length(Length::Auto), effect: InvalidationEffect::Layout },
            PropertyDescriptor { name: "fill", kind: ValueKind::Color, default: || PropertyValue::Color(Rgba::white()), effect: InvalidationEffect::Paint },
            PropertyDescriptor { name: "stroke", kind: ValueKind::Color, default: || PropertyValue::Color(Rgba::black()), effect: InvalidationEffect::Paint },
            PropertyDescriptor { name: "opacity", kind: ValueKind::Float, default: || PropertyValue::Float(1.0), effect: InvalidationEffect::Paint },
            PropertyDescriptor { name: "visible", kind: ValueKind::Bool, default: || PropertyValue::Bool(true), effect: InvalidationEffect::Paint },
            PropertyDescriptor { name: "data", kind: ValueKind::Data, default: || PropertyValue::Data(Arc::new(DataSet::default())), effect: InvalidationEffect::Paint },
            $(PropertyDescriptor { name: $name, kind: ValueKind::$kind, default: || $default, effect: InvalidationEffect::$effect },)*
        ]
    };
}

static CONTAINER_DESCRIPTORS: &[PropertyDescriptor] = descriptor_table![
    "padding": Float = PropertyValue::Float(0.0) => Layout,
    "gap": Float = PropertyValue::Float(0.0) => Layout,
];

static CIRCLE_DESCRIPTORS: &[PropertyDescriptor] = descriptor_table![
    "radius": Float = PropertyValue::Float(0.0) => Layout,
];

static ELLIPSE_DESCRIPTORS: &[PropertyDescriptor] = descriptor_table![
    "radius_x": Float = PropertyValue::Float(0.0) => Layout,
    "radius_y": Float = PropertyValue::Float(0.0) => Layout,
];

static COLUMN_DESCRIPTORS: &[PropertyDescriptor] = descriptor_table![
    "corner_radius": Float = PropertyValue::Float(0.0) => Paint,
];

static RADAR_COLUMN_DESCRIPTORS: &[PropertyDescriptor] = descriptor_table![
    "inner_radius": Float = PropertyValue::Float(0.0) => Layout,
    "outer_radius": Float = PropertyValue::Float(0.0) => Layout,
    "start_angle": Float = PropertyValue::Float(0.0) => Paint,
    "end_angle": Float = PropertyValue::Float(0.0) => Paint,
];

static FLOW_LINK_DESCRIPTORS: &[PropertyDescriptor] = descriptor_table![
    "start_x": Float = PropertyValue::Float(0.0) => Paint,
    "start_y": Float = PropertyValue::Float(0.0) => Paint,
    "end_x": Float = PropertyValue::Float(0.0) => Paint,
    "end_y": Float = PropertyValue::Float(0.0) => Paint,
    "waved": Bool = PropertyValue::Bool(false) => Paint,
    "wave_length": Float = PropertyValue::Float(16.0) => Paint,
    "wave_height": Float = PropertyValue::Float(6.0) => Paint,
    "bullet_position": Float = PropertyValue::Float(0.5) => Paint,
];

static LABEL_DESCRIPTORS: &[PropertyDescriptor] = descriptor_table![
    "text": Text = PropertyValue::Text(String::new()) => Layout,
    "font_size": Float = PropertyValue::Float(11.0) => Layout,
];

impl DrawableKind {
    pub fn descriptors(&self) -> &'static [PropertyDescriptor] {
        match self {
            Self::Container(_) => CONTAINER_DESCRIPTORS,
            Self::Circle => CIRCLE_DESCRIPTORS,
            Self::Ellipse => ELLIPSE_DESCRIPTORS,
            Self::Column => COLUMN_DESCRIPTORS,
            Self::RadarColumn => RADAR_COLUMN_DESCRIPTORS,
            Self::FlowLink => FLOW_LINK_DESCRIPTORS,
            Self::Label => LABEL_DESCRIPTORS,
        }
    }

    /// Element kind the backend is asked to create.
    pub fn element_kind(&self) -> &'static str {
        match self {
            Self::Container(_) => "group",
            Self::Circle | Self::Ellipse => "ellipse",
            Self::Column => "rect",
            Self::RadarColumn | Self::FlowLink => "path",
            Self::Label => "text",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    pub fn layout_mode(&self) -> Option<LayoutMode> {
        match self {
            Self::Container(mode) => Some(*mode),
            _ => None,
        }
    }
}

/// Size a leaf occupies before any explicit width/height override.
pub(crate) fn intrinsic_size(drawable: &Drawable) -> Vec2 {
    let natural = match drawable.kind {
        DrawableKind::Container(_) => drawable.measured(),
        DrawableKind::Circle => {
            let d = drawable.float("radius") as f32 * 2.0;
            Vec2::new(d, d)
        }
        DrawableKind::Ellipse => Vec2::new(
            drawable.float("radius_x") as f32 * 2.0,
            drawable.float("radius_y") as f32 * 2.0,
        ),
        DrawableKind::Column => Vec2::ZERO,
        DrawableKind::RadarColumn => {
            let d = drawable.float("outer_radius") as f32 * 2.0;
            Vec2::new(d, d)
        }
        DrawableKind::FlowLink => {
            let span_x = (drawable.float("end_x") - drawable.float("start_x")).abs() as f32;
            let span_y = (drawable.float("end_y") - drawable.float("start_y")).abs() as f32;
            Vec2::new(span_x, span_y)
        }
        DrawableKind::Label => {
            // No text system in the core; a character-count heuristic is
            // enough for stack layouts.
            let chars = drawable
                .get("text")
                .and_then(|v| v.as_text().map(|t| t.chars().count()))
                .unwrap_or(0) as f32;
            let font_size = drawable.float("font_size") as f32;
            Vec2::new(chars * font_size * 0.6, font_size * 1.2)
        }
    };
    Vec2::new(
        drawable.length("width").resolve(natural.x),
        drawable.length("height").resolve(natural.y),
    )
}

/// Builds the backend attribute set for one validated drawable. The theme
/// supplies fill and stroke for drawables that never set them explicitly.
pub(crate) fn attributes(drawable: &Drawable, theme: &ChartTheme) -> Vec<Attribute> {
    let size = intrinsic_size(drawable);
    let mut attrs: Vec<Attribute> = Vec::new();

    let visible = drawable
        .get("visible")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    attrs.push(("visibility", if visible { "visible" } else { "hidden" }.to_string()));
    attrs.push(("opacity", format!("{}", drawable.float("opacity"))));

    let fill = if drawable.has_explicit("fill") {
        drawable.get("fill").and_then(|v| v.as_color())
    } else {
        Some(theme.fill)
    };
    let stroke = if drawable.has_explicit("stroke") {
        drawable.get("stroke").and_then(|v| v.as_color())
    } else {
        Some(theme.stroke)
    };

    match drawable.kind {
        DrawableKind::Container(_) => {
            attrs.push(("width", format!("{}", round1(drawable.measured().x))));
            attrs.push(("height", format!("{}", round1(drawable.measured().y))));
        }
        DrawableKind::Circle => {
            let r = drawable.float("radius") as f32;
            attrs.push(("cx", format!("{}", round1(r))));
            attrs.push(("cy", format!("{}", round1(r))));
            attrs.push(("rx", format!("{}", round1(r))));
            attrs.push(("ry", format!("{}", round1(r))));
        }
        DrawableKind::Ellipse => {
            let rx = drawable.float("radius_x") as f32;
            let ry = drawable.float("radius_y") as f32;
            attrs.push(("cx", format!("{}", round1(rx))));
            attrs.push(("cy", format!("{}", round1(ry))));
            attrs.push(("rx", format!("{}", round1(rx))));
            attrs.push(("ry", format!("{}", round1(ry))));
        }
        DrawableKind::Column => {
            attrs.push(("width", format!("{}", round1(size.x))));
            attrs.push(("height", format!("{}", round1(size.y))));
            let corner = drawable.float("corner_radius") as f32;
            if corner > 0.0 {
                attrs.push(("rx", format!("{}", round1(corner))));
            }
        }
        DrawableKind::RadarColumn => {
            attrs.push(("d", radar_column_path(drawable).to_attribute()));
        }
        DrawableKind::FlowLink => {
            let path = flow_link_path(drawable);
            let bullet = path.point_at(drawable.float("bullet_position") as f32);
            attrs.push(("d", path.to_attribute()));
            attrs.push(("bullet-cx", format!("{}", round1(bullet.x))));
            attrs.push(("bullet-cy", format!("{}", round1(bullet.y))));
        }
        DrawableKind::Label => {
            let text = drawable
                .get("text")
                .and_then(|v| v.as_text().map(str::to_string))
                .unwrap_or_default();
            attrs.push(("text", text));
            attrs.push(("font-size", format!("{}", drawable.float("font_size"))));
        }
    }

    if let Some(c) = fill {
        attrs.push(("fill", c.to_css()));
    }
    if let Some(c) = stroke {
        attrs.push(("stroke", c.to_css()));
    }
    attrs
}

/// Annular sector between inner and outer radius across the angle span,
/// centered in the drawable's local box.
fn radar_column_path(drawable: &Drawable) -> Path {
    let outer = drawable.float("outer_radius") as f32;
    let inner = drawable.float("inner_radius") as f32;
    let start = drawable.float("start_angle") as f32;
    let end = drawable.float("end_angle") as f32;
    let center = Vec2::splat(outer);

    let mut path = Path::new();
    let outer_pts = arc(center, outer, start, end);
    let inner_pts = arc(center, inner, end, start);
    if let Some(first) = outer_pts.first() {
        path.move_to(*first);
        for p in &outer_pts[1..] {
            path.line_to(*p);
        }
        for p in &inner_pts {
            path.line_to(*p);
        }
        path.line_to(*first);
    }
    path
}

fn flow_link_path(drawable: &Drawable) -> Path {
    let from = Vec2::new(
        drawable.float("start_x") as f32,
        drawable.float("start_y") as f32,
    );
    let to = Vec2::new(drawable.float("end_x") as f32, drawable.float("end_y") as f32);
    let mut path = Path::new();
    path.move_to(from);
    let waved = drawable
        .get("waved")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if waved {
        path.waved_to(
            to,
            drawable.float("wave_length") as f32,
            drawable.float("wave_height") as f32,
        );
    } else {
        path.line_to(to);
    }
    path
}

/// Create-by-name map. Constructed at process init and passed by reference to
/// whatever needs dynamic instantiation.
pub struct DrawableFactory {
    map: HashMap<&'static str, DrawableKind>,
}

impl DrawableFactory {
    pub fn with_defaults() -> Self {
        let mut map = HashMap::new();
        map.insert("container", DrawableKind::Container(LayoutMode::Absolute));
        map.insert("circle", DrawableKind::Circle);
        map.insert("ellipse", DrawableKind::Ellipse);
        map.insert("column", DrawableKind::Column);
        map.insert("radar-column", DrawableKind::RadarColumn);
        map.insert("flow-link", DrawableKind::FlowLink);
        map.insert("label", DrawableKind::Label);
        Self { map }
    }

    pub fn register(&mut self, name: &'static str, kind: DrawableKind) {
        self.map.insert(name, kind);
    }

    pub fn kind(&self, name: &str) -> Option<DrawableKind> {
        self.map.get(name).copied()
    }

    /// Instantiates and configures a drawable in `scene`.
    pub fn create(&self, scene: &mut Scene, name: &str) -> Result<DrawableId> {
        let kind = self
            .kind(name)
            .ok_or_else(|| eyre!("unknown drawable kind `{name}`"))?;
        scene.spawn(kind)
    }
}
