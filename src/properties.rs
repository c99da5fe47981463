use std::collections::HashMap;
use std::sync::Arc;

use crate::data::DataSet;
use crate::error::ChartError;
use crate::theme::Rgba;

/// A size that is either resolved from layout or pinned in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Length {
    #[default]
    Auto,
    Px(f32),
}

impl Length {
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Pixel value with a fallback for `Auto`.
    pub fn resolve(&self, auto: f32) -> f32 {
        match self {
            Self::Auto => auto,
            Self::Px(v) => *v,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Float(f64),
    Length(Length),
    Bool(bool),
    Text(String),
    Color(Rgba),
    Data(Arc<DataSet>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Length,
    Bool,
    Text,
    Color,
    Data,
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Float(_) => ValueKind::Float,
            Self::Length(_) => ValueKind::Length,
            Self::Bool(_) => ValueKind::Bool,
            Self::Text(_) => ValueKind::Text,
            Self::Color(_) => ValueKind::Color,
            Self::Data(_) => ValueKind::Data,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_length(&self) -> Option<Length> {
        match self {
            Self::Length(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Arc<DataSet>> {
        match self {
            Self::Data(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Length> for PropertyValue {
    fn from(v: Length) -> Self {
        Self::Length(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Rgba> for PropertyValue {
    fn from(v: Rgba) -> Self {
        Self::Color(v)
    }
}

impl From<Arc<DataSet>> for PropertyValue {
    fn from(v: Arc<DataSet>) -> Self {
        Self::Data(v)
    }
}

/// What a change to the property invalidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidationEffect {
    /// Redraw this object only.
    Paint,
    /// Geometry translation only, no redraw.
    Position,
    /// Measured size may change: redraw this object, re-layout ancestors.
    Layout,
}

/// One entry of a drawable kind's static descriptor table.
///
/// The table is the whole property surface of that kind: a name outside it is
/// rejected at set time, so there is no arbitrary string-keyed bag at runtime.
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub kind: ValueKind,
    pub default: fn() -> PropertyValue,
    pub effect: InvalidationEffect,
}

type Adapter = Box<dyn Fn(PropertyValue) -> PropertyValue>;

/// Per-object property values with default fallback, equality-based change
/// suppression, and read-side adapters.
pub struct PropertyStore {
    descriptors: &'static [PropertyDescriptor],
    values: HashMap<&'static str, PropertyValue>,
    adapters: Vec<(&'static str, Adapter)>,
}

impl PropertyStore {
    pub fn new(descriptors: &'static [PropertyDescriptor]) -> Self {
        Self {
            descriptors,
            values: HashMap::new(),
            adapters: Vec::new(),
        }
    }

    pub fn descriptor(&self, name: &str) -> Option<&'static PropertyDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn descriptors(&self) -> &'static [PropertyDescriptor] {
        self.descriptors
    }

    pub fn has_explicit(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Stored value or descriptor default, without adapters.
    pub fn raw(&self, name: &str) -> Option<PropertyValue> {
        let desc = self.descriptor(name)?;
        Some(
            self.values
                .get(desc.name)
                .cloned()
                .unwrap_or_else(|| (desc.default)()),
        )
    }

    /// Stored value or descriptor default, with adapters applied in
    /// registration order.
    pub fn get(&self, name: &str) -> Option<PropertyValue> {
        let mut value = self.raw(name)?;
        for (adapted, f) in &self.adapters {
            if *adapted == name {
                value = f(value);
            }
        }
        Some(value)
    }

    /// Registers a read-side transform hook for one property.
    pub fn add_adapter(
        &mut self,
        name: &'static str,
        f: impl Fn(PropertyValue) -> PropertyValue + 'static,
    ) {
        self.adapters.push((name, Box::new(f)));
    }

    /// Stores a value. `Ok(Some((old, new)))` on a real change, `Ok(None)` when
    /// the value deep-equals the current one (stored or default), with no side
    /// effect in that case.
    pub fn set(&mut self, name: &str, value: PropertyValue) -> Result<Option<(PropertyValue, PropertyValue)>, ChartError> {
        let Some(desc) = self.descriptor(name) else {
            return Err(ChartError::UnknownProperty(name.to_string()));
        };
        if value.kind() != desc.kind {
            return Err(ChartError::Configuration {
                property: desc.name,
                reason: format!("expected {:?}, got {:?}", desc.kind, value.kind()),
            });
        }
        if let PropertyValue::Float(v) = value {
            if !v.is_finite() {
                return Err(ChartError::Configuration {
                    property: desc.name,
                    reason: format!("non-finite value {v}"),
                });
            }
        }

        let old = self
            .values
            .get(desc.name)
            .cloned()
            .unwrap_or_else(|| (desc.default)());
        if old == value {
            return Ok(None);
        }
        self.values.insert(desc.name, value.clone());
        Ok(Some((old, value)))
    }
}
