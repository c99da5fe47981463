//! Drawing primitive backend boundary.
//!
//! The core drives a backend through three calls and never depends on its
//! representation; an SVG writer, a GPU scene, and the recording fake below
//! are all equally valid.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::ChartError;

/// Opaque handle to one backend element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

pub type Attribute = (&'static str, String);

pub trait DrawingBackend {
    fn create_element(&mut self, kind: &'static str) -> Result<ElementHandle, ChartError>;
    fn set_attributes(
        &mut self,
        element: ElementHandle,
        attributes: &[Attribute],
    ) -> Result<(), ChartError>;
    fn remove_element(&mut self, element: ElementHandle);
}

#[derive(Clone, Debug, PartialEq)]
pub enum BackendOp {
    Create { element: u64, kind: &'static str },
    SetAttributes { element: u64, attributes: Vec<Attribute> },
    Remove { element: u64 },
}

/// Shared view into a [`RecordingBackend`]'s operation log and failure
/// injection set. The backend itself moves into the scene; tests keep this.
#[derive(Clone, Default)]
pub struct RecordingHandle {
    log: Rc<RefCell<Vec<BackendOp>>>,
    failing: Rc<RefCell<HashSet<u64>>>,
}

impl RecordingHandle {
    pub fn ops(&self) -> Vec<BackendOp> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    fn is_draw(op: &BackendOp, filter: Option<u64>) -> bool {
        match op {
            // Transform-only writes come from the reposition phase, not draw().
            BackendOp::SetAttributes { element, attributes } => {
                filter.map_or(true, |f| *element == f)
                    && attributes.iter().any(|(name, _)| *name != "transform")
            }
            _ => false,
        }
    }

    /// Number of `draw()` attribute writes issued to `element`.
    pub fn draw_count(&self, element: u64) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|op| Self::is_draw(op, Some(element)))
            .count()
    }

    pub fn total_draws(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|op| Self::is_draw(op, None))
            .count()
    }

    /// Number of transform writes issued to `element`.
    pub fn transform_count(&self, element: u64) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|op| {
                matches!(op, BackendOp::SetAttributes { element: e, attributes }
                    if *e == element && attributes.iter().all(|(name, _)| *name == "transform"))
            })
            .count()
    }

    pub fn was_removed(&self, element: u64) -> bool {
        self.log
            .borrow()
            .iter()
            .any(|op| matches!(op, BackendOp::Remove { element: e } if *e == element))
    }

    /// Makes every subsequent attribute write on `element` fail.
    pub fn fail_element(&self, element: u64) {
        self.failing.borrow_mut().insert(element);
    }

    pub fn heal_element(&self, element: u64) {
        self.failing.borrow_mut().remove(&element);
    }

    /// Last attribute value written for `name` on `element`, if any.
    pub fn last_attribute(&self, element: u64, name: &str) -> Option<String> {
        self.log.borrow().iter().rev().find_map(|op| match op {
            BackendOp::SetAttributes { element: e, attributes } if *e == element => attributes
                .iter()
                .rev()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        })
    }
}

/// In-memory backend used by the test suite: records every operation and can
/// be told to reject writes on selected elements.
#[derive(Default)]
pub struct RecordingBackend {
    next_id: u64,
    handle: RecordingHandle,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> RecordingHandle {
        self.handle.clone()
    }
}

impl DrawingBackend for RecordingBackend {
    fn create_element(&mut self, kind: &'static str) -> Result<ElementHandle, ChartError> {
        let id = self.next_id;
        self.next_id += 1;
        self.handle
            .log
            .borrow_mut()
            .push(BackendOp::Create { element: id, kind });
        Ok(ElementHandle(id))
    }

    fn set_attributes(
        &mut self,
        element: ElementHandle,
        attributes: &[Attribute],
    ) -> Result<(), ChartError> {
        if self.handle.failing.borrow().contains(&element.0) {
            return Err(ChartError::Render {
                element: element.0,
                reason: "injected failure".to_string(),
            });
        }
        self.handle.log.borrow_mut().push(BackendOp::SetAttributes {
            element: element.0,
            attributes: attributes.to_vec(),
        });
        Ok(())
    }

    fn remove_element(&mut self, element: ElementHandle) {
        self.handle
            .log
            .borrow_mut()
            .push(BackendOp::Remove { element: element.0 });
    }
}
