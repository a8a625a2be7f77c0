//! Opaque view-object references attached to model elements.
//!
//! The layout never inspects view objects. After a successful run it offers each element's final
//! geometry to the attached object, provided the object exposes the [`Updatable`] capability.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::graph::{Edge, Graph, Node};

/// Receives final geometry once a layout run succeeds.
pub trait Updatable {
    fn update_node(&mut self, _node: &Node) {}
    fn update_edge(&mut self, _edge: &Edge) {}
    fn update_graph(&mut self, _graph: &Graph) {}
}

/// An external object associated with a node, edge or graph.
pub trait ViewObject {
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        None
    }
}

/// Shared handle to a view object.
#[derive(Clone)]
pub struct ViewRef(Rc<RefCell<dyn ViewObject>>);

impl ViewRef {
    pub fn new<T: ViewObject + 'static>(object: Rc<RefCell<T>>) -> Self {
        Self(object)
    }

    /// Runs `f` with the updatable capability, if the object has one. Returns whether it ran.
    pub fn with_updatable(&self, f: impl FnOnce(&mut dyn Updatable)) -> bool {
        let mut object = self.0.borrow_mut();
        match object.as_updatable() {
            Some(updatable) => {
                f(updatable);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewRef(..)")
    }
}
