//! Shared, mutable list storage.
//!
//! A [`List`] is a reference-counted handle: every clone observes the same
//! contents, which is how lists alias in the interpreted language. The
//! contents themselves live in an `im::Vector`, so copying them out by value
//! (for an undo record or a snapshot) is O(1).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use im::Vector;

use crate::value::{self, Value};

/// Shared handle to mutable list contents.
#[derive(Clone, Default)]
pub struct List(Rc<RefCell<Vector<Value>>>);

impl List {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list holding the given contents.
    #[must_use]
    pub fn from_contents(contents: Vector<Value>) -> Self {
        Self(Rc::new(RefCell::new(contents)))
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Gets a clone of the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Replaces the element at `index`, returning the previous element.
    ///
    /// Returns `None` (and changes nothing) when `index` is out of range.
    pub fn set(&self, index: usize, value: Value) -> Option<Value> {
        let mut contents = self.0.borrow_mut();
        if index >= contents.len() {
            return None;
        }
        Some(contents.set(index, value))
    }

    /// Appends an element.
    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push_back(value);
    }

    /// Removes and returns the last element.
    pub fn pop(&self) -> Option<Value> {
        self.0.borrow_mut().pop_back()
    }

    /// Removes and returns the element at `index`, if in range.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let mut contents = self.0.borrow_mut();
        if index >= contents.len() {
            return None;
        }
        Some(contents.remove(index))
    }

    /// Returns the current contents by value.
    #[must_use]
    pub fn contents(&self) -> Vector<Value> {
        self.0.borrow().clone()
    }

    /// Replaces the whole contents.
    pub fn replace(&self, contents: Vector<Value>) {
        *self.0.borrow_mut() = contents;
    }

    /// Returns the elements as a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().iter().cloned().collect()
    }

    /// Returns true if both handles refer to the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns an address identifying this list, for cycle detection.
    #[must_use]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_contents(iter.into_iter().collect())
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        items.into_iter().collect()
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        value::lists_equal(self, other, &mut Vec::new())
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::List(self.clone()).repr())
    }
}
