//! Published state snapshots.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::value::Value;

/// Live getters over an instance's state slots, keyed by variable name.
///
/// Reading a snapshot always yields the slot's current value, not the value
/// at publication time.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    getters: IndexMap<String, Rc<RefCell<Value>>>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn expose(&mut self, name: impl Into<String>, slot: Rc<RefCell<Value>>) {
        self.getters.insert(name.into(), slot);
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.getters.get(name).map(|slot| slot.borrow().clone())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.getters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.getters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.getters.is_empty()
    }
}
