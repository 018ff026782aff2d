use std::{cell::RefCell, rc::Rc};

use thiserror::Error;

use super::prelude::Value;

/// Shared handle to a scope frame.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvironmentError {
    #[error("variable `{name}` is not defined")]
    Undefined {
        name: String
    },
    #[error("cannot reassign constant `{name}`")]
    Constant {
        name: String
    },
}

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    value: Value,
    constant: bool,
}

/// One scope frame. Bindings keep their declaration order.
#[derive(Debug, Default)]
pub struct Environment {
    store: Vec<Slot>,
    parent: Option<Env>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh outermost frame.
    pub fn global() -> Env {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn enclosed(parent: &Env) -> Env {
        Rc::new(RefCell::new(Self {
            store: vec![],
            parent: Some(parent.clone()),
        }))
    }

    /// Binds `name` in this frame, overwriting a binding of the same frame.
    pub fn define(&mut self, name: impl Into<String>, value: Value, constant: bool) {
        let name = name.into();

        match self.store.iter_mut().find(|slot| slot.name == name) {
            Some(slot) => {
                slot.value = value;
                slot.constant = constant;
            },
            None => self.store.push(Slot { name, value, constant })
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.get_local(name) {
            Some(value) => Some(value),
            None => self.parent.as_ref()?.borrow().get(name)
        }
    }

    /// Looks `name` up in this frame only.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.store.iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.value.clone())
    }

    /// Updates the nearest frame that binds `name`.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), EnvironmentError> {
        match self.store.iter_mut().find(|slot| slot.name == name) {
            Some(slot) if slot.constant => Err(EnvironmentError::Constant { name: name.to_string() }),
            Some(slot) => {
                slot.value = value;
                Ok(())
            },
            None => match &self.parent {
                Some(parent) => parent.borrow_mut().set(name, value),
                None => Err(EnvironmentError::Undefined { name: name.to_string() })
            }
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.store.iter().any(|slot| slot.name == name)
            || self.parent.as_ref().is_some_and(|parent| parent.borrow().exists(name))
    }

    pub fn is_constant(&self, name: &str) -> bool {
        match self.store.iter().find(|slot| slot.name == name) {
            Some(slot) => slot.constant,
            None => self.parent.as_ref().is_some_and(|parent| parent.borrow().is_constant(name))
        }
    }

    /// Names bound in this frame, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.store.iter().map(|slot| slot.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
