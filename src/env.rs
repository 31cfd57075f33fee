// ABOUTME: Environment module for managing variable bindings and scopes

use crate::error::RuntimeError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame in the environment chain. The chain as a whole realizes the
/// spec's `Env`: `with_parent` is `extend` (prepend a frame, never mutating
/// the parent), `get` is `find` (head-to-tail scan), `set` is `modify`
/// (in-place rebind of the first match anywhere in the chain). `define`
/// only ever touches the frame it's called on, which is what lets `let`,
/// `lambda` application, and `letrec` each introduce exactly one new frame.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent (`extend`).
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope only (doesn't walk the parent chain).
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up a symbol in this scope, then parent scopes recursively
    /// (`find`).
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Whether `name` is bound anywhere in the chain, without cloning the
    /// value. Used by the parser's shadowing check.
    pub fn is_bound(&self, name: &str) -> bool {
        if self.bindings.borrow().contains_key(name) {
            return true;
        }
        self.parent.as_ref().is_some_and(|p| p.is_bound(name))
    }

    /// Rebinds an existing binding in place, walking the parent chain to
    /// find the nearest frame that already has `name` (`modify`). Used by
    /// `set!` and by `letrec`'s placeholder-to-value rebind.
    pub fn set(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        if let Some(ref parent) = self.parent {
            return parent.set(name, value);
        }
        Err(RuntimeError::UndefinedVariable(name.to_string()))
    }
}
