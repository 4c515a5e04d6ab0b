//! Lexical environments.
//!
//! Each scope is a name table plus a strong link to its parent. Scopes are
//! shared (`Rc`) because closures keep their defining scope alive after the
//! block that created it has finished.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::error::RuntimeError;
use crate::value::Value;

struct Binding<'a> {
    value: Value<'a>,
    constant: bool,
}

#[derive(Default)]
struct Scope<'a> {
    vars: FxHashMap<&'a str, Binding<'a>>,
    parent: Option<Environment<'a>>,
}

/// A handle to one scope in the chain.
#[derive(Clone, Default)]
pub struct Environment<'a>(Rc<RefCell<Scope<'a>>>);

/// A handle that does not keep its scope alive.
#[derive(Clone)]
pub struct WeakEnvironment<'a>(Weak<RefCell<Scope<'a>>>);

impl<'a> WeakEnvironment<'a> {
    /// The scope, if something still holds it.
    pub fn upgrade(&self) -> Option<Environment<'a>> {
        self.0.upgrade().map(Environment)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl<'a> Environment<'a> {
    /// A root scope with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new scope whose parent is `self`.
    pub fn child(&self) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: Some(self.clone()),
        })))
    }

    /// Create or overwrite a binding in this scope.
    pub fn define(&self, name: &'a str, value: Value<'a>, constant: bool) {
        self.0
            .borrow_mut()
            .vars
            .insert(name, Binding { value, constant });
    }

    /// Resolve `name` from this scope outwards.
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        let mut scope = self.clone();
        loop {
            let parent = {
                let inner = scope.0.borrow();
                if let Some(binding) = inner.vars.get(name) {
                    return Some(binding.value.clone());
                }
                inner.parent.clone()
            };
            scope = parent?;
        }
    }

    /// Update the nearest existing binding of `name`.
    ///
    /// A name bound nowhere in the chain is created in this scope.
    pub fn assign(&self, name: &'a str, value: Value<'a>) -> Result<(), RuntimeError> {
        let mut scope = self.clone();
        loop {
            let parent = {
                let mut inner = scope.0.borrow_mut();
                if let Some(binding) = inner.vars.get_mut(name) {
                    if binding.constant {
                        return Err(RuntimeError::ConstAssignment(name.to_string()));
                    }
                    binding.value = value;
                    return Ok(());
                }
                inner.parent.clone()
            };
            match parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        self.define(name, value, false);
        Ok(())
    }

    /// Whether `name` is bound in this scope itself.
    #[cfg(test)]
    fn has_own(&self, name: &str) -> bool {
        self.0.borrow().vars.contains_key(name)
    }

    pub fn downgrade(&self) -> WeakEnvironment<'a> {
        WeakEnvironment(Rc::downgrade(&self.0))
    }

    /// Identity of the underlying scope.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Drop every binding and the parent link.
    ///
    /// Used at interpreter teardown to break closure/scope reference cycles.
    pub fn clear(&self) {
        // Move the contents out before dropping them: a dropped value may
        // own a closure whose scope is this one.
        let taken = std::mem::take(&mut *self.0.borrow_mut());
        drop(taken);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: Option<Value<'_>>) -> Option<f64> {
        match value {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        }
    }

    #[test]
    fn test_define_and_get() {
        let global = Environment::new();
        global.define("x", Value::Number(1.0), false);
        let inner = global.child();
        assert_eq!(number(inner.get("x")), Some(1.0));
        assert!(inner.get("missing").is_none());
    }

    #[test]
    fn test_shadowing_leaves_parent_alone() {
        let global = Environment::new();
        global.define("x", Value::Number(1.0), false);
        let inner = global.child();
        inner.define("x", Value::Number(2.0), false);
        assert_eq!(number(inner.get("x")), Some(2.0));
        assert_eq!(number(global.get("x")), Some(1.0));
    }

    #[test]
    fn test_assign_updates_nearest_binding() {
        let global = Environment::new();
        global.define("x", Value::Number(1.0), false);
        let inner = global.child();
        inner.assign("x", Value::Number(5.0)).unwrap();
        assert_eq!(number(global.get("x")), Some(5.0));
        assert!(!inner.has_own("x"));
    }

    #[test]
    fn test_assign_unbound_creates_in_current_scope() {
        let global = Environment::new();
        let inner = global.child();
        inner.assign("y", Value::Bool(true)).unwrap();
        assert!(inner.has_own("y"));
        assert!(global.get("y").is_none());
    }

    #[test]
    fn test_assign_constant_fails() {
        let global = Environment::new();
        global.define("k", Value::Number(1.0), true);
        let err = global.child().assign("k", Value::Number(2.0)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot assign to constant 'k'");
        assert_eq!(number(global.get("k")), Some(1.0));
    }

    #[test]
    fn test_weak_handle_follows_scope() {
        let global = Environment::new();
        let inner = global.child();
        let weak = inner.downgrade();
        assert!(weak.is_alive());
        let upgraded = weak.upgrade().unwrap();
        assert_eq!(upgraded.id(), inner.id());
        drop(upgraded);
        drop(inner);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
        assert!(global.downgrade().is_alive());
    }

    #[test]
    fn test_clear() {
        let global = Environment::new();
        let inner = global.child();
        inner.define("a", Value::Null, false);
        inner.clear();
        assert!(!inner.has_own("a"));
        global.define("b", Value::Null, false);
        assert!(inner.get("b").is_none());
    }
}
