use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::runtime::callable::Callable;
use crate::runtime::value::Value;

pub type ObjectRef = Rc<RefCell<Object>>;

/// Upper bound on prototype links followed by a single lookup.
pub const MAX_PROTOTYPE_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub value: Value,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// A plain writable, enumerable, configurable data property.
    pub fn data(value: Value) -> Self {
        Self {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    pub fn read_only(value: Value) -> Self {
        Self {
            writable: false,
            ..Self::data(value)
        }
    }
}

/// A property bag with an optional prototype link. Function objects also
/// carry their call behavior.
#[derive(Default)]
pub struct Object {
    properties: HashMap<String, PropertyDescriptor>,
    prototype: Option<ObjectRef>,
    callable: Option<Callable>,
}

impl Object {
    pub fn new(prototype: Option<ObjectRef>) -> Self {
        Self {
            prototype,
            ..Self::default()
        }
    }

    pub fn function(callable: Callable, prototype: Option<ObjectRef>) -> Self {
        Self {
            prototype,
            callable: Some(callable),
            ..Self::default()
        }
    }

    pub fn into_ref(self) -> ObjectRef {
        Rc::new(RefCell::new(self))
    }

    pub fn callable(&self) -> Option<&Callable> {
        self.callable.as_ref()
    }

    pub fn prototype(&self) -> Option<ObjectRef> {
        self.prototype.clone()
    }

    pub fn get_own_property(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn define_own_property(&mut self, key: impl Into<String>, descriptor: PropertyDescriptor) {
        self.properties.insert(key.into(), descriptor);
    }

    /// Own property keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.properties.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

// Objects routinely reach themselves through properties and closures, so
// Debug stays shallow.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.keys())
            .field("has_prototype", &self.prototype.is_some())
            .field("callable", &self.callable)
            .finish()
    }
}

/// Own property first, then each prototype in turn. A missing property is
/// `undefined`.
pub fn get_property(object: &ObjectRef, key: &str) -> Result<Value, RuntimeError> {
    let mut current = Rc::clone(object);
    for _ in 0..=MAX_PROTOTYPE_DEPTH {
        let next = {
            let borrowed = current.borrow();
            if let Some(descriptor) = borrowed.get_own_property(key) {
                return Ok(descriptor.value.clone());
            }
            borrowed.prototype()
        };
        match next {
            Some(prototype) => current = prototype,
            None => return Ok(Value::Undefined),
        }
    }
    Err(RuntimeError::PrototypeChainTooDeep {
        limit: MAX_PROTOTYPE_DEPTH,
    })
}

pub fn has_property(object: &ObjectRef, key: &str) -> Result<bool, RuntimeError> {
    let mut current = Rc::clone(object);
    for _ in 0..=MAX_PROTOTYPE_DEPTH {
        let next = {
            let borrowed = current.borrow();
            if borrowed.has_own_property(key) {
                return Ok(true);
            }
            borrowed.prototype()
        };
        match next {
            Some(prototype) => current = prototype,
            None => return Ok(false),
        }
    }
    Err(RuntimeError::PrototypeChainTooDeep {
        limit: MAX_PROTOTYPE_DEPTH,
    })
}

/// Create or overwrite an own data property. Returns `false` when an
/// existing own property is read-only; the write is then dropped.
pub fn set_property(object: &ObjectRef, key: &str, value: Value) -> bool {
    let mut borrowed = object.borrow_mut();
    match borrowed.properties.get_mut(key) {
        Some(descriptor) if !descriptor.writable => false,
        Some(descriptor) => {
            descriptor.value = value;
            true
        }
        None => {
            borrowed.define_own_property(key, PropertyDescriptor::data(value));
            true
        }
    }
}

/// Replace the prototype link, refusing any link that would make `object`
/// reachable from its own prototype chain.
pub fn set_prototype(object: &ObjectRef, prototype: Option<ObjectRef>) -> Result<(), RuntimeError> {
    let mut cursor = prototype.clone();
    let mut depth = 0;
    while let Some(link) = cursor {
        if Rc::ptr_eq(&link, object) {
            return Err(RuntimeError::CyclicPrototype);
        }
        depth += 1;
        if depth > MAX_PROTOTYPE_DEPTH {
            return Err(RuntimeError::PrototypeChainTooDeep {
                limit: MAX_PROTOTYPE_DEPTH,
            });
        }
        cursor = link.borrow().prototype();
    }
    object.borrow_mut().prototype = prototype;
    Ok(())
}
