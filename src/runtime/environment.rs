use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::runtime::object::{self, ObjectRef, PropertyDescriptor};
use crate::runtime::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
    Function,
    Parameter,
}

impl DeclarationKind {
    fn is_lexical(self) -> bool {
        matches!(self, Self::Let | Self::Const)
    }
}

enum Storage {
    Declarative(HashMap<String, Value>),
    /// Bindings are the properties of a host object (the global scope).
    Object(ObjectRef),
}

/// One scope frame. `outer` is a lookup link toward the enclosing scope;
/// chains are built innermost-first and never point back inward.
pub struct Environment {
    storage: Storage,
    declared: HashMap<String, DeclarationKind>,
    outer: Option<EnvRef>,
    this_value: Option<Value>,
}

impl Environment {
    pub fn declarative(outer: Option<EnvRef>) -> Self {
        Self {
            storage: Storage::Declarative(HashMap::new()),
            declared: HashMap::new(),
            outer,
            this_value: None,
        }
    }

    pub fn object(bindings: ObjectRef, outer: Option<EnvRef>) -> Self {
        Self {
            storage: Storage::Object(bindings),
            declared: HashMap::new(),
            outer,
            this_value: None,
        }
    }

    /// Make this environment the one `this` resolves to.
    pub fn with_this(mut self, this_value: Value) -> Self {
        self.this_value = Some(this_value);
        self
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn outer(&self) -> Option<EnvRef> {
        self.outer.clone()
    }

    pub fn has_own_binding(&self, name: &str) -> bool {
        match &self.storage {
            Storage::Declarative(values) => values.contains_key(name),
            Storage::Object(bindings) => bindings.borrow().has_own_property(name),
        }
    }

    fn has_binding(&self, name: &str) -> Result<bool, RuntimeError> {
        match &self.storage {
            Storage::Declarative(values) => Ok(values.contains_key(name)),
            Storage::Object(bindings) => object::has_property(bindings, name),
        }
    }

    /// Create an `undefined` binding. Re-declaring is a no-op unless either
    /// side is `let`/`const`, which is an error.
    pub fn declare(&mut self, name: &str, kind: DeclarationKind) -> Result<(), RuntimeError> {
        if self.has_own_binding(name) {
            let existing = self.declared.get(name).copied();
            if kind.is_lexical() || existing.is_some_and(DeclarationKind::is_lexical) {
                return Err(RuntimeError::Redeclaration {
                    name: name.to_string(),
                });
            }
            return Ok(());
        }
        self.declared.insert(name.to_string(), kind);
        match &mut self.storage {
            Storage::Declarative(values) => {
                values.insert(name.to_string(), Value::Undefined);
            }
            Storage::Object(bindings) => {
                let descriptor = match kind {
                    DeclarationKind::Const => PropertyDescriptor::read_only(Value::Undefined),
                    _ => PropertyDescriptor::data(Value::Undefined),
                };
                bindings.borrow_mut().define_own_property(name, descriptor);
            }
        }
        Ok(())
    }

    /// Set a binding's value regardless of mutability. Used for function
    /// declarations and parameters.
    pub fn initialize(&mut self, name: &str, value: Value) {
        match &mut self.storage {
            Storage::Declarative(values) => {
                values.insert(name.to_string(), value);
            }
            Storage::Object(bindings) => {
                let mut bindings = bindings.borrow_mut();
                let descriptor = match bindings.get_own_property(name) {
                    Some(existing) => PropertyDescriptor {
                        value,
                        ..existing.clone()
                    },
                    None => PropertyDescriptor::data(value),
                };
                bindings.define_own_property(name, descriptor);
            }
        }
    }

    pub fn get_binding_value(&self, name: &str) -> Result<Value, RuntimeError> {
        match &self.storage {
            Storage::Declarative(values) => {
                values
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::Unresolvable {
                        name: name.to_string(),
                    })
            }
            Storage::Object(bindings) => object::get_property(bindings, name),
        }
    }

    pub fn set_mutable_binding(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if self.declared.get(name) == Some(&DeclarationKind::Const) {
            return Err(RuntimeError::ConstantAssignment {
                name: name.to_string(),
            });
        }
        match &mut self.storage {
            Storage::Declarative(values) => match values.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(RuntimeError::Unresolvable {
                    name: name.to_string(),
                }),
            },
            Storage::Object(bindings) => {
                object::set_property(bindings, name, value);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.declared.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Environment")
            .field(
                "kind",
                &match self.storage {
                    Storage::Declarative(_) => "declarative",
                    Storage::Object(_) => "object",
                },
            )
            .field("declared", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

/// The innermost environment in the chain starting at `env` that binds
/// `name`.
pub fn resolve(env: &EnvRef, name: &str) -> Result<Option<EnvRef>, RuntimeError> {
    let mut current = Some(Rc::clone(env));
    while let Some(scope) = current {
        if scope.borrow().has_binding(name)? {
            return Ok(Some(scope));
        }
        current = scope.borrow().outer();
    }
    Ok(None)
}

/// The `this` of the nearest environment that provides one.
pub fn resolve_this(env: &EnvRef) -> Value {
    let mut current = Some(Rc::clone(env));
    while let Some(scope) = current {
        if let Some(this_value) = &scope.borrow().this_value {
            return this_value.clone();
        }
        current = scope.borrow().outer();
    }
    Value::Undefined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::object::Object;

    #[test]
    fn declare_and_get() {
        let mut env = Environment::declarative(None);
        env.declare("x", DeclarationKind::Let).unwrap();
        assert_eq!(env.get_binding_value("x").unwrap(), Value::Undefined);
        env.set_mutable_binding("x", Value::Number(42.0)).unwrap();
        assert_eq!(env.get_binding_value("x").unwrap(), Value::Number(42.0));
    }

    #[test]
    fn var_redeclaration_is_a_no_op() {
        let mut env = Environment::declarative(None);
        env.declare("x", DeclarationKind::Var).unwrap();
        env.set_mutable_binding("x", Value::Number(1.0)).unwrap();
        env.declare("x", DeclarationKind::Var).unwrap();
        assert_eq!(env.get_binding_value("x").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn lexical_redeclaration_is_an_error() {
        let mut env = Environment::declarative(None);
        env.declare("x", DeclarationKind::Let).unwrap();
        assert!(matches!(
            env.declare("x", DeclarationKind::Var),
            Err(RuntimeError::Redeclaration { .. })
        ));
        env.declare("y", DeclarationKind::Var).unwrap();
        assert!(matches!(
            env.declare("y", DeclarationKind::Const),
            Err(RuntimeError::Redeclaration { .. })
        ));
    }

    #[test]
    fn const_rejects_assignment() {
        let mut env = Environment::declarative(None);
        env.declare("k", DeclarationKind::Const).unwrap();
        assert_eq!(
            env.set_mutable_binding("k", Value::Number(1.0)),
            Err(RuntimeError::ConstantAssignment {
                name: "k".to_string()
            })
        );
    }

    #[test]
    fn object_backed_bindings_live_on_the_object() {
        let global = Object::new(None).into_ref();
        let mut env = Environment::object(Rc::clone(&global), None);
        env.declare("g", DeclarationKind::Var).unwrap();
        env.set_mutable_binding("g", Value::Boolean(true)).unwrap();
        assert_eq!(
            object::get_property(&global, "g").unwrap(),
            Value::Boolean(true)
        );
        env.declare("c", DeclarationKind::Const).unwrap();
        assert!(env.set_mutable_binding("c", Value::Null).is_err());
    }

    #[test]
    fn resolve_walks_outward() {
        let outer = Environment::declarative(None).into_ref();
        outer.borrow_mut().declare("x", DeclarationKind::Var).unwrap();
        let inner = Environment::declarative(Some(Rc::clone(&outer))).into_ref();
        let found = resolve(&inner, "x").unwrap().unwrap();
        assert!(Rc::ptr_eq(&found, &outer));
        assert!(resolve(&inner, "y").unwrap().is_none());
    }

    #[test]
    fn inner_declaration_shadows() {
        let outer = Environment::declarative(None).into_ref();
        outer.borrow_mut().declare("x", DeclarationKind::Let).unwrap();
        let inner = Environment::declarative(Some(Rc::clone(&outer))).into_ref();
        inner.borrow_mut().declare("x", DeclarationKind::Let).unwrap();
        let found = resolve(&inner, "x").unwrap().unwrap();
        assert!(Rc::ptr_eq(&found, &inner));
    }

    #[test]
    fn this_comes_from_nearest_provider() {
        let global = Environment::declarative(None)
            .with_this(Value::Number(1.0))
            .into_ref();
        let block = Environment::declarative(Some(Rc::clone(&global))).into_ref();
        assert_eq!(resolve_this(&block), Value::Number(1.0));
        let function = Environment::declarative(Some(block))
            .with_this(Value::Undefined)
            .into_ref();
        assert_eq!(resolve_this(&function), Value::Undefined);
    }
}
