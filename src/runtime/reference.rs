use crate::error::RuntimeError;
use crate::runtime::environment::EnvRef;
use crate::runtime::object::{self, ObjectRef};
use crate::runtime::value::Value;

#[derive(Debug, Clone)]
pub enum ReferenceBase {
    Environment(EnvRef),
    Object(ObjectRef),
    /// A property of a non-object value, e.g. `"abc".length` or `null.x`.
    Primitive(Value),
    Unresolvable,
}

/// A resolved assignable location: the binding or property `name` on `base`.
#[derive(Debug, Clone)]
pub struct Reference {
    pub base: ReferenceBase,
    pub name: String,
}

impl Reference {
    pub fn binding(env: EnvRef, name: impl Into<String>) -> Self {
        Self {
            base: ReferenceBase::Environment(env),
            name: name.into(),
        }
    }

    pub fn unresolvable(name: impl Into<String>) -> Self {
        Self {
            base: ReferenceBase::Unresolvable,
            name: name.into(),
        }
    }

    /// A property reference on an arbitrary value.
    pub fn property(base: Value, name: impl Into<String>) -> Self {
        let base = match base {
            Value::Object(object) => ReferenceBase::Object(object),
            other => ReferenceBase::Primitive(other),
        };
        Self {
            base,
            name: name.into(),
        }
    }

    pub fn get(&self) -> Result<Value, RuntimeError> {
        match &self.base {
            ReferenceBase::Environment(env) => env.borrow().get_binding_value(&self.name),
            ReferenceBase::Object(object) => object::get_property(object, &self.name),
            ReferenceBase::Primitive(value) if value.is_nullish() => Err(self.nullish(value)),
            ReferenceBase::Primitive(Value::String(s)) if self.name == "length" => {
                Ok(Value::Number(s.chars().count() as f64))
            }
            ReferenceBase::Primitive(_) => Ok(Value::Undefined),
            ReferenceBase::Unresolvable => Err(RuntimeError::Unresolvable {
                name: self.name.clone(),
            }),
        }
    }

    pub fn set(&self, value: Value) -> Result<(), RuntimeError> {
        match &self.base {
            ReferenceBase::Environment(env) => {
                env.borrow_mut().set_mutable_binding(&self.name, value)
            }
            ReferenceBase::Object(object) => {
                object::set_property(object, &self.name, value);
                Ok(())
            }
            ReferenceBase::Primitive(base) if base.is_nullish() => Err(self.nullish(base)),
            ReferenceBase::Primitive(_) => Ok(()),
            ReferenceBase::Unresolvable => Err(RuntimeError::Unresolvable {
                name: self.name.clone(),
            }),
        }
    }

    /// The `this` a call through this reference receives.
    pub fn this_value(&self) -> Value {
        match &self.base {
            ReferenceBase::Object(object) => Value::Object(object.clone()),
            ReferenceBase::Primitive(value) => value.clone(),
            ReferenceBase::Environment(_) | ReferenceBase::Unresolvable => Value::Undefined,
        }
    }

    fn nullish(&self, base: &Value) -> RuntimeError {
        RuntimeError::NullishPropertyAccess {
            property: self.name.clone(),
            base: base.to_string(),
        }
    }
}
