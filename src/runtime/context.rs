use std::rc::Rc;

use crate::runtime::environment::{EnvRef, Environment};
use crate::runtime::object::{Object, ObjectRef};
use crate::runtime::value::Value;

/// Intrinsics shared by everything evaluated in one session.
#[derive(Debug)]
pub struct Realm {
    pub global_object: ObjectRef,
    pub global_env: EnvRef,
    pub object_prototype: ObjectRef,
    pub function_prototype: ObjectRef,
}

impl Realm {
    pub fn new() -> Rc<Self> {
        let object_prototype = Object::new(None).into_ref();
        let function_prototype = Object::new(Some(object_prototype.clone())).into_ref();
        let global_object = Object::new(Some(object_prototype.clone())).into_ref();
        let global_env = Environment::object(global_object.clone(), None)
            .with_this(Value::Object(global_object.clone()))
            .into_ref();
        Rc::new(Self {
            global_object,
            global_env,
            object_prototype,
            function_prototype,
        })
    }
}

/// One frame of the context stack. Blocks get a fresh lexical environment
/// and keep the variable environment of their function or the global scope.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub lexical_environment: EnvRef,
    pub variable_environment: EnvRef,
    pub realm: Rc<Realm>,
}

impl ExecutionContext {
    pub fn global(realm: Rc<Realm>) -> Self {
        Self {
            lexical_environment: realm.global_env.clone(),
            variable_environment: realm.global_env.clone(),
            realm,
        }
    }

    /// A nested block scope inside this context.
    pub fn block(&self) -> Self {
        Self {
            lexical_environment: Environment::declarative(Some(self.lexical_environment.clone()))
                .into_ref(),
            variable_environment: self.variable_environment.clone(),
            realm: self.realm.clone(),
        }
    }

    /// The body scope of a call, whose own environment is also its variable
    /// environment.
    pub fn function(realm: Rc<Realm>, env: EnvRef) -> Self {
        Self {
            lexical_environment: env.clone(),
            variable_environment: env,
            realm,
        }
    }
}
