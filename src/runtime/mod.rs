//! Values, scopes and control-flow records the evaluator works with.

pub mod callable;
pub mod completion;
pub mod context;
pub mod environment;
pub mod number;
pub mod object;
pub mod reference;
pub mod value;

pub use callable::{Callable, NativeFunction, ScriptFunction};
pub use completion::{Completion, CompletionType};
pub use context::{ExecutionContext, Realm};
pub use environment::{DeclarationKind, EnvRef, Environment};
pub use object::{Object, ObjectRef, PropertyDescriptor};
pub use reference::{Reference, ReferenceBase};
pub use value::Value;
