use std::fmt;
use std::rc::Rc;

use crate::ast::SyntaxNode;
use crate::runtime::environment::EnvRef;

/// Call behavior carried by a function object.
#[derive(Debug, Clone)]
pub enum Callable {
    Native(NativeFunction),
    Script(Rc<ScriptFunction>),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Self::Native(native) => native.name(),
            Self::Script(function) => &function.name,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => write!(f, "function {}() {{ [native code] }}", self.name()),
            Self::Script(_) => write!(f, "function {}() {{}}", self.name()),
        }
    }
}

/// Host functions installed on the global object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFunction {
    Log,
}

impl NativeFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Log => "log",
        }
    }
}

/// A function declared in script. `scope` is the lexical environment the
/// declaration was evaluated in.
pub struct ScriptFunction {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Rc<SyntaxNode>,
    pub scope: EnvRef,
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::runtime::environment::Environment;

    #[test]
    fn native_display_and_name() {
        let log = Callable::Native(NativeFunction::Log);
        assert_eq!(log.name(), "log");
        assert_eq!(log.to_string(), "function log() { [native code] }");
    }

    #[test]
    fn script_display() {
        let function = Callable::Script(Rc::new(ScriptFunction {
            name: "add".to_string(),
            parameters: vec!["a".to_string(), "b".to_string()],
            body: Rc::new(SyntaxNode::new(NodeKind::FunctionBody, Vec::new())),
            scope: Environment::declarative(None).into_ref(),
        }));
        assert_eq!(function.to_string(), "function add() {}");
        assert!(format!("{function:?}").contains("add"));
    }
}
