use crate::runtime::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CompletionType {
    Normal,
    Break,
    Continue,
    Return,
}

/// Outcome of evaluating a statement. Anything other than `Normal` stops the
/// enclosing statement list and travels outward until a loop, label or
/// function body consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub kind: CompletionType,
    /// `None` is the empty value: the statement produced nothing.
    pub value: Option<Value>,
    /// Label named by `break label` / `continue label`.
    pub target: Option<String>,
}

impl Completion {
    pub fn normal(value: Option<Value>) -> Self {
        Self {
            kind: CompletionType::Normal,
            value,
            target: None,
        }
    }

    pub fn empty() -> Self {
        Self::normal(None)
    }

    pub fn breaking(target: Option<String>) -> Self {
        Self {
            kind: CompletionType::Break,
            value: None,
            target,
        }
    }

    pub fn continuing(target: Option<String>) -> Self {
        Self {
            kind: CompletionType::Continue,
            value: None,
            target,
        }
    }

    pub fn returning(value: Value) -> Self {
        Self {
            kind: CompletionType::Return,
            value: Some(value),
            target: None,
        }
    }

    pub fn is_abrupt(&self) -> bool {
        self.kind != CompletionType::Normal
    }

    /// Fill an empty value with `value`, keeping kind and target.
    pub fn update_empty(mut self, value: Option<Value>) -> Self {
        if self.value.is_none() {
            self.value = value;
        }
        self
    }

    /// The produced value, `undefined` when empty.
    pub fn value(&self) -> Value {
        self.value.clone().unwrap_or(Value::Undefined)
    }
}
