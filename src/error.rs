use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::scanner::token::Span;

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("scan error: {message}")]
    #[diagnostic(code(tinyscript::scan))]
    Scan {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("syntax error: {message}")]
    #[diagnostic(code(tinyscript::parse))]
    Parse {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    /// A declarative grammar that cannot be compiled into an automaton.
    #[error("grammar error: {message}")]
    #[diagnostic(code(tinyscript::grammar))]
    Grammar { message: String },
}

impl CompileError {
    pub fn scan(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Scan {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::Parse {
            message: message.into(),
            span: span.into(),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn grammar(message: impl Into<String>) -> Self {
        Self::Grammar {
            message: message.into(),
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let src = miette::NamedSource::new(name.into(), source.into());
        match self {
            Self::Scan { message, span, .. } => Self::Scan { message, span, src },
            Self::Parse { message, span, .. } => Self::Parse { message, span, src },
            grammar @ Self::Grammar { .. } => grammar,
        }
    }
}

// ============= Runtime errors =============

#[derive(Error, Debug, Clone, PartialEq, Diagnostic)]
pub enum RuntimeError {
    #[error("invalid digit '{digit}' in base-{radix} literal '{literal}'")]
    #[diagnostic(code(tinyscript::literal))]
    InvalidNumericLiteral {
        literal: String,
        digit: char,
        radix: u32,
    },

    #[error("{name} is not defined")]
    #[diagnostic(code(tinyscript::reference))]
    Unresolvable { name: String },

    #[error("{callee} is not a function")]
    #[diagnostic(code(tinyscript::call))]
    NotCallable { callee: String },

    #[error("{callee} is not a constructor")]
    #[diagnostic(code(tinyscript::call))]
    NotConstructor { callee: String },

    #[error("assignment to constant variable '{name}'")]
    #[diagnostic(code(tinyscript::binding))]
    ConstantAssignment { name: String },

    #[error("identifier '{name}' has already been declared")]
    #[diagnostic(code(tinyscript::binding))]
    Redeclaration { name: String },

    #[error("cannot access property '{property}' of {base}")]
    #[diagnostic(code(tinyscript::property))]
    NullishPropertyAccess { property: String, base: String },

    #[error("cyclic prototype chain")]
    #[diagnostic(code(tinyscript::prototype))]
    CyclicPrototype,

    #[error("prototype chain deeper than {limit}")]
    #[diagnostic(code(tinyscript::prototype))]
    PrototypeChainTooDeep { limit: usize },

    #[error("illegal {statement} statement")]
    #[diagnostic(code(tinyscript::jump))]
    IllegalJump { statement: String },

    #[error("undefined label '{label}'")]
    #[diagnostic(code(tinyscript::jump))]
    UndefinedLabel { label: String },

    #[error("invalid assignment target")]
    #[diagnostic(code(tinyscript::reference))]
    InvalidAssignmentTarget,

    #[error("maximum call stack size of {limit} exceeded")]
    #[diagnostic(code(tinyscript::call))]
    CallStackExceeded { limit: usize },

    #[error("cannot write output: {message}")]
    #[diagnostic(code(tinyscript::output))]
    Output { message: String },

    #[error("malformed syntax tree: {message}")]
    #[diagnostic(code(tinyscript::tree))]
    MalformedTree { message: String },
}

impl RuntimeError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTree {
            message: message.into(),
        }
    }
}

// ============= Crate-level error channel =============

/// Everything that can stop a script from running to completion.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}

// ============= Tests =============
