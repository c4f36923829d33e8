pub mod ast;
pub mod error;
pub mod evaluator;
pub mod grammar;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod scanner;

use evaluator::Evaluator;
use runtime::Completion;

// Re-export error types for convenience
pub use error::{CompileError, Error, RuntimeError};

/// Parse and evaluate a whole script in a fresh evaluator whose `log`
/// writes to stdout.
pub fn run(source: &str) -> Result<Completion, Error> {
    let program = parser::parse(source)?;
    Ok(Evaluator::new().evaluate(&program)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::Value;

    #[test]
    fn run_returns_the_script_completion() {
        let completion = run("let a; a = 2; a * 21;").expect("run should succeed");
        assert_eq!(completion.value(), Value::Number(42.0));
    }

    #[test]
    fn run_separates_compile_and_runtime_errors() {
        assert!(matches!(run("let;"), Err(Error::Compile(_))));
        assert!(matches!(run("nope;"), Err(Error::Runtime(_))));
    }
}
