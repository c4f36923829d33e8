use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::Error;
use crate::evaluator::Evaluator;
use crate::parser;
use crate::runtime::Value;

/// Run the interactive REPL. Bindings persist across lines.
pub fn run_repl() -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut evaluator = Evaluator::new();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        editor.add_history_entry(trimmed)?;

        match eval_line(&mut evaluator, trimmed) {
            Ok(Some(shown)) => println!("{shown}"),
            Ok(None) => {}
            Err(Error::Compile(e)) => {
                let source = complete_statement(trimmed);
                eprintln!("{:?}", miette::Report::new(e.with_source_code("repl", source)));
            }
            Err(Error::Runtime(e)) => eprintln!("{e}"),
        }
    }
    Ok(())
}

/// Evaluate one input line. Returns the text to echo: the completion value,
/// unless the line produced nothing or `undefined`.
fn eval_line(evaluator: &mut Evaluator, line: &str) -> Result<Option<String>, Error> {
    let program = parser::parse(&complete_statement(line))?;
    let completion = evaluator.evaluate(&program)?;
    Ok(match completion.value {
        Some(Value::Undefined) | None => None,
        Some(value) => Some(value.to_string()),
    })
}

/// Lets a bare expression be typed without its trailing semicolon. A line
/// that already parses is left alone.
fn complete_statement(line: &str) -> String {
    if parser::parse(line).is_ok() {
        line.to_string()
    } else {
        format!("{line};")
    }
}
