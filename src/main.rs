use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tinyscript::CompileError;
use tinyscript::ast::printer;
use tinyscript::evaluator::Evaluator;
use tinyscript::{parser, scanner};

#[derive(Parser, Debug)]
#[command(name = "tinyscript", about = "A small JavaScript-like script interpreter")]
struct Cli {
    /// Script file to run (omit for REPL)
    file: Option<PathBuf>,

    /// Dump tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump syntax tree and exit
    #[arg(long)]
    dump_ast: bool,

    /// Syntax tree output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,
}

/// Logging stays silent unless RUST_LOG is set.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .init();
    }
}

fn read_source(cli: &Cli) -> Result<(String, String)> {
    match &cli.file {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("read source file '{}'", path.display()))?;
            Ok((path.display().to_string(), source))
        }
        None => bail!("source file required for this operation"),
    }
}

fn report_compile_error(error: CompileError, name: &str, source: &str) -> anyhow::Error {
    let report = miette::Report::new(error.with_source_code(name, source));
    eprintln!("{report:?}");
    anyhow::anyhow!("compilation failed")
}

fn run_source(name: &str, source: &str) -> Result<()> {
    let program = parser::parse(source).map_err(|e| report_compile_error(e, name, source))?;
    let mut evaluator = Evaluator::new();
    evaluator
        .evaluate(&program)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.dump_tokens {
        let (name, source) = read_source(&cli)?;
        for token in scanner::scan(&source) {
            let token = token.map_err(|e| report_compile_error(e, &name, &source))?;
            println!("{token}");
        }
        return Ok(());
    }

    if cli.dump_ast {
        let (name, source) = read_source(&cli)?;
        let program =
            parser::parse(&source).map_err(|e| report_compile_error(e, &name, &source))?;
        match cli.ast_format.as_str() {
            "json" => println!("{}", printer::to_json(&program)),
            _ => print!("{}", printer::to_sexp(&program)),
        }
        return Ok(());
    }

    match cli.file {
        Some(_) => {
            let (name, source) = read_source(&cli)?;
            run_source(&name, &source)
        }
        None => tinyscript::repl::run_repl().context("line editor failed"),
    }
}
