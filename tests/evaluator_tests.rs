use rstest::rstest;

use tinyscript::evaluator::Evaluator;
use tinyscript::runtime::{CompletionType, Value};
use tinyscript::{Error, RuntimeError, parser};

fn run_fixture(source: &str) -> Vec<String> {
    let program = parser::parse(source).expect("parse should succeed");
    let mut evaluator = Evaluator::with_writer(Vec::<u8>::new());
    evaluator
        .evaluate(&program)
        .expect("evaluate should succeed");
    evaluator.output().to_vec()
}

fn fixture(name: &str) -> (String, String) {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");
    let source = std::fs::read_to_string(format!("{dir}/{name}.js")).expect("fixture source");
    let expected =
        std::fs::read_to_string(format!("{dir}/{name}.expected")).expect("fixture output");
    (source, expected)
}

#[rstest]
#[case("arithmetic")]
#[case("scoping")]
#[case("counter")]
#[case("fib")]
#[case("control_flow")]
#[case("objects")]
fn fixtures_produce_expected_output(#[case] name: &str) {
    let (source, expected) = fixture(name);
    let output = run_fixture(&source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines, "fixture {name}");
}

#[test]
fn precedence_example_completes_with_fourteen() {
    let completion = tinyscript::run("2 + 3 * 4;").expect("run should succeed");
    assert_eq!(completion.kind, CompletionType::Normal);
    assert_eq!(completion.value(), Value::Number(14.0));
}

#[test]
fn inner_block_binding_does_not_leak() {
    let completion = tinyscript::run("let a; { let a; a = 1; } a;").expect("run should succeed");
    assert_eq!(completion.value(), Value::Undefined);
}

#[test]
fn short_circuit_never_touches_the_right_operand() {
    let completion = tinyscript::run("0 && x;").expect("run should succeed");
    assert_eq!(completion.value(), Value::Number(0.0));
}

#[test]
fn break_ends_the_loop_normally() {
    let completion =
        tinyscript::run("let i; i = 0; while (true) { i = i + 1; if (i == 4) break; } i;")
            .expect("run should succeed");
    assert_eq!(completion.value(), Value::Number(4.0));
}

#[test]
fn closure_outlives_its_declaring_call() {
    let source = "function outer() { let v; v = 5; function inner() { return v; } return inner; } \
                  let f; f = outer(); f();";
    let completion = tinyscript::run(source).expect("run should succeed");
    assert_eq!(completion.value(), Value::Number(5.0));
}

#[test]
fn one_evaluator_accumulates_across_programs() {
    let mut evaluator = Evaluator::with_writer(Vec::<u8>::new());
    for line in ["let total;", "total = 1;", "total = total + 41;", "log(total);"] {
        let program = parser::parse(line).expect("parse should succeed");
        evaluator.evaluate(&program).expect("evaluate should succeed");
    }
    assert_eq!(evaluator.output(), ["42"]);
    assert_eq!(evaluator.context_depth(), 1);
}

#[rstest]
#[case("0o9;", "invalid digit '9' in base-8 literal '0o9'")]
#[case("y = 1;", "y is not defined")]
#[case("let a; a();", "a is not a function")]
#[case("const c; c = 2;", "assignment to constant variable 'c'")]
#[case("let d; let d;", "identifier 'd' has already been declared")]
fn runtime_error_messages(#[case] source: &str, #[case] expected: &str) {
    let err = tinyscript::run(source).expect_err("run should fail");
    assert!(matches!(err, Error::Runtime(_)), "{err:?}");
    assert_eq!(err.to_string(), expected);
}

#[test]
fn runtime_errors_are_typed() {
    let err = tinyscript::run("let o; o = null; o.field;").expect_err("run should fail");
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::NullishPropertyAccess { .. })
    ));
}
