use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::ast::{Element, SyntaxNode};
use crate::error::CompileError;
use crate::grammar::{self, Automaton, Grammar, StateId};
use crate::scanner::{
    self,
    token::{Span, Token},
};

static SCRIPT_AUTOMATON: OnceLock<Arc<Automaton>> = OnceLock::new();

/// The automaton for the built-in script grammar, compiled on first use and
/// shared read-only afterwards.
pub fn script_automaton() -> Arc<Automaton> {
    SCRIPT_AUTOMATON
        .get_or_init(|| Arc::new(Automaton::compile(&grammar::script())))
        .clone()
}

/// Shift/reduce parser driven by a compiled [`Automaton`].
#[derive(Debug, Clone)]
pub struct Parser {
    automaton: Arc<Automaton>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// A parser for the script grammar.
    pub fn new() -> Self {
        Self::with_automaton(script_automaton())
    }

    /// A parser for a custom grammar; compiles a private automaton.
    pub fn with_grammar(grammar: &Grammar) -> Self {
        Self::with_automaton(Arc::new(Automaton::compile(grammar)))
    }

    pub fn with_automaton(automaton: Arc<Automaton>) -> Self {
        Self { automaton }
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Parse a complete source text into one root node. Fails on the first
    /// lexical or syntax error; no partial tree is ever returned.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(&self, source: &str) -> Result<SyntaxNode, CompileError> {
        let mut run = Run::new(&self.automaton);
        let mut end = Span::new(source.len(), 0);
        for token in scanner::scan(source) {
            let token = token?;
            end = token.span;
            run.shift(token)?;
        }
        run.finish(end)
    }
}

/// Parse with the shared script automaton.
pub fn parse(source: &str) -> Result<SyntaxNode, CompileError> {
    Parser::new().parse(source)
}

/// The two parallel stacks of one parse. `states` always holds one more
/// entry than `elements`: the start state at the bottom.
struct Run<'a> {
    automaton: &'a Automaton,
    states: Vec<StateId>,
    elements: Vec<Element>,
}

impl<'a> Run<'a> {
    fn new(automaton: &'a Automaton) -> Self {
        Self {
            automaton,
            states: vec![automaton.start()],
            elements: Vec::new(),
        }
    }

    fn top(&self) -> StateId {
        self.states.last().copied().unwrap_or(self.automaton.start())
    }

    /// Shift `token`, reducing first for as long as the top state has no
    /// transition for the element being shifted.
    fn shift(&mut self, token: Token) -> Result<(), CompileError> {
        let mut pending = vec![Element::Token(token)];
        while let Some(element) = pending.pop() {
            let symbol = element.symbol();
            match self.automaton.transition(self.top(), symbol) {
                Some(next) => {
                    trace!(%symbol, state = next, "shift");
                    self.states.push(next);
                    self.elements.push(element);
                }
                None => {
                    pending.push(element);
                    let reduced = self.reduce().ok_or_else(|| unexpected(&pending[0]))?;
                    pending.push(Element::Node(reduced));
                }
            }
        }
        Ok(())
    }

    fn reduce(&mut self) -> Option<SyntaxNode> {
        let reduction = self.automaton.reduction(self.top())?;
        let split = self.elements.len().checked_sub(reduction.length)?;
        let children = self.elements.split_off(split);
        self.states.truncate(self.states.len() - reduction.length);
        trace!(kind = %reduction.kind, length = reduction.length, "reduce");
        Some(SyntaxNode::new(reduction.kind, children))
    }

    fn finish(mut self, end: Span) -> Result<SyntaxNode, CompileError> {
        match self.reduce() {
            Some(root) if root.kind == self.automaton.root() && self.elements.is_empty() => {
                Ok(root)
            }
            _ => Err(CompileError::parse("unexpected end of input", end)),
        }
    }
}

fn unexpected(element: &Element) -> CompileError {
    match element {
        Element::Token(token) if token.is_eof() => {
            CompileError::parse("unexpected end of input", token.span)
        }
        Element::Token(token) => CompileError::parse(
            format!("unexpected token '{}'", token.lexeme),
            token.span,
        ),
        Element::Node(node) => {
            let span = node.tokens().first().map(|t| t.span).unwrap_or(Span::new(0, 0));
            CompileError::parse(format!("unexpected {}", node.kind), span)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use crate::ast::printer::to_compact_sexp;
    use rstest::rstest;

    fn parse_sexp(source: &str) -> String {
        let tree = parse(source).expect("parse should succeed");
        to_compact_sexp(&tree)
    }

    fn parse_err(source: &str) -> String {
        parse(source).unwrap_err().to_string()
    }

    #[test]
    fn precedence_add_mul() {
        assert_eq!(
            parse_sexp("2 + 3 * 4;"),
            "(ExpressionStatement (AdditiveExpression 2 + (MultiplicativeExpression 3 * 4)) ;)"
        );
    }

    #[test]
    fn precedence_group() {
        assert_eq!(
            parse_sexp("(1 + 2) * 3;"),
            "(ExpressionStatement (MultiplicativeExpression (PrimaryExpression ( (AdditiveExpression 1 + 2) )) * 3) ;)"
        );
    }

    #[test]
    fn left_associative_subtraction() {
        assert_eq!(
            parse_sexp("a - b - c;"),
            "(ExpressionStatement (AdditiveExpression (AdditiveExpression a - b) - c) ;)"
        );
    }

    #[test]
    fn logical_operators() {
        assert_eq!(
            parse_sexp("a && b || c;"),
            "(ExpressionStatement (LogicalORExpression (LogicalANDExpression a && b) || c) ;)"
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(
            parse_sexp("a = b = 1;"),
            "(ExpressionStatement (AssignmentExpression a = (AssignmentExpression b = 1)) ;)"
        );
    }

    #[test]
    fn unary_operators() {
        assert_eq!(
            parse_sexp("!-x;"),
            "(ExpressionStatement (UnaryExpression ! (UnaryExpression - x)) ;)"
        );
    }

    #[test]
    fn declarations() {
        assert_eq!(parse_sexp("let a;"), "(VariableDeclaration let a ;)");
        assert_eq!(parse_sexp("const b;"), "(VariableDeclaration const b ;)");
    }

    #[test]
    fn dangling_else_binds_inner_if() {
        assert_eq!(
            parse_sexp("if (a) if (b) c; else d;"),
            "(IfStatement if ( a ) (IfStatement if ( b ) (ExpressionStatement c ;) else (ExpressionStatement d ;)))"
        );
    }

    #[test]
    fn while_loop() {
        assert_eq!(
            parse_sexp("while (x) break;"),
            "(WhileStatement while ( x ) (BreakStatement break ;))"
        );
    }

    #[test]
    fn labelled_loop() {
        assert_eq!(
            parse_sexp("outer: while (x) continue outer;"),
            "(LabelledStatement outer : (WhileStatement while ( x ) (ContinueStatement continue outer ;)))"
        );
    }

    #[test]
    fn function_declaration() {
        assert_eq!(
            parse_sexp("function add(a, b) { return a + b; }"),
            "(FunctionDeclaration function add ( (FormalParameterList a , b) ) (FunctionBody { (ReturnStatement return (AdditiveExpression a + b) ;) }))"
        );
    }

    #[test]
    fn call_with_arguments() {
        assert_eq!(
            parse_sexp("f(1, 2);"),
            "(ExpressionStatement (CallExpression f (Arguments ( (ArgumentList 1 , 2) ))) ;)"
        );
    }

    #[test]
    fn member_assignment_and_computed_access() {
        assert_eq!(
            parse_sexp("a.b = c[0];"),
            "(ExpressionStatement (AssignmentExpression (MemberExpression a . b) = (MemberExpression c [ 0 ])) ;)"
        );
    }

    #[test]
    fn new_with_arguments() {
        assert_eq!(
            parse_sexp("new Point(1);"),
            "(ExpressionStatement (MemberExpression new Point (Arguments ( 1 ))) ;)"
        );
    }

    #[test]
    fn braces_at_statement_start_are_a_block() {
        assert_eq!(parse_sexp("{}"), "(BlockStatement { })");
        assert_eq!(
            parse_sexp("{ x; }"),
            "(BlockStatement { (ExpressionStatement x ;) })"
        );
    }

    #[test]
    fn braces_in_expression_are_an_object() {
        assert_eq!(
            parse_sexp("x = {};"),
            "(ExpressionStatement (AssignmentExpression x = (ObjectLiteral { })) ;)"
        );
        assert_eq!(
            parse_sexp("x = { a: 1, 'b': 2 };"),
            "(ExpressionStatement (AssignmentExpression x = (ObjectLiteral { (PropertyList (Property a : 1) , (Property 'b' : 2)) })) ;)"
        );
    }

    #[test]
    fn empty_program_is_a_bare_root() {
        let tree = parse("").unwrap();
        assert_eq!(tree.kind, NodeKind::Program);
        assert_eq!(tree.children.len(), 1);
        assert!(tree.token(0).is_some_and(|t| t.is_eof()));
    }

    #[test]
    fn statements_accumulate_left_recursively() {
        let tree = parse("a; b; c;").unwrap();
        let list = tree.node(0).unwrap();
        assert_eq!(list.kind, NodeKind::StatementList);
        assert_eq!(list.children.len(), 2);
        assert_eq!(list.node(0).map(|n| n.kind), Some(NodeKind::StatementList));
    }

    #[rstest]
    #[case("1 +;", "unexpected token ';'")]
    #[case("+", "unexpected token '+'")]
    #[case("let;", "unexpected token ';'")]
    #[case("a = ;", "unexpected token ';'")]
    #[case("1 2;", "unexpected token '2'")]
    #[case("{ a: 1; }", "unexpected token ';'")]
    #[case("{", "unexpected end of input")]
    #[case("f(", "unexpected end of input")]
    #[case("1 +", "unexpected end of input")]
    fn syntax_errors(#[case] source: &str, #[case] expected: &str) {
        let message = parse_err(source);
        assert!(message.starts_with("syntax error"), "{message}");
        assert!(message.contains(expected), "{source}: {message}");
    }

    #[test]
    fn scan_errors_surface_unchanged() {
        let err = parse("let a = #;").unwrap_err();
        assert!(matches!(err, CompileError::Scan { .. }));
    }

    #[test]
    fn parser_instances_share_the_script_automaton() {
        let a = Parser::new();
        let b = Parser::default();
        assert!(std::ptr::eq(a.automaton(), b.automaton()));
    }

    #[test]
    fn custom_grammar() {
        let grammar = Grammar::from_table(
            "Program",
            &[
                ("Program", &[&["AdditiveExpression", "EOF"]]),
                (
                    "AdditiveExpression",
                    &[
                        &["NumericLiteral"],
                        &["AdditiveExpression", "+", "NumericLiteral"],
                    ],
                ),
            ],
        )
        .unwrap();
        let parser = Parser::with_grammar(&grammar);
        let tree = parser.parse("1 + 2 + 3").unwrap();
        assert_eq!(
            to_compact_sexp(&tree),
            "(AdditiveExpression (AdditiveExpression 1 + 2) + 3)"
        );
        assert!(parser.parse("1 + + 2").is_err());
        assert!(parser.parse("let").is_err());
    }
}
