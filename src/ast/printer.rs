use crate::ast::{Element, SyntaxNode};

/// Full s-expression: every node, every token except EOF.
pub fn to_sexp(node: &SyntaxNode) -> String {
    let mut buf = String::new();
    sexp_node(&mut buf, node, false);
    buf.push('\n');
    buf
}

/// S-expression with single-child chains collapsed, so `1 + 2` prints as
/// `(AdditiveExpression 1 + 2)` rather than seven nested wrappers.
pub fn to_compact_sexp(node: &SyntaxNode) -> String {
    let mut buf = String::new();
    sexp_node(&mut buf, node, true);
    buf
}

pub fn to_json(node: &SyntaxNode) -> String {
    serde_json::to_string_pretty(node).expect("syntax tree should be serializable")
}

fn visible(node: &SyntaxNode) -> Vec<&Element> {
    node.children
        .iter()
        .filter(|child| !matches!(child, Element::Token(t) if t.is_eof()))
        .collect()
}

fn sexp_node(buf: &mut String, node: &SyntaxNode, compact: bool) {
    let children = visible(node);
    if compact && children.len() == 1 {
        sexp_element(buf, children[0], compact);
        return;
    }
    buf.push('(');
    buf.push_str(node.kind.as_ref());
    for child in children {
        buf.push(' ');
        sexp_element(buf, child, compact);
    }
    buf.push(')');
}

fn sexp_element(buf: &mut String, element: &Element, compact: bool) {
    match element {
        Element::Node(node) => sexp_node(buf, node, compact),
        Element::Token(token) => buf.push_str(&token.lexeme),
    }
}
