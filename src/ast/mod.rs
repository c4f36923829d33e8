pub mod printer;

use serde::Serialize;

use crate::grammar::Symbol;
use crate::scanner::token::{Token, TokenKind};

/// Nonterminals of the script grammar. The variant names are the symbol
/// names used in grammar tables and the `type` of a serialized node.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
pub enum NodeKind {
    Program,
    StatementList,
    Statement,
    EmptyStatement,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    BlockStatement,
    IfStatement,
    WhileStatement,
    LabelledStatement,
    VariableDeclaration,
    FunctionDeclaration,
    FormalParameterList,
    FunctionBody,
    ExpressionStatement,
    Expression,
    AssignmentExpression,
    LogicalORExpression,
    LogicalANDExpression,
    EqualityExpression,
    RelationalExpression,
    AdditiveExpression,
    MultiplicativeExpression,
    UnaryExpression,
    LeftHandSideExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    PrimaryExpression,
    Literal,
    ObjectLiteral,
    PropertyList,
    Property,
    Arguments,
    ArgumentList,
}

/// One child of a syntax node: either a reduced nonterminal or a shifted token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Element {
    Node(SyntaxNode),
    Token(Token),
}

impl Element {
    /// The grammar symbol this element was shifted as.
    pub fn symbol(&self) -> Symbol {
        match self {
            Self::Node(node) => Symbol::Node(node.kind),
            Self::Token(token) => Symbol::Token(token.kind),
        }
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(token) => Some(token),
            Self::Node(_) => None,
        }
    }
}

/// An interior node of the syntax tree. Children appear in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntaxNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub children: Vec<Element>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, children: Vec<Element>) -> Self {
        Self { kind, children }
    }

    pub fn child(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    pub fn node(&self, index: usize) -> Option<&SyntaxNode> {
        self.child(index).and_then(Element::as_node)
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.child(index).and_then(Element::as_token)
    }

    /// True when the child at `index` is a token of the given kind.
    pub fn has_token(&self, index: usize, kind: TokenKind) -> bool {
        self.token(index).is_some_and(|t| t.kind == kind)
    }

    /// Every token under this node, left to right.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        collect_tokens(self, &mut out);
        out
    }
}

fn collect_tokens<'a>(node: &'a SyntaxNode, out: &mut Vec<&'a Token>) {
    for child in &node.children {
        match child {
            Element::Node(inner) => collect_tokens(inner, out),
            Element::Token(token) => out.push(token),
        }
    }
}
