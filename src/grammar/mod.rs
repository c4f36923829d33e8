//! Declarative grammars and the shift/reduce automaton compiled from them.

pub mod automaton;
pub mod script;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::ast::NodeKind;
use crate::error::CompileError;
use crate::scanner::token::TokenKind;

pub use automaton::{Automaton, Conflict, Reduction, StateId};
pub use script::script;

/// A grammar symbol: a nonterminal or a token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Node(NodeKind),
    Token(TokenKind),
}

impl Symbol {
    /// Resolve a symbol name as written in a grammar table. Nonterminal
    /// names take precedence over token names.
    pub fn from_name(name: &str) -> Option<Self> {
        NodeKind::from_str(name)
            .ok()
            .map(Self::Node)
            .or_else(|| TokenKind::from_symbol_name(name).map(Self::Token))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(kind) => write!(f, "{kind}"),
            Self::Token(kind) => write!(f, "{kind}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    symbols: Vec<Symbol>,
}

impl Production {
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Nonterminal → ordered productions, plus the root nonterminal.
///
/// Production order within a rule is significant: when two productions
/// complete on the same input, the one threaded first keeps the state.
#[derive(Debug, Clone)]
pub struct Grammar {
    root: NodeKind,
    rules: BTreeMap<NodeKind, Vec<Production>>,
}

/// A grammar written as `(nonterminal, [production, ...])` rows, each
/// production a list of symbol names.
pub type GrammarTable<'a> = &'a [(&'a str, &'a [&'a [&'a str]])];

impl Grammar {
    pub fn from_table(root: &str, table: GrammarTable<'_>) -> Result<Self, CompileError> {
        let root = nonterminal(root)?;
        let mut rules = BTreeMap::new();
        let mut referenced = BTreeSet::from([root]);

        for &(name, productions) in table {
            let lhs = nonterminal(name)?;
            if rules.contains_key(&lhs) {
                return Err(CompileError::grammar(format!(
                    "nonterminal '{name}' is defined twice"
                )));
            }
            let mut compiled = Vec::with_capacity(productions.len());
            for &production in productions {
                if production.is_empty() {
                    return Err(CompileError::grammar(format!(
                        "nonterminal '{name}' has an empty production"
                    )));
                }
                let symbols = production
                    .iter()
                    .map(|&symbol| {
                        Symbol::from_name(symbol).ok_or_else(|| {
                            CompileError::grammar(format!(
                                "unknown symbol '{symbol}' in a production of '{name}'"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                referenced.extend(symbols.iter().filter_map(|symbol| match symbol {
                    Symbol::Node(kind) => Some(*kind),
                    Symbol::Token(_) => None,
                }));
                compiled.push(Production { symbols });
            }
            rules.insert(lhs, compiled);
        }

        if let Some(missing) = referenced
            .iter()
            .find(|kind| rules.get(*kind).is_none_or(Vec::is_empty))
        {
            return Err(CompileError::grammar(format!(
                "nonterminal '{missing}' has no productions"
            )));
        }

        Ok(Self { root, rules })
    }

    pub fn root(&self) -> NodeKind {
        self.root
    }

    pub fn productions(&self, kind: NodeKind) -> &[Production] {
        self.rules.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.rules.keys().copied()
    }
}

fn nonterminal(name: &str) -> Result<NodeKind, CompileError> {
    NodeKind::from_str(name)
        .map_err(|_| CompileError::grammar(format!("unknown nonterminal '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::token::Punctuator;

    #[test]
    fn symbol_names_prefer_nonterminals() {
        assert_eq!(
            Symbol::from_name("Statement"),
            Some(Symbol::Node(NodeKind::Statement))
        );
        assert_eq!(
            Symbol::from_name("+"),
            Some(Symbol::Token(TokenKind::Punctuator(Punctuator::Plus)))
        );
        assert_eq!(Symbol::from_name("Nope"), None);
    }

    #[test]
    fn table_builds_rules_in_order() {
        let grammar = Grammar::from_table(
            "Program",
            &[
                ("Program", &[&["Literal", "EOF"]]),
                ("Literal", &[&["NumericLiteral"], &["StringLiteral"]]),
            ],
        )
        .unwrap();
        assert_eq!(grammar.root(), NodeKind::Program);
        let literal = grammar.productions(NodeKind::Literal);
        assert_eq!(literal.len(), 2);
        assert_eq!(
            literal[0].symbols(),
            &[Symbol::Token(TokenKind::NumericLiteral)]
        );
        assert_eq!(grammar.nonterminals().count(), 2);
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let cases: &[(&str, GrammarTable<'static>, &str)] = &[
            ("Programme", &[("Program", &[&["EOF"]])], "unknown nonterminal"),
            (
                "Program",
                &[("Program", &[&["EOF"]]), ("Thing", &[&["EOF"]])],
                "unknown nonterminal",
            ),
            (
                "Program",
                &[("Program", &[&["Widget", "EOF"]])],
                "unknown symbol 'Widget'",
            ),
            (
                "Program",
                &[("Program", &[&["EOF"]]), ("Program", &[&["EOF"]])],
                "defined twice",
            ),
            ("Program", &[("Program", &[&[]])], "empty production"),
            (
                "Program",
                &[("Program", &[&["Literal", "EOF"]])],
                "'Literal' has no productions",
            ),
            (
                "Program",
                &[("Literal", &[&["NumericLiteral"]])],
                "'Program' has no productions",
            ),
        ];
        for &(root, table, expected) in cases {
            let err = Grammar::from_table(root, table).unwrap_err();
            assert!(matches!(err, CompileError::Grammar { .. }));
            assert!(err.to_string().contains(expected), "{err}");
        }
    }
}
