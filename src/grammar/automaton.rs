use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::ast::NodeKind;
use crate::grammar::{Grammar, Symbol};

pub type StateId = usize;

/// "The top `length` stack entries complete a production of `kind`."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Reduction {
    pub kind: NodeKind,
    pub length: usize,
}

/// Two productions that complete on the same state. The first one threaded
/// into the state is kept; the other can never be reduced there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Conflict {
    pub kept: Reduction,
    pub discarded: Reduction,
}

#[derive(Debug, Clone, Default)]
struct State {
    transitions: BTreeMap<Symbol, StateId>,
    reduction: Option<Reduction>,
}

/// Structural identity of a state: its reduce marker and, recursively, its
/// transitions. Only states that have not been interned yet are walked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SignatureToken {
    Reduce(Option<Reduction>),
    Enter(Symbol),
    Leave,
}

type Signature = Vec<SignatureToken>;

/// Shared state graph for shift/reduce parsing.
///
/// States live in an arena and refer to each other by index. States with
/// the same structure are interned, so the graph is a DAG (with back edges
/// where a state reaches an equal state) rather than a trie.
#[derive(Debug, Clone)]
pub struct Automaton {
    root: NodeKind,
    start: StateId,
    states: Vec<State>,
    conflicts: Vec<Conflict>,
}

impl Automaton {
    /// Compile `grammar` into its automaton. Every call builds a fresh graph.
    #[tracing::instrument(level = "debug", skip_all, fields(root = %grammar.root()))]
    pub fn compile(grammar: &Grammar) -> Self {
        let mut builder = Builder::new(grammar);
        let start = builder.fresh();
        let accept = builder.fresh();
        builder.states[start]
            .transitions
            .insert(Symbol::Node(grammar.root()), accept);
        let signature = builder.signature(start);
        builder.interned.insert(signature, start);

        let mut work = VecDeque::from([start]);
        while let Some(id) = work.pop_front() {
            builder.close(id);
            let children: Vec<(Symbol, StateId)> = builder.states[id]
                .transitions
                .iter()
                .map(|(&symbol, &child)| (symbol, child))
                .collect();
            for (symbol, child) in children {
                let signature = builder.signature(child);
                match builder.interned.get(&signature) {
                    Some(&existing) => {
                        builder.states[id].transitions.insert(symbol, existing);
                    }
                    None => {
                        builder.interned.insert(signature, child);
                        work.push_back(child);
                    }
                }
            }
        }

        let automaton = builder.finish(grammar.root(), start);
        debug!(
            states = automaton.state_count(),
            conflicts = automaton.conflicts.len(),
            "compiled automaton"
        );
        for conflict in &automaton.conflicts {
            debug!(
                kept = %conflict.kept.kind,
                discarded = %conflict.discarded.kind,
                length = conflict.kept.length,
                "reduce/reduce conflict"
            );
        }
        automaton
    }

    pub fn root(&self) -> NodeKind {
        self.root
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn transition(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.states.get(state)?.transitions.get(&symbol).copied()
    }

    pub fn reduction(&self, state: StateId) -> Option<Reduction> {
        self.states.get(state)?.reduction
    }

    /// Symbols that can be shifted from `state`, in symbol order.
    pub fn expected(&self, state: StateId) -> Vec<Symbol> {
        self.states
            .get(state)
            .map(|s| s.transitions.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}

struct Builder<'g> {
    grammar: &'g Grammar,
    states: Vec<State>,
    interned: HashMap<Signature, StateId>,
    conflicts: Vec<Conflict>,
}

impl<'g> Builder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            states: Vec::new(),
            interned: HashMap::new(),
            conflicts: Vec::new(),
        }
    }

    fn fresh(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    /// Thread every production reachable from the state's outgoing symbols
    /// into the state, breadth-first over nonterminals.
    fn close(&mut self, id: StateId) {
        let grammar = self.grammar;
        let mut queue: VecDeque<Symbol> = self.states[id].transitions.keys().copied().collect();
        let mut seen = HashSet::new();

        while let Some(symbol) = queue.pop_front() {
            if !seen.insert(symbol) {
                continue;
            }
            let Symbol::Node(kind) = symbol else {
                continue;
            };
            for production in grammar.productions(kind) {
                let symbols = production.symbols();
                if !seen.contains(&symbols[0]) {
                    queue.push_back(symbols[0]);
                }
                let end = symbols
                    .iter()
                    .fold(id, |state, &symbol| self.step(state, symbol));
                self.mark(
                    end,
                    Reduction {
                        kind,
                        length: symbols.len(),
                    },
                );
            }
        }
    }

    fn step(&mut self, from: StateId, symbol: Symbol) -> StateId {
        if let Some(&next) = self.states[from].transitions.get(&symbol) {
            return next;
        }
        let next = self.fresh();
        self.states[from].transitions.insert(symbol, next);
        next
    }

    fn mark(&mut self, id: StateId, reduction: Reduction) {
        match self.states[id].reduction {
            None => self.states[id].reduction = Some(reduction),
            Some(kept) if kept != reduction => {
                let conflict = Conflict {
                    kept,
                    discarded: reduction,
                };
                if !self.conflicts.contains(&conflict) {
                    self.conflicts.push(conflict);
                }
            }
            Some(_) => {}
        }
    }

    fn signature(&self, id: StateId) -> Signature {
        let mut out = Vec::new();
        self.write_signature(id, &mut out);
        out
    }

    fn write_signature(&self, id: StateId, out: &mut Signature) {
        let state = &self.states[id];
        out.push(SignatureToken::Reduce(state.reduction));
        for (&symbol, &child) in &state.transitions {
            out.push(SignatureToken::Enter(symbol));
            self.write_signature(child, out);
            out.push(SignatureToken::Leave);
        }
    }

    /// Drop states orphaned by interning and renumber the rest in
    /// breadth-first order from `start`.
    fn finish(self, root: NodeKind, start: StateId) -> Automaton {
        let mut renumbered: HashMap<StateId, StateId> = HashMap::from([(start, 0)]);
        let mut order = vec![start];
        let mut cursor = 0;
        while cursor < order.len() {
            let id = order[cursor];
            cursor += 1;
            for &child in self.states[id].transitions.values() {
                if !renumbered.contains_key(&child) {
                    renumbered.insert(child, order.len());
                    order.push(child);
                }
            }
        }

        let states = order
            .iter()
            .map(|&id| {
                let state = &self.states[id];
                State {
                    transitions: state
                        .transitions
                        .iter()
                        .map(|(&symbol, child)| (symbol, renumbered[child]))
                        .collect(),
                    reduction: state.reduction,
                }
            })
            .collect();

        Automaton {
            root,
            start: 0,
            states,
            conflicts: self.conflicts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::script;
    use crate::scanner::token::{Punctuator, TokenKind};

    fn sum_grammar() -> Grammar {
        Grammar::from_table(
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
        .unwrap()
    }

    #[test]
    fn start_state_shifts_root_and_leading_symbols() {
        let automaton = Automaton::compile(&sum_grammar());
        let start = automaton.start();
        assert!(
            automaton
                .transition(start, Symbol::Node(NodeKind::Program))
                .is_some()
        );
        let number = automaton
            .transition(start, Symbol::Token(TokenKind::NumericLiteral))
            .unwrap();
        assert_eq!(
            automaton.reduction(number),
            Some(Reduction {
                kind: NodeKind::AdditiveExpression,
                length: 1
            })
        );
        assert!(automaton.reduction(start).is_none());
    }

    #[test]
    fn left_recursion_terminates_and_shares_states() {
        let automaton = Automaton::compile(&sum_grammar());
        let start = automaton.start();
        let sum = automaton
            .transition(start, Symbol::Node(NodeKind::AdditiveExpression))
            .unwrap();
        let plus = automaton
            .transition(sum, Symbol::Token(TokenKind::Punctuator(Punctuator::Plus)))
            .unwrap();
        let done = automaton
            .transition(plus, Symbol::Token(TokenKind::NumericLiteral))
            .unwrap();
        assert_eq!(
            automaton.reduction(done),
            Some(Reduction {
                kind: NodeKind::AdditiveExpression,
                length: 3
            })
        );
        assert!(automaton.state_count() < 10);
        assert!(automaton.conflicts().is_empty());
    }

    #[test]
    fn unknown_state_has_no_transitions() {
        let automaton = Automaton::compile(&sum_grammar());
        let missing = automaton.state_count() + 5;
        assert_eq!(automaton.transition(missing, Symbol::Node(NodeKind::Program)), None);
        assert_eq!(automaton.reduction(missing), None);
        assert!(automaton.expected(missing).is_empty());
    }

    #[test]
    fn script_keeps_block_over_object_literal() {
        let automaton = Automaton::compile(&script());
        assert_eq!(
            automaton.conflicts(),
            &[Conflict {
                kept: Reduction {
                    kind: NodeKind::BlockStatement,
                    length: 2
                },
                discarded: Reduction {
                    kind: NodeKind::ObjectLiteral,
                    length: 2
                },
            }]
        );
    }

    #[test]
    fn compiling_twice_gives_the_same_shape() {
        let first = Automaton::compile(&script());
        let second = Automaton::compile(&script());
        assert_eq!(first.state_count(), second.state_count());
        assert_eq!(first.conflicts(), second.conflicts());
        assert_eq!(first.expected(first.start()), second.expected(second.start()));
    }
}
