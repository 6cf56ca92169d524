//! Canonical LR(1) collection: items, CLOSURE, GOTO, and the automaton.
//!
//! Items reference productions by [`ProdId`] into the augmented grammar,
//! so equality and hashing are cheap and the augmented production is
//! recognized by identity rather than by its display name. States are
//! canonicalized as sorted item vectors; the collection looks states up
//! by hashing that canonical form.

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, trace};

use crate::first::FirstSets;
use crate::grammar::{Grammar, ProdId, Symbol};

/// An LR(1) item: a production, a dot position, and one lookahead
/// terminal. Structural equality and hashing on all three.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lr1Item {
    pub prod: ProdId,
    pub dot: usize,
    pub lookahead: Symbol,
}

impl Lr1Item {
    pub fn new(prod: ProdId, dot: usize, lookahead: Symbol) -> Self {
        Lr1Item { prod, dot, lookahead }
    }

    /// The kernel of this item: the production and dot, stripped of the
    /// lookahead.
    pub fn kernel(&self) -> (ProdId, usize) {
        (self.prod, self.dot)
    }
}

/// A state's kernel: the kernels of its items with the dot past position
/// zero, plus the augmented start item wherever its dot sits.
pub(crate) fn kernel_of(state: &[Lr1Item], augmented: ProdId) -> BTreeSet<(ProdId, usize)> {
    state
        .iter()
        .filter(|item| item.dot > 0 || item.prod == augmented)
        .map(Lr1Item::kernel)
        .collect()
}

/// The canonical LR(1) collection for an augmented grammar.
#[derive(Debug, Clone)]
pub struct Lr1Automaton {
    /// The augmented grammar (the input grammar plus `S' -> S`).
    pub grammar: Grammar,
    /// Id of the augmented production within `grammar.productions`.
    pub augmented: ProdId,
    /// States in discovery order; each is a sorted, deduplicated item set.
    pub states: Vec<Vec<Lr1Item>>,
    /// Per-state transition map `symbol -> target state index`.
    pub transitions: Vec<IndexMap<Symbol, usize>>,
}

impl Lr1Automaton {
    /// Build the canonical collection for `grammar`.
    ///
    /// The grammar is augmented, the initial state is
    /// `CLOSURE({[S' -> · S, $]})`, and states are discovered with a
    /// worklist, probing every grammar symbol in declaration order
    /// (terminals first, then non-terminals).
    pub fn build(grammar: &Grammar) -> Self {
        let (augmented_grammar, augmented) = grammar.augment();
        let first = FirstSets::build(&augmented_grammar);

        let mut automaton = Lr1Automaton {
            grammar: augmented_grammar,
            augmented,
            states: Vec::new(),
            transitions: Vec::new(),
        };

        let initial = automaton.closure(
            &first,
            vec![Lr1Item::new(augmented, 0, Symbol::end())],
        );

        let mut state_map: HashMap<Vec<Lr1Item>, usize> = HashMap::new();
        state_map.insert(initial.clone(), 0);
        automaton.states.push(initial);
        automaton.transitions.push(IndexMap::new());
        let mut worklist: Vec<usize> = vec![0];

        let symbols: Vec<Symbol> = automaton.grammar.symbols().cloned().collect();

        while let Some(current) = worklist.pop() {
            for symbol in &symbols {
                let target_items = automaton.goto_set(&first, &automaton.states[current], symbol);
                if target_items.is_empty() {
                    continue;
                }

                let target = match state_map.get(&target_items) {
                    Some(&existing) => existing,
                    None => {
                        let id = automaton.states.len();
                        trace!("lr1: state {id} discovered via {symbol}");
                        state_map.insert(target_items.clone(), id);
                        automaton.states.push(target_items);
                        automaton.transitions.push(IndexMap::new());
                        worklist.push(id);
                        id
                    }
                };

                automaton.transitions[current].insert(symbol.clone(), target);
            }
        }

        debug!(
            "lr1: {} states for {} productions",
            automaton.states.len(),
            automaton.grammar.productions.len()
        );
        automaton
    }

    /// CLOSURE of an item set: for every item `[A -> α · B β, a]` with
    /// non-terminal `B` and every production `B -> γ`, add
    /// `[B -> · γ, b]` for each `b ∈ FIRST(β a)`. Worklist until no new
    /// items appear; the result is sorted into canonical form.
    pub fn closure(&self, first: &FirstSets, items: Vec<Lr1Item>) -> Vec<Lr1Item> {
        let mut closure: HashSet<Lr1Item> = items.iter().cloned().collect();
        let mut worklist: Vec<Lr1Item> = items;

        while let Some(item) = worklist.pop() {
            let production = &self.grammar.productions[item.prod];
            let Some(next) = production.right.get(item.dot) else {
                continue;
            };
            if !next.is_non_terminal() {
                continue;
            }

            let beta = &production.right[item.dot + 1..];
            let lookaheads = first.first_of_sequence(beta, &item.lookahead);

            for (prod_id, _) in self.grammar.productions_for(next) {
                for lookahead in &lookaheads {
                    let candidate = Lr1Item::new(prod_id, 0, lookahead.clone());
                    if closure.insert(candidate.clone()) {
                        worklist.push(candidate);
                    }
                }
            }
        }

        let mut result: Vec<Lr1Item> = closure.into_iter().collect();
        result.sort();
        result
    }

    /// GOTO: advance the dot over `symbol` in every item that expects it,
    /// then take the closure. Empty result means no transition.
    pub fn goto_set(&self, first: &FirstSets, state: &[Lr1Item], symbol: &Symbol) -> Vec<Lr1Item> {
        let moved: Vec<Lr1Item> = state
            .iter()
            .filter(|item| {
                self.grammar.productions[item.prod].right.get(item.dot) == Some(symbol)
            })
            .map(|item| Lr1Item::new(item.prod, item.dot + 1, item.lookahead.clone()))
            .collect();

        if moved.is_empty() {
            return Vec::new();
        }
        self.closure(first, moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Production;

    /// `S -> ( S ) | ε`
    fn paren_grammar() -> Grammar {
        let s = Symbol::non_terminal("S");
        let lp = Symbol::terminal("(");
        let rp = Symbol::terminal(")");
        Grammar::new(
            s.clone(),
            [lp.clone(), rp.clone()].into_iter().collect(),
            [s.clone()].into_iter().collect(),
            vec![
                Production::new(s.clone(), vec![lp, s.clone(), rp]),
                Production::new(s, vec![]),
            ],
        )
    }

    #[test]
    fn test_initial_state_closure() {
        let automaton = Lr1Automaton::build(&paren_grammar());
        let initial = &automaton.states[0];

        // [S' -> · S, $] plus closure items for both S productions
        assert!(initial.contains(&Lr1Item::new(automaton.augmented, 0, Symbol::end())));
        assert!(initial.contains(&Lr1Item::new(0, 0, Symbol::end())));
        assert!(initial.contains(&Lr1Item::new(1, 0, Symbol::end())));
    }

    #[test]
    fn test_closure_idempotent() {
        let automaton = Lr1Automaton::build(&paren_grammar());
        let first = FirstSets::build(&automaton.grammar);
        for state in &automaton.states {
            let again = automaton.closure(&first, state.clone());
            assert_eq!(&again, state, "closure must be idempotent");
        }
    }

    #[test]
    fn test_states_pairwise_distinct() {
        let automaton = Lr1Automaton::build(&paren_grammar());
        for (i, a) in automaton.states.iter().enumerate() {
            for b in &automaton.states[i + 1..] {
                assert_ne!(a, b, "canonical collection must not repeat states");
            }
        }
    }

    #[test]
    fn test_goto_kernels_depend_only_on_source_kernels() {
        let automaton = Lr1Automaton::build(&paren_grammar());
        let first = FirstSets::build(&automaton.grammar);
        let lp = Symbol::terminal("(");

        for state in &automaton.states {
            let target = automaton.goto_set(&first, state, &lp);
            if target.is_empty() {
                continue;
            }
            // every kernel item of the target comes from advancing a
            // source item over `(`
            for item in target.iter().filter(|i| i.dot > 0) {
                let expects_lp = state.iter().any(|s| {
                    s.prod == item.prod
                        && s.dot + 1 == item.dot
                        && automaton.grammar.productions[s.prod].right.get(s.dot) == Some(&lp)
                });
                assert!(expects_lp, "kernel item {item:?} not justified by source");
            }
        }
    }

    #[test]
    fn test_transitions_recorded() {
        let automaton = Lr1Automaton::build(&paren_grammar());
        let lp = Symbol::terminal("(");
        let s = Symbol::non_terminal("S");
        // the initial state must shift `(` and go on `S`
        assert!(automaton.transitions[0].contains_key(&lp));
        assert!(automaton.transitions[0].contains_key(&s));
    }
}
