//! LALR(1): kernel-grouped state merging and ACTION/GOTO table fill.
//!
//! LR(1) states whose kernels (production + dot, lookahead stripped) are
//! equal as sets collapse into one LALR state whose items carry the union
//! of the group's lookaheads. Kernel-equivalent sources agree on
//! kernel-equivalent targets under the same symbol, so remapped
//! transitions coalesce cleanly.
//!
//! Table cells are first-wins: a cell is never overwritten, and every
//! attempted overwrite is recorded as a [`Conflict`]. A conflicted table
//! therefore stays consultable for inspection and testing.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::grammar::{Grammar, ProdId, Symbol};
use crate::lr1::{kernel_of, Lr1Automaton, Lr1Item};

/// A parse action in the ACTION table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Shift the current token and enter the given state.
    Shift(usize),
    /// Reduce by the given production.
    Reduce(ProdId),
    /// Input is accepted.
    Accept,
}

/// How a conflict's two actions relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    /// A conflict involving the accept cell.
    Accept,
}

/// A rejected attempt to overwrite an ACTION cell. The existing action
/// stays in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub symbol: Symbol,
    pub existing: Action,
    pub attempted: Action,
}

impl Conflict {
    pub fn kind(&self) -> ConflictKind {
        match (self.existing, self.attempted) {
            (Action::Accept, _) | (_, Action::Accept) => ConflictKind::Accept,
            (Action::Shift(_), Action::Reduce(_)) | (Action::Reduce(_), Action::Shift(_)) => {
                ConflictKind::ShiftReduce
            }
            _ => ConflictKind::ReduceReduce,
        }
    }
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind() {
            ConflictKind::ShiftReduce => "shift/reduce",
            ConflictKind::ReduceReduce => "reduce/reduce",
            ConflictKind::Accept => "accept",
        };
        write!(
            f,
            "{kind} conflict in state {} on '{}': kept {:?}, rejected {:?}",
            self.state, self.symbol, self.existing, self.attempted
        )
    }
}

/// The LALR(1) parsing table: merged states, ACTION/GOTO maps, and the
/// conflicts recorded while filling them.
#[derive(Debug, Clone)]
pub struct LalrTable {
    /// The augmented grammar the table was built from.
    pub grammar: Grammar,
    /// Id of the augmented production.
    pub augmented: ProdId,
    /// Merged LALR states (sorted canonical item sets).
    pub states: Vec<Vec<Lr1Item>>,
    /// Merged transition maps, `symbol -> target LALR state`.
    pub transitions: Vec<IndexMap<Symbol, usize>>,
    /// ACTION per state: terminal -> shift/reduce/accept.
    pub action: Vec<IndexMap<Symbol, Action>>,
    /// GOTO per state: non-terminal -> target state.
    pub goto: Vec<IndexMap<Symbol, usize>>,
    /// The LALR image of LR(1) state 0.
    pub initial: usize,
    conflicts: Vec<Conflict>,
}

impl LalrTable {
    /// Merge an LR(1) automaton into LALR(1) states and fill the
    /// ACTION/GOTO tables.
    ///
    /// Building never fails; ambiguity surfaces through
    /// [`LalrTable::conflicts`] instead.
    pub fn build(automaton: &Lr1Automaton) -> Self {
        // Group LR(1) states by kernel, in first-encounter order. Every
        // state lands in exactly one group, so the old -> new mapping is
        // total (a state with a unique kernel forms its own group).
        let mut groups: IndexMap<BTreeSet<(ProdId, usize)>, Vec<usize>> = IndexMap::new();
        for (id, state) in automaton.states.iter().enumerate() {
            groups
                .entry(kernel_of(state, automaton.augmented))
                .or_default()
                .push(id);
        }

        let mut states: Vec<Vec<Lr1Item>> = Vec::with_capacity(groups.len());
        let mut old_to_new: Vec<usize> = vec![0; automaton.states.len()];

        for (new_id, group) in groups.values().enumerate() {
            // Union the lookaheads attached to each (production, dot)
            // across the whole group, then re-emit one item per lookahead.
            let mut lookaheads: IndexMap<(ProdId, usize), IndexSet<Symbol>> = IndexMap::new();
            for &old_id in group {
                for item in &automaton.states[old_id] {
                    lookaheads
                        .entry(item.kernel())
                        .or_default()
                        .insert(item.lookahead.clone());
                }
            }

            let mut merged: Vec<Lr1Item> = lookaheads
                .into_iter()
                .flat_map(|((prod, dot), las)| {
                    las.into_iter().map(move |la| Lr1Item::new(prod, dot, la))
                })
                .collect();
            merged.sort();
            merged.dedup();

            states.push(merged);
            for &old_id in group {
                old_to_new[old_id] = new_id;
            }
        }

        let initial = old_to_new[0];

        // Remap transitions; kernel-equivalent sources agree on targets,
        // so duplicate inserts always carry the same value.
        let mut transitions: Vec<IndexMap<Symbol, usize>> = vec![IndexMap::new(); states.len()];
        for (old_id, outgoing) in automaton.transitions.iter().enumerate() {
            for (symbol, &old_target) in outgoing {
                let previous = transitions[old_to_new[old_id]]
                    .insert(symbol.clone(), old_to_new[old_target]);
                debug_assert!(
                    previous.is_none() || previous == Some(old_to_new[old_target]),
                    "kernel-equivalent states disagreed on a transition"
                );
            }
        }

        debug!(
            "lalr: merged {} LR(1) states into {}",
            automaton.states.len(),
            states.len()
        );

        let mut table = LalrTable {
            grammar: automaton.grammar.clone(),
            augmented: automaton.augmented,
            states,
            transitions,
            action: Vec::new(),
            goto: Vec::new(),
            initial,
            conflicts: Vec::new(),
        };
        table.fill_action_goto();
        table
    }

    /// The conflicts recorded during table fill, in fill order.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    fn fill_action_goto(&mut self) {
        self.action = vec![IndexMap::new(); self.states.len()];
        self.goto = vec![IndexMap::new(); self.states.len()];

        for state in 0..self.states.len() {
            // Shifts from terminal transitions.
            for (symbol, &target) in &self.transitions[state] {
                if symbol.is_terminal() {
                    try_set(
                        &mut self.action[state],
                        &mut self.conflicts,
                        state,
                        symbol,
                        Action::Shift(target),
                    );
                }
            }

            // Reductions (and accept) from dot-at-end items.
            for item in &self.states[state] {
                let production = &self.grammar.productions[item.prod];
                if item.dot < production.right.len() {
                    continue;
                }
                let action = if item.prod == self.augmented && item.lookahead == Symbol::end() {
                    Action::Accept
                } else {
                    Action::Reduce(item.prod)
                };
                try_set(
                    &mut self.action[state],
                    &mut self.conflicts,
                    state,
                    &item.lookahead,
                    action,
                );
            }

            // GOTO from non-terminal transitions.
            for (symbol, &target) in &self.transitions[state] {
                if symbol.is_non_terminal() {
                    self.goto[state].insert(symbol.clone(), target);
                }
            }
        }

        if !self.conflicts.is_empty() {
            debug!("lalr: {} conflicts recorded", self.conflicts.len());
        }
    }
}

/// Set a cell unless occupied; an occupied cell keeps its first action and
/// the attempt is recorded as a conflict.
fn try_set(
    row: &mut IndexMap<Symbol, Action>,
    conflicts: &mut Vec<Conflict>,
    state: usize,
    symbol: &Symbol,
    action: Action,
) {
    match row.get(symbol) {
        None => {
            row.insert(symbol.clone(), action);
        }
        Some(&existing) if existing == action => {}
        Some(&existing) => {
            conflicts.push(Conflict {
                state,
                symbol: symbol.clone(),
                existing,
                attempted: action,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Production;

    fn expr_grammar() -> Grammar {
        // E -> E + E | id
        let e = Symbol::non_terminal("E");
        let plus = Symbol::terminal("+");
        let id = Symbol::terminal("id");
        Grammar::new(
            e.clone(),
            [plus.clone(), id.clone()].into_iter().collect(),
            [e.clone()].into_iter().collect(),
            vec![
                Production::new(e.clone(), vec![e.clone(), plus, e.clone()]),
                Production::new(e, vec![id]),
            ],
        )
    }

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
    fn test_merge_never_grows_state_count() {
        for grammar in [paren_grammar(), expr_grammar()] {
            let lr1 = Lr1Automaton::build(&grammar);
            let table = LalrTable::build(&lr1);
            assert!(table.states.len() <= lr1.states.len());
        }
    }

    #[test]
    fn test_kernels_partition_lr1_states() {
        let lr1 = Lr1Automaton::build(&paren_grammar());
        let table = LalrTable::build(&lr1);

        // Each LR(1) state's kernel equals the kernel of its LALR image.
        let mut seen: Vec<Option<BTreeSet<(ProdId, usize)>>> = vec![None; table.states.len()];
        for (old_id, state) in lr1.states.iter().enumerate() {
            let kernel = kernel_of(state, lr1.augmented);
            let lalr_id = table
                .states
                .iter()
                .position(|s| kernel_of(s, table.augmented) == kernel)
                .expect("every kernel survives the merge");
            match &seen[lalr_id] {
                None => seen[lalr_id] = Some(kernel),
                Some(existing) => {
                    assert_eq!(existing, &kernel, "state {old_id} mapped across kernels")
                }
            }
        }
    }

    #[test]
    fn test_ambiguous_expression_reports_shift_reduce() {
        let lr1 = Lr1Automaton::build(&expr_grammar());
        let table = LalrTable::build(&lr1);
        assert!(
            table
                .conflicts()
                .iter()
                .any(|c| c.kind() == ConflictKind::ShiftReduce),
            "E -> E + E | id must produce a shift/reduce conflict, got {:?}",
            table.conflicts()
        );
    }

    #[test]
    fn test_parenthesis_grammar_is_conflict_free() {
        let lr1 = Lr1Automaton::build(&paren_grammar());
        let table = LalrTable::build(&lr1);
        assert!(
            table.conflicts().is_empty(),
            "unexpected conflicts: {:?}",
            table.conflicts()
        );
    }

    #[test]
    fn test_accept_cell_present_in_augmented_state() {
        let lr1 = Lr1Automaton::build(&paren_grammar());
        let table = LalrTable::build(&lr1);
        let accepts = table
            .action
            .iter()
            .flat_map(|row| row.values())
            .filter(|a| matches!(a, Action::Accept))
            .count();
        assert_eq!(accepts, 1, "exactly one accept cell");
    }

    #[test]
    fn test_conflicted_cell_keeps_first_action() {
        let lr1 = Lr1Automaton::build(&expr_grammar());
        let table = LalrTable::build(&lr1);
        for conflict in table.conflicts() {
            let kept = table.action[conflict.state]
                .get(&conflict.symbol)
                .expect("conflicted cell still filled");
            assert_eq!(kept, &conflict.existing, "first-wins cell was overwritten");
        }
    }
}
