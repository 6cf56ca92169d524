//! Subset construction: NFA → DFA.
//!
//! Standard powerset algorithm over an explicit input alphabet:
//! 1. The DFA start state is the epsilon-closure of the NFA start.
//! 2. For each unprocessed DFA state and each alphabet symbol, compute
//!    `epsilon_closure(move(S, a))`; an empty target adds no transition.
//! 3. DFA states are identified by their sorted NFA-state set — no two
//!    distinct DFA states share a name.
//!
//! A DFA state accepts iff any member NFA state accepts. When several
//! members accept, the token tag comes from the member with minimum
//! priority; ties go to the lowest member id.

use std::collections::HashMap;

use log::debug;

use super::{Alphabet, Dfa, DfaState, Nfa, StateId};

/// Compute the epsilon-closure of a set of NFA states: the smallest
/// superset closed under epsilon transitions. Worklist over states; the
/// result is sorted and deduplicated.
pub fn epsilon_closure(nfa: &Nfa, states: &[StateId]) -> Vec<StateId> {
    let mut closure: Vec<StateId> = states.to_vec();
    let mut stack: Vec<StateId> = states.to_vec();
    let mut visited = vec![false; nfa.states.len()];

    for &s in states {
        visited[s as usize] = true;
    }

    while let Some(state) = stack.pop() {
        for target in nfa.states[state as usize].epsilon_targets() {
            if !visited[target as usize] {
                visited[target as usize] = true;
                closure.push(target);
                stack.push(target);
            }
        }
    }

    closure.sort_unstable();
    closure.dedup();
    closure
}

/// States reachable from any member of `states` by a transition labeled
/// exactly `symbol` (non-epsilon). Sorted and deduplicated.
pub fn move_set(nfa: &Nfa, states: &[StateId], symbol: char) -> Vec<StateId> {
    let mut result: Vec<StateId> = Vec::new();
    for &s in states {
        result.extend(nfa.states[s as usize].targets_on(symbol));
    }
    result.sort_unstable();
    result.dedup();
    result
}

/// Convert an NFA to a DFA via subset construction over `alphabet`.
///
/// DFA states are created in discovery order (the start state is id 0)
/// and looked up by their sorted name set. The alphabet iterates in
/// insertion order, so discovery order — and therefore every emitted id —
/// is deterministic.
///
/// An empty or non-matching alphabet is not an error: the result is the
/// degenerate DFA containing only the start state.
pub fn subset_construction(nfa: &Nfa, alphabet: &Alphabet) -> Dfa {
    let mut states: Vec<DfaState> = Vec::new();
    // name (sorted member set) -> DFA state id
    let mut state_map: HashMap<Vec<StateId>, StateId> = HashMap::new();
    let mut worklist: Vec<StateId> = Vec::new();

    let start_set = epsilon_closure(nfa, &[nfa.start]);
    let mut start = DfaState::new(0, start_set.clone());
    resolve_accept(nfa, &mut start);
    states.push(start);
    state_map.insert(start_set, 0);
    worklist.push(0);

    while let Some(current) = worklist.pop() {
        for &symbol in alphabet {
            let moved = move_set(nfa, &states[current as usize].name, symbol);
            if moved.is_empty() {
                continue;
            }
            let target_set = epsilon_closure(nfa, &moved);

            let target = match state_map.get(&target_set) {
                Some(&existing) => existing,
                None => {
                    let id = states.len() as StateId;
                    let mut state = DfaState::new(id, target_set.clone());
                    resolve_accept(nfa, &mut state);
                    states.push(state);
                    state_map.insert(target_set, id);
                    worklist.push(id);
                    id
                }
            };

            states[current as usize].transitions.insert(symbol, target);
        }
    }

    debug!(
        "subset construction: {} NFA states -> {} DFA states over {} symbols",
        nfa.states.len(),
        states.len(),
        alphabet.len()
    );
    Dfa { states, start: 0 }
}

/// Derive a DFA state's acceptance from its members: accepting iff any
/// member accepts; the token tag comes from the accepting member with
/// minimum priority, ties broken by lowest id (names are sorted, so the
/// first strict improvement wins).
fn resolve_accept(nfa: &Nfa, state: &mut DfaState) {
    for &member in &state.name {
        let nfa_state = &nfa.states[member as usize];
        if !nfa_state.accept {
            continue;
        }
        state.accept = true;
        if nfa_state.priority < state.priority {
            state.priority = nfa_state.priority;
            state.token = nfa_state.token.clone();
        }
    }
}
