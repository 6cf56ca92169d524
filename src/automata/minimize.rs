//! DFA minimization via the table-filling algorithm.
//!
//! 1. Seed: a pair of states is distinguishable iff exactly one accepts.
//! 2. Iterate to a fixed point: an undistinguished pair `(p, q)` becomes
//!    distinguishable on a symbol where exactly one side has a transition,
//!    or where the (canonicalized) target pair is already distinguishable.
//! 3. Union every unmarked pair in a disjoint-set forest; each class is
//!    represented by its lowest-id member.
//! 4. Rebuild: one minimized state per class, start class first, remaining
//!    classes in ascending representative order; the representative's
//!    edges are mapped through the class map.
//!
//! Pairs are canonicalized lower-id-first throughout.

use log::debug;

use super::{Alphabet, Dfa, DfaState, StateId};

/// Disjoint-set forest over state indices with path compression.
///
/// Union keeps the smaller root, so the root of a set is always its
/// minimum member — `find` doubles as "representative with lowest id".
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        DisjointSets { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // lower id becomes the root
            if ra < rb {
                self.parent[rb] = ra;
            } else {
                self.parent[ra] = rb;
            }
        }
    }
}

/// Minimize a DFA with the table-filling equivalence algorithm.
///
/// Never fails on well-formed input; a DFA with at most one state is
/// returned unchanged. The minimized DFA accepts exactly the language of
/// the input, and no two of its states are equivalent under the filling
/// relation. Accepting classes take their token tag from the member with
/// minimum priority, ties broken by lowest id.
pub fn minimize(dfa: &Dfa, alphabet: &Alphabet) -> Dfa {
    let n = dfa.states.len();
    if n <= 1 {
        return dfa.clone();
    }

    // marked[i][j] (i < j): pair is distinguishable
    let mut marked = vec![false; n * n];
    let idx = |i: usize, j: usize| i * n + j;

    for i in 0..n {
        for j in (i + 1)..n {
            marked[idx(i, j)] = dfa.states[i].accept != dfa.states[j].accept;
        }
    }

    loop {
        let mut changed = false;
        for i in 0..n {
            for j in (i + 1)..n {
                if marked[idx(i, j)] {
                    continue;
                }
                for &symbol in alphabet {
                    let t1 = dfa.states[i].transition(symbol);
                    let t2 = dfa.states[j].transition(symbol);
                    let distinguishable = match (t1, t2) {
                        (None, None) => continue,
                        (Some(_), None) | (None, Some(_)) => true,
                        (Some(a), Some(b)) => {
                            let (lo, hi) = canonical(a, b);
                            lo != hi && marked[idx(lo as usize, hi as usize)]
                        }
                    };
                    if distinguishable {
                        marked[idx(i, j)] = true;
                        changed = true;
                        break;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    // Union every pair left unmarked; roots end up as lowest class ids.
    let mut sets = DisjointSets::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if !marked[idx(i, j)] {
                sets.union(i, j);
            }
        }
    }

    // Assign minimized ids in ascending representative order. The start
    // state's class comes first because the original start has id 0, so
    // its root is encountered first.
    let mut class_of: Vec<Option<StateId>> = vec![None; n];
    let mut members: Vec<Vec<usize>> = Vec::new();
    for i in 0..n {
        let root = sets.find(i);
        let class = match class_of[root] {
            Some(class) => class,
            None => {
                let class = members.len() as StateId;
                class_of[root] = Some(class);
                members.push(Vec::new());
                class
            }
        };
        class_of[i] = Some(class);
        members[class as usize].push(i);
    }

    let mut states: Vec<DfaState> = Vec::with_capacity(members.len());
    for (class, group) in members.iter().enumerate() {
        // group is in ascending id order; the representative is the first
        let rep = group[0];
        let mut state = DfaState::new(class as StateId, dfa.states[rep].name.clone());
        for &member in group {
            let original = &dfa.states[member];
            if !original.accept {
                continue;
            }
            state.accept = true;
            if original.priority < state.priority {
                state.priority = original.priority;
                state.token = original.token.clone();
            }
        }
        for (&symbol, &target) in &dfa.states[rep].transitions {
            let target_class = class_of[target as usize].expect("all states classified");
            state.transitions.insert(symbol, target_class);
        }
        states.push(state);
    }

    debug!("minimize: {} -> {} states", n, states.len());
    Dfa { states, start: 0 }
}

fn canonical(a: StateId, b: StateId) -> (StateId, StateId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
