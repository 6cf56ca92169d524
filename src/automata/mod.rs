//! Automata infrastructure for the lexer pipeline.
//!
//! Provides NFA/DFA types and the regex compilation pipeline:
//! `regex -> postfix -> Thompson NFA -> subset construction -> minimized DFA`
//!
//! States live in arenas (`Vec` indexed by [`StateId`]) and transitions
//! store destination ids, never owning references — the `*`/`+` back-edges
//! make the NFA graph cyclic, and id-addressed arenas keep equality and
//! hashing trivial.

pub mod lexer;
pub mod minimize;
pub mod nfa;
pub mod regex;
pub mod subset;

use indexmap::{IndexMap, IndexSet};

pub use regex::RegexError;

/// Identifier for an automaton state: an index into its arena.
pub type StateId = u32;

/// The input alphabet for subset construction, iterated in insertion order.
pub type Alphabet = IndexSet<char>;

/// A single NFA transition. `symbol == None` is an epsilon transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfaTransition {
    pub symbol: Option<char>,
    pub target: StateId,
}

/// NFA state: outgoing transitions plus acceptance attributes.
///
/// Accepting states may carry a token-type tag and a priority used for
/// disambiguation when several accepting NFA states land in one DFA state.
/// Lower priority wins; the default is `u32::MAX` (loses to everything).
#[derive(Debug, Clone)]
pub struct NfaState {
    pub transitions: Vec<NfaTransition>,
    pub accept: bool,
    pub token: Option<String>,
    pub priority: u32,
}

impl NfaState {
    /// Create a new non-accepting state with no transitions.
    pub fn new() -> Self {
        NfaState {
            transitions: Vec::new(),
            accept: false,
            token: None,
            priority: u32::MAX,
        }
    }

    /// Targets reachable on epsilon transitions.
    pub fn epsilon_targets(&self) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(|t| t.symbol.is_none())
            .map(|t| t.target)
    }

    /// Targets reachable on `symbol` (non-epsilon).
    pub fn targets_on(&self, symbol: char) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(move |t| t.symbol == Some(symbol))
            .map(|t| t.target)
    }
}

impl Default for NfaState {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete NFA: an arena of states, a start state, and — for Thompson
/// NFAs — a single end state. NFAs built by [`nfa::union`] have no single
/// end (`end == None`); their accepting states are the tagged member ends.
///
/// State ids are assigned monotonically per arena, so every build numbers
/// its own states and independent builds never share a counter.
#[derive(Debug, Clone)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: StateId,
    pub end: Option<StateId>,
}

impl Nfa {
    pub(crate) fn empty() -> Self {
        Nfa { states: Vec::new(), start: 0, end: None }
    }

    /// Add a new state and return its id.
    pub fn add_state(&mut self) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(NfaState::new());
        id
    }

    /// Add an epsilon transition `from -> to`.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from as usize]
            .transitions
            .push(NfaTransition { symbol: None, target: to });
    }

    /// Add a labeled transition `from --symbol--> to`.
    pub fn add_transition(&mut self, from: StateId, symbol: char, to: StateId) {
        self.states[from as usize]
            .transitions
            .push(NfaTransition { symbol: Some(symbol), target: to });
    }

    /// Mark this NFA's end state accepting with a token tag and priority.
    ///
    /// This is the per-token step before [`nfa::union`] combines several
    /// tagged NFAs into one multi-token lexer NFA.
    ///
    /// # Panics
    ///
    /// Panics if the NFA has no single end state (i.e. it was itself built
    /// by `union`).
    pub fn tag_accept(&mut self, token: &str, priority: u32) {
        let end = self.end.expect("tag_accept requires a single end state");
        let state = &mut self.states[end as usize];
        state.accept = true;
        state.token = Some(token.to_string());
        state.priority = priority;
    }

    /// Whether the NFA accepts `input`, by direct simulation
    /// (epsilon-closure + move).
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = subset::epsilon_closure(self, &[self.start]);
        for symbol in input.chars() {
            let moved = subset::move_set(self, &current, symbol);
            if moved.is_empty() {
                return false;
            }
            current = subset::epsilon_closure(self, &moved);
        }
        current.iter().any(|&s| self.states[s as usize].accept)
    }
}

/// DFA state produced by subset construction.
///
/// Identity is the `name`: the sorted set of member NFA state ids. Two DFA
/// states are equal iff their names are equal. Transitions are functional —
/// at most one target per symbol — and iterate in insertion order.
#[derive(Debug, Clone)]
pub struct DfaState {
    /// Assigned id (discovery order).
    pub id: StateId,
    /// Member NFA states, sorted ascending.
    pub name: Vec<StateId>,
    pub transitions: IndexMap<char, StateId>,
    pub accept: bool,
    /// Token tag inherited from the accepting member with minimum priority
    /// (ties broken by lowest member id).
    pub token: Option<String>,
    pub priority: u32,
}

impl DfaState {
    pub(crate) fn new(id: StateId, name: Vec<StateId>) -> Self {
        DfaState {
            id,
            name,
            transitions: IndexMap::new(),
            accept: false,
            token: None,
            priority: u32::MAX,
        }
    }

    /// Target of the transition on `symbol`, if any.
    pub fn transition(&self, symbol: char) -> Option<StateId> {
        self.transitions.get(&symbol).copied()
    }
}

impl PartialEq for DfaState {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DfaState {}

/// A complete DFA: states in discovery order, start state first.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub states: Vec<DfaState>,
    pub start: StateId,
}

impl Dfa {
    /// Whether the DFA accepts `input`.
    pub fn accepts(&self, input: &str) -> bool {
        let mut state = self.start;
        for symbol in input.chars() {
            match self.states[state as usize].transition(symbol) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.states[state as usize].accept
    }

    /// The accepting token tag of `state`, if it is accepting.
    pub fn token_of(&self, state: StateId) -> Option<&str> {
        self.states[state as usize].token.as_deref()
    }
}

/// Compile a single infix regex all the way to a minimized DFA.
///
/// Runs the full pipeline: concatenation insertion, shunting yard,
/// Thompson construction, subset construction over `alphabet`, and
/// table-filling minimization.
pub fn compile(pattern: &str, alphabet: &Alphabet) -> Result<Dfa, RegexError> {
    let nfa = nfa::parse(pattern)?;
    let dfa = subset::subset_construction(&nfa, alphabet);
    Ok(minimize::minimize(&dfa, alphabet))
}
