//! # LALRtail — compiler front-end core
//!
//! LALRtail implements the two classical front-end compilation pipelines as
//! in-memory table builders:
//!
//! ```text
//!  regex text ──▶ insert `·` ──▶ shunting yard ──▶ Thompson NFA
//!             ──▶ subset construction ──▶ table-filling minimization ──▶ DFA
//!
//!  grammar ──▶ FIRST sets ──▶ LR(1) canonical collection
//!          ──▶ LALR(1) kernel merge ──▶ ACTION/GOTO table ──▶ driver
//! ```
//!
//! The lexer side lives under [`automata`]: regex preprocessing
//! ([`automata::regex`]), Thompson construction ([`automata::nfa`]),
//! subset construction ([`automata::subset`]), table-filling minimization
//! ([`automata::minimize`]), and a maximal-munch scanner
//! ([`automata::lexer`]) that turns a multi-token DFA into [`Token`]s.
//!
//! The parser side is flat: grammar value types ([`grammar`]), FIRST sets
//! ([`first`]), the LR(1) canonical collection ([`lr1`]), LALR(1) merging
//! and table fill ([`lalr`]), and the shift-reduce engine ([`driver`]).
//!
//! Every build is a closed, single-threaded computation: owned inputs in,
//! owned automata/tables out. Discovery order is deterministic — the input
//! alphabet and the grammar's symbol and production declarations are
//! iterated in insertion order, so state ids, table cells, and conflict
//! reports are reproducible across runs.

pub mod automata;
pub mod driver;
pub mod first;
pub mod grammar;
pub mod lalr;
pub mod lr1;

#[cfg(test)]
mod tests;

pub use automata::{compile, Alphabet, Dfa, DfaState, Nfa, NfaState, StateId};
pub use driver::{SyntaxError, Token};
pub use first::FirstSets;
pub use grammar::{Grammar, ProdId, Production, Symbol, SymbolKind};
pub use lalr::{Action, Conflict, ConflictKind, LalrTable};
pub use lr1::{Lr1Automaton, Lr1Item};
