//! Grammar value types: symbols, productions, and the grammar consumed by
//! the LR(1)/LALR(1) builders.
//!
//! Symbols compare and hash by `(name, kind)`. Two terminals are reserved:
//! `$` (end of input) and `ε` (empty). Terminal and non-terminal sets are
//! insertion-ordered — declaration order is the iteration order everywhere
//! downstream, which keeps state discovery and table fill deterministic.

use indexmap::IndexSet;

/// Name of the reserved end-of-input terminal.
pub const END_MARK: &str = "$";
/// Name of the reserved empty-string marker.
pub const EPSILON: &str = "ε";

/// Whether a symbol is a terminal or a non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

/// A grammar symbol, identified by name and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol { name: name.into(), kind: SymbolKind::Terminal }
    }

    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol { name: name.into(), kind: SymbolKind::NonTerminal }
    }

    /// The reserved `$` end-of-input terminal.
    pub fn end() -> Self {
        Symbol::terminal(END_MARK)
    }

    /// The reserved `ε` empty marker.
    pub fn epsilon() -> Self {
        Symbol::terminal(EPSILON)
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    pub fn is_non_terminal(&self) -> bool {
        self.kind == SymbolKind::NonTerminal
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Index of a production in a grammar's (possibly augmented) list.
pub type ProdId = usize;

/// A production `left -> right`. An empty `right` is an ε-production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub left: Symbol,
    pub right: Vec<Symbol>,
}

impl Production {
    /// Build a production, normalizing an `[ε]` right-hand side (the
    /// loader's empty marker) to the empty sequence.
    pub fn new(left: Symbol, right: Vec<Symbol>) -> Self {
        let right = if right.len() == 1 && right[0] == Symbol::epsilon() {
            Vec::new()
        } else {
            right
        };
        Production { left, right }
    }

    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }
}

impl std::fmt::Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.left)?;
        if self.right.is_empty() {
            write!(f, " {EPSILON}")?;
        }
        for symbol in &self.right {
            write!(f, " {symbol}")?;
        }
        Ok(())
    }
}

/// A context-free grammar as produced by the loader: a start symbol,
/// declaration-ordered terminal and non-terminal sets, and an ordered
/// production list.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub start: Symbol,
    pub terminals: IndexSet<Symbol>,
    pub non_terminals: IndexSet<Symbol>,
    pub productions: Vec<Production>,
}

impl Grammar {
    pub fn new(
        start: Symbol,
        terminals: IndexSet<Symbol>,
        non_terminals: IndexSet<Symbol>,
        productions: Vec<Production>,
    ) -> Self {
        Grammar { start, terminals, non_terminals, productions }
    }

    /// All grammar symbols — terminals first, then non-terminals, each in
    /// declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.terminals.iter().chain(self.non_terminals.iter())
    }

    /// Productions whose left-hand side is `non_terminal`, with their ids.
    pub fn productions_for<'a>(
        &'a self,
        non_terminal: &'a Symbol,
    ) -> impl Iterator<Item = (ProdId, &'a Production)> {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.left == *non_terminal)
    }

    /// Produce the augmented grammar and the id of the augmented
    /// production `S' -> S`.
    ///
    /// The augmented production is identified downstream by this id alone;
    /// the `'`-suffixed name exists only for display, so a grammar that
    /// already declares such a name cannot be confused with it.
    pub fn augment(&self) -> (Grammar, ProdId) {
        let mut augmented = self.clone();
        let fresh = Symbol::non_terminal(format!("{}'", self.start.name));
        let id = augmented.productions.len();
        augmented
            .productions
            .push(Production::new(fresh.clone(), vec![self.start.clone()]));
        augmented.non_terminals.insert(fresh.clone());
        augmented.start = fresh;
        (augmented, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_equality_by_name_and_kind() {
        assert_eq!(Symbol::terminal("x"), Symbol::terminal("x"));
        assert_ne!(Symbol::terminal("x"), Symbol::non_terminal("x"));
        assert_ne!(Symbol::terminal("x"), Symbol::terminal("y"));
    }

    #[test]
    fn test_epsilon_right_normalizes_to_empty() {
        let p = Production::new(Symbol::non_terminal("S"), vec![Symbol::epsilon()]);
        assert!(p.is_epsilon());
        assert_eq!(p.to_string(), format!("S -> {EPSILON}"));
    }

    #[test]
    fn test_augment_appends_fresh_production() {
        let s = Symbol::non_terminal("S");
        let grammar = Grammar::new(
            s.clone(),
            [Symbol::terminal("a")].into_iter().collect(),
            [s.clone()].into_iter().collect(),
            vec![Production::new(s.clone(), vec![Symbol::terminal("a")])],
        );
        let (augmented, id) = grammar.augment();
        assert_eq!(id, 1);
        assert_eq!(augmented.productions[id].left.name, "S'");
        assert_eq!(augmented.productions[id].right, vec![s]);
        assert_eq!(augmented.start.name, "S'");
    }
}
