//! FIRST set computation over a grammar's full symbol set.
//!
//! For a terminal `t` (and for `$`), `FIRST(t) = {t}`. Non-terminal sets
//! are grown to a fixed point with the standard ε rules: for each
//! production `A -> X₁ … Xₙ`, add `FIRST(Xᵢ) \ {ε}` up to and including
//! the first `Xᵢ` that is not nullable; if every `Xᵢ` is nullable (or
//! `n = 0`), `ε ∈ FIRST(A)`.

use indexmap::{IndexMap, IndexSet};

use crate::grammar::{Grammar, Symbol};

/// Precomputed FIRST sets for every symbol of a grammar.
#[derive(Debug, Clone)]
pub struct FirstSets {
    sets: IndexMap<Symbol, IndexSet<Symbol>>,
}

impl FirstSets {
    /// Compute FIRST sets for all symbols of `grammar`, iterating
    /// productions in declaration order until nothing changes.
    pub fn build(grammar: &Grammar) -> Self {
        let mut sets: IndexMap<Symbol, IndexSet<Symbol>> = IndexMap::new();

        for terminal in &grammar.terminals {
            sets.entry(terminal.clone())
                .or_default()
                .insert(terminal.clone());
        }
        let end = Symbol::end();
        sets.entry(end.clone()).or_default().insert(end);
        for non_terminal in &grammar.non_terminals {
            sets.entry(non_terminal.clone()).or_default();
        }

        let epsilon = Symbol::epsilon();
        loop {
            let mut changed = false;
            for production in &grammar.productions {
                if production.right.is_empty() {
                    if sets[&production.left].insert(epsilon.clone()) {
                        changed = true;
                    }
                    continue;
                }

                let mut all_nullable = true;
                for symbol in &production.right {
                    let first_of_symbol: Vec<Symbol> = sets
                        .get(symbol)
                        .map(|s| s.iter().cloned().collect())
                        .unwrap_or_default();
                    let nullable = first_of_symbol.contains(&epsilon);
                    let target = sets.entry(production.left.clone()).or_default();
                    for candidate in first_of_symbol {
                        if candidate != epsilon && target.insert(candidate) {
                            changed = true;
                        }
                    }
                    if !nullable {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable && sets[&production.left].insert(epsilon.clone()) {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        FirstSets { sets }
    }

    /// FIRST of a single symbol. Unknown symbols have an empty set.
    pub fn first(&self, symbol: &Symbol) -> Option<&IndexSet<Symbol>> {
        self.sets.get(symbol)
    }

    /// FIRST of the sequence `seq` followed by the single terminal
    /// `lookahead` — the lookahead computation for LR(1) closure items.
    ///
    /// Accumulates non-ε members of `FIRST(Xᵢ)` until some `Xᵢ` is not
    /// nullable; if the whole of `seq` is nullable, the lookahead itself
    /// is included (a terminal's FIRST is itself, so the walk stops
    /// there).
    pub fn first_of_sequence(&self, seq: &[Symbol], lookahead: &Symbol) -> IndexSet<Symbol> {
        let epsilon = Symbol::epsilon();
        let mut result = IndexSet::new();

        for symbol in seq.iter().chain(std::iter::once(lookahead)) {
            let Some(first_of_symbol) = self.sets.get(symbol) else {
                break;
            };
            let mut nullable = false;
            for candidate in first_of_symbol {
                if *candidate == epsilon {
                    nullable = true;
                } else {
                    result.insert(candidate.clone());
                }
            }
            if !nullable {
                return result;
            }
        }

        result.insert(epsilon);
        result
    }
}
