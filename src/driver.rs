//! The shift-reduce parsing engine over an LALR(1) table.
//!
//! A parse runs an integer state stack against the ACTION/GOTO maps,
//! consuming tokens with a `$` sentinel appended. There is no error
//! recovery: the first missing cell ends the parse with the position of
//! the failing token.

use crate::grammar::Symbol;
use crate::lalr::{Action, LalrTable};

/// A token as consumed by the driver.
///
/// The terminal symbol used for ACTION lookup is the declared type when
/// present, otherwise the lexeme itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: Option<String>,
    pub lexeme: String,
}

impl Token {
    pub fn new(ty: Option<String>, lexeme: impl Into<String>) -> Self {
        Token { ty, lexeme: lexeme.into() }
    }

    /// A token with a declared type.
    pub fn typed(ty: impl Into<String>, lexeme: impl Into<String>) -> Self {
        Token { ty: Some(ty.into()), lexeme: lexeme.into() }
    }

    /// A token identified by its lexeme alone.
    pub fn bare(lexeme: impl Into<String>) -> Self {
        Token { ty: None, lexeme: lexeme.into() }
    }

    /// The terminal name this token resolves to: `ty`, falling back to
    /// the lexeme.
    pub fn terminal_name(&self) -> &str {
        self.ty.as_deref().unwrap_or(&self.lexeme)
    }
}

/// Syntax error: the cursor position (token index; the input length for
/// the `$` sentinel) where no action or goto applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError {
    pub position: usize,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "syntax error at token {}", self.position)
    }
}

impl std::error::Error for SyntaxError {}

impl LalrTable {
    /// Parse a token stream against this table.
    ///
    /// Returns `Ok(())` on ACCEPT and the failing cursor position
    /// otherwise. Popping past the seeded bottom of the state stack would
    /// be an internal invariant breach and panics in debug builds.
    pub fn parse(&self, tokens: &[Token]) -> Result<(), SyntaxError> {
        let mut stack: Vec<usize> = vec![self.initial];
        let mut cursor = 0usize;

        loop {
            let state = *stack.last().expect("state stack is never empty");
            let terminal = match tokens.get(cursor) {
                Some(token) => Symbol::terminal(token.terminal_name()),
                None => Symbol::end(),
            };

            let action = self.action[state]
                .get(&terminal)
                .ok_or(SyntaxError { position: cursor })?;

            match *action {
                Action::Shift(target) => {
                    stack.push(target);
                    cursor += 1;
                }
                Action::Reduce(prod) => {
                    let production = &self.grammar.productions[prod];
                    let arity = production.right.len();
                    let remaining = stack
                        .len()
                        .checked_sub(arity)
                        .filter(|&depth| depth > 0)
                        .expect("reduction would empty the state stack");
                    stack.truncate(remaining);

                    let exposed = *stack.last().expect("state stack is never empty");
                    let target = self.goto[exposed]
                        .get(&production.left)
                        .ok_or(SyntaxError { position: cursor })?;
                    stack.push(*target);
                }
                Action::Accept => return Ok(()),
            }
        }
    }

    /// Whether this table accepts the token stream.
    pub fn accepts(&self, tokens: &[Token]) -> bool {
        self.parse(tokens).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, Production};
    use crate::lr1::Lr1Automaton;

    fn paren_table() -> LalrTable {
        let s = Symbol::non_terminal("S");
        let lp = Symbol::terminal("(");
        let rp = Symbol::terminal(")");
        let grammar = Grammar::new(
            s.clone(),
            [lp.clone(), rp.clone()].into_iter().collect(),
            [s.clone()].into_iter().collect(),
            vec![
                Production::new(s.clone(), vec![lp, s.clone(), rp]),
                Production::new(s, vec![]),
            ],
        );
        LalrTable::build(&Lr1Automaton::build(&grammar))
    }

    fn bare(input: &str) -> Vec<Token> {
        input.chars().map(|c| Token::bare(c.to_string())).collect()
    }

    #[test]
    fn test_accepts_balanced_parentheses() {
        let table = paren_table();
        assert!(table.accepts(&bare("")));
        assert!(table.accepts(&bare("()")));
        assert!(table.accepts(&bare("(())")));
    }

    #[test]
    fn test_rejects_unbalanced_with_position() {
        let table = paren_table();
        let err = table.parse(&bare("(()")).unwrap_err();
        // the `$` sentinel is reached while a `)` is still required
        assert_eq!(err.position, 3);
        assert!(!table.accepts(&bare(")")));
        assert!(!table.accepts(&bare("())")));
    }

    #[test]
    fn test_type_preferred_over_lexeme() {
        let table = paren_table();
        // type says `(`/`)` even though the lexemes are gibberish
        let tokens = vec![Token::typed("(", "<open>"), Token::typed(")", "<close>")];
        assert!(table.accepts(&tokens));

        // a wrong declared type must not fall back to the lexeme
        let tokens = vec![Token::typed("?", "("), Token::bare(")")];
        assert!(!table.accepts(&tokens));
    }

    #[test]
    fn test_lexeme_fallback_when_type_absent() {
        let table = paren_table();
        let tokens = vec![Token::bare("("), Token::bare(")")];
        assert!(table.accepts(&tokens));
    }
}
