//! Maximal-munch scanner over a multi-token lexer DFA.
//!
//! The DFA comes from [`nfa::union`](super::nfa::union) of per-token
//! tagged NFAs, run through subset construction and minimization. The
//! scanner repeatedly runs the DFA as far as the input allows, remembers
//! the last accepting position, and emits a token for the longest match
//! before restarting at the following character.

use crate::driver::Token;

use super::Dfa;

/// Error raised when no token matches at some input position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Character offset where scanning got stuck.
    pub position: usize,
    pub message: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lexical error at offset {}: {}", self.position, self.message)
    }
}

impl std::error::Error for LexError {}

/// Tokenize `input` with a lexer DFA using maximal munch.
///
/// Whitespace between tokens is skipped. Each emitted [`Token`] carries
/// the accepting state's tag as its type and the matched slice as its
/// lexeme. If the DFA cannot make progress on a non-whitespace character,
/// scanning stops with a [`LexError`] naming the position.
pub fn scan(dfa: &Dfa, input: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos].is_whitespace() {
            pos += 1;
            continue;
        }

        let mut state = dfa.start;
        let mut cursor = pos;
        // (end position, token tag) of the longest accepting run so far
        let mut last_accept: Option<(usize, Option<String>)> = None;

        while cursor < chars.len() {
            match dfa.states[state as usize].transition(chars[cursor]) {
                Some(next) => {
                    state = next;
                    cursor += 1;
                    if dfa.states[state as usize].accept {
                        last_accept =
                            Some((cursor, dfa.states[state as usize].token.clone()));
                    }
                }
                None => break,
            }
        }

        match last_accept {
            Some((end, tag)) => {
                let lexeme: String = chars[pos..end].iter().collect();
                tokens.push(Token::new(tag, lexeme));
                pos = end;
            }
            None => {
                return Err(LexError {
                    position: pos,
                    message: format!("no token matches at '{}'", chars[pos]),
                });
            }
        }
    }

    Ok(tokens)
}
