//! Thompson construction: postfix regex → NFA.
//!
//! The builder consumes a postfix stream left to right over a stack of
//! fragments, all allocated in one arena. Each fragment has exactly one
//! start and one end state; operators wire fragments together with epsilon
//! edges and never re-target a popped fragment's outer states from outside
//! the fragment:
//!
//! ```text
//!   c        s ──c──▶ e
//!   A·B      A.end ──ε──▶ B.start
//!   A|B      s ──ε──▶ {A.start, B.start},  {A.end, B.end} ──ε──▶ e
//!   A*       s ──ε──▶ {A.start, e},  A.end ──ε──▶ {A.start, e}
//!   A+       s ──ε──▶ A.start,       A.end ──ε──▶ {A.start, e}
//!   A?       s ──ε──▶ {A.start, e},  A.end ──ε──▶ e
//! ```
//!
//! `*`, `?`, and `|` introduce exactly two fresh states; concatenation
//! introduces none. `+` has no `s ──ε──▶ e` skip edge — one occurrence is
//! mandatory.

use log::debug;

use super::regex::{self, RegexError, CONCAT};
use super::{Nfa, StateId};

/// An NFA fragment under construction: one start, one end.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// Parse an infix regex into an NFA.
///
/// Converts to postfix via the shunting yard and runs [`thompson`]. The
/// resulting NFA's end state is marked accepting (untagged); use
/// [`Nfa::tag_accept`] to attach a token type and priority.
pub fn parse(infix: &str) -> Result<Nfa, RegexError> {
    let postfix = regex::to_postfix(infix)?;
    thompson(&postfix)
}

/// Build an NFA from a postfix regex via Thompson's construction.
///
/// # Errors
///
/// Fails fast, naming the offending character, when an operator finds too
/// few fragments on the stack, when a stray parenthesis reaches the
/// postfix stream, or when the stream does not reduce to exactly one
/// fragment.
pub fn thompson(postfix: &str) -> Result<Nfa, RegexError> {
    let mut nfa = Nfa::empty();
    let mut stack: Vec<Fragment> = Vec::new();

    for (pos, c) in postfix.chars().enumerate() {
        match c {
            CONCAT => {
                let (a, b) = pop2(&mut stack, pos, c)?;
                nfa.add_epsilon(a.end, b.start);
                stack.push(Fragment { start: a.start, end: b.end });
            }
            '|' => {
                let (a, b) = pop2(&mut stack, pos, c)?;
                let start = nfa.add_state();
                let end = nfa.add_state();
                nfa.add_epsilon(start, a.start);
                nfa.add_epsilon(start, b.start);
                nfa.add_epsilon(a.end, end);
                nfa.add_epsilon(b.end, end);
                stack.push(Fragment { start, end });
            }
            '*' => {
                let a = pop1(&mut stack, pos, c)?;
                let start = nfa.add_state();
                let end = nfa.add_state();
                nfa.add_epsilon(start, a.start);
                nfa.add_epsilon(start, end);
                nfa.add_epsilon(a.end, a.start);
                nfa.add_epsilon(a.end, end);
                stack.push(Fragment { start, end });
            }
            '+' => {
                let a = pop1(&mut stack, pos, c)?;
                let start = nfa.add_state();
                let end = nfa.add_state();
                nfa.add_epsilon(start, a.start);
                nfa.add_epsilon(a.end, a.start);
                nfa.add_epsilon(a.end, end);
                stack.push(Fragment { start, end });
            }
            '?' => {
                let a = pop1(&mut stack, pos, c)?;
                let start = nfa.add_state();
                let end = nfa.add_state();
                nfa.add_epsilon(start, a.start);
                nfa.add_epsilon(start, end);
                nfa.add_epsilon(a.end, end);
                stack.push(Fragment { start, end });
            }
            _ if regex::is_operand(c) => {
                let start = nfa.add_state();
                let end = nfa.add_state();
                nfa.add_transition(start, c, end);
                stack.push(Fragment { start, end });
            }
            _ => {
                return Err(RegexError::new(
                    pos,
                    format!("invalid character in postfix: '{c}'"),
                ));
            }
        }
    }

    let top = stack.pop().ok_or_else(|| RegexError::new(0, "empty postfix"))?;
    if !stack.is_empty() {
        return Err(RegexError::new(
            postfix.chars().count(),
            format!("postfix did not reduce to one fragment ({} left over)", stack.len() + 1),
        ));
    }

    nfa.start = top.start;
    nfa.end = Some(top.end);
    nfa.states[top.end as usize].accept = true;
    debug!("thompson: {} states for postfix {postfix:?}", nfa.states.len());
    Ok(nfa)
}

/// Combine several tagged NFAs into one multi-token lexer NFA.
///
/// A fresh start state gets an epsilon edge to each member's start. The
/// member arenas are merged by rebasing every state id by the running
/// offset, so ids stay unique in the combined arena. The result has no
/// single end state; its accepting states are the members' tagged ends.
pub fn union(nfas: Vec<Nfa>) -> Nfa {
    let mut combined = Nfa::empty();
    let start = combined.add_state();
    combined.start = start;

    for nfa in nfas {
        let offset = combined.states.len() as StateId;
        for mut state in nfa.states {
            for transition in &mut state.transitions {
                transition.target += offset;
            }
            combined.states.push(state);
        }
        combined.add_epsilon(start, nfa.start + offset);
    }

    combined
}

fn pop1(stack: &mut Vec<Fragment>, pos: usize, op: char) -> Result<Fragment, RegexError> {
    stack
        .pop()
        .ok_or_else(|| RegexError::new(pos, format!("operator '{op}' is missing its operand")))
}

fn pop2(
    stack: &mut Vec<Fragment>,
    pos: usize,
    op: char,
) -> Result<(Fragment, Fragment), RegexError> {
    let b = pop1(stack, pos, op)?;
    let a = pop1(stack, pos, op)?;
    Ok((a, b))
}
