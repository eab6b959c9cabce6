//! Error type shared by construction, determinization and simulation.

use thiserror::Error;

/// Errors reported by automaton construction, determinization and
/// simulation.
///
/// Rejecting an input string is never an error; the simulator reports it as
/// an ordinary negative verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// No state is designated as the start state.
    #[error("automaton has no designated start state")]
    MissingStartState,

    /// The same state identity was declared more than once.
    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),

    /// A transition, start or accepting designation names a state that was
    /// never declared.
    #[error("undeclared state `{0}`")]
    UndefinedState(String),

    /// A transition uses a symbol outside the declared alphabet.
    #[error("symbol `{0}` is not in the declared alphabet")]
    UndefinedSymbol(char),
}
