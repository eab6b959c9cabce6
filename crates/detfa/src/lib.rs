//! Epsilon-NFA determinization and DFA string simulation.
//!
//! This crate implements the classical automata-theory core behind lexical
//! analyzers and pattern-matching front ends:
//! - a named-state automaton store with a validated two-phase builder
//! - epsilon-closure computation (terminating on cyclic epsilon graphs)
//! - subset construction (powerset determinization) with set-keyed state
//!   deduplication
//! - DFA string-acceptance simulation
//!
//! ```
//! use detfa::{Nfa, determinize};
//!
//! let nfa = Nfa::builder()
//!     .states(["q0", "q1", "q2"])
//!     .alphabet(['a', 'b'])
//!     .start("q0")
//!     .accepting(["q2"])
//!     .transition("q0", 'a', "q0")
//!     .transition("q0", 'a', "q1")
//!     .transition("q1", 'b', "q2")
//!     .build()?;
//!
//! let dfa = determinize(&nfa)?;
//! assert!(dfa.accepts("aab")?);
//! assert!(!dfa.accepts("")?);
//! # Ok::<(), detfa::AutomatonError>(())
//! ```

mod determinize;
mod dfa;
mod error;
mod nfa;
mod state;
mod symbol;

pub use determinize::determinize;
pub use dfa::Dfa;
pub use error::AutomatonError;
pub use nfa::{Nfa, NfaBuilder};
pub use state::{StateId, StateSet};
pub use symbol::{Alphabet, EPSILON, SymbolId, is_epsilon};
