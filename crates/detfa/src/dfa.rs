//! Deterministic Finite Automaton and string-acceptance simulation.

use crate::error::AutomatonError;
use crate::state::{StateId, StateSet};
use crate::symbol::{Alphabet, SymbolId, is_epsilon};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::trace;

/// A Deterministic Finite Automaton.
///
/// States carry names (subset labels when produced by determinization) and
/// every `(state, symbol)` pair has at most one outgoing transition. There
/// are no epsilon edges. A missing edge means the next input symbol is
/// rejected; no dead state is synthesized.
#[derive(Debug, Clone)]
pub struct Dfa {
    state_names: Vec<String>,
    state_ids: HashMap<String, StateId>,
    alphabet: Alphabet,
    start: Option<StateId>,
    accepting: StateSet,
    /// (source, symbol) -> destination.
    transitions: HashMap<(StateId, SymbolId), StateId>,
}

impl Dfa {
    /// Create a new DFA over the given alphabet, with no states yet.
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            state_names: Vec::new(),
            state_ids: HashMap::new(),
            alphabet,
            start: None,
            accepting: StateSet::with_capacity(16),
            transitions: HashMap::new(),
        }
    }

    /// Register a new state under a name and return its id. Duplicate names
    /// are rejected so the same identity can never denote two states.
    pub fn add_state(
        &mut self,
        name: impl Into<String>,
        accepting: bool,
    ) -> Result<StateId, AutomatonError> {
        let name = name.into();
        if self.state_ids.contains_key(&name) {
            return Err(AutomatonError::DuplicateState(name));
        }
        let id = self.state_names.len() as StateId;
        self.state_ids.insert(name.clone(), id);
        self.state_names.push(name);
        if accepting {
            self.accepting.insert(id);
        }
        Ok(id)
    }

    /// Set the start state.
    pub fn set_start_state(&mut self, state: StateId) {
        self.start = Some(state);
    }

    /// Add a transition. Inserting a second edge for the same
    /// `(source, symbol)` pair overwrites the first.
    pub fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        debug_assert!((source as usize) < self.state_names.len());
        debug_assert!((destination as usize) < self.state_names.len());
        debug_assert!(!is_epsilon(symbol) && (symbol as usize) < self.alphabet.len());

        self.transitions.insert((source, symbol), destination);
    }

    /// The unique transition from a state on a symbol, if any.
    pub fn transition(&self, source: StateId, symbol: SymbolId) -> Option<StateId> {
        self.transitions.get(&(source, symbol)).copied()
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.state_names.len()
    }

    /// Look up a state id by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_ids.get(name).copied()
    }

    /// The name behind a state id.
    ///
    /// Panics if the id does not belong to this automaton.
    pub fn state_name(&self, state: StateId) -> &str {
        &self.state_names[state as usize]
    }

    /// All state names, in id order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.state_names.iter().map(String::as_str)
    }

    /// The input alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The start state, if any.
    pub fn start_state(&self) -> Option<StateId> {
        self.start
    }

    /// Check whether a state is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(state)
    }

    /// All transitions as `(source, symbol, destination)` triples.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.transitions
            .iter()
            .map(|(&(src, sym), &dst)| (src, sym, dst))
    }

    /// Decide membership of `input`, walking one transition per symbol.
    ///
    /// A symbol with no outgoing edge (or outside the alphabet) rejects the
    /// string immediately; that is a negative verdict, not an error. After
    /// the whole input is consumed the verdict is whether the current state
    /// is accepting.
    pub fn accepts(&self, input: &str) -> Result<bool, AutomatonError> {
        let mut current = self.start.ok_or(AutomatonError::MissingStartState)?;

        for ch in input.chars() {
            let next = self
                .alphabet
                .id_of(ch)
                .and_then(|symbol| self.transition(current, symbol));
            match next {
                Some(destination) => current = destination,
                None => {
                    trace!(
                        state = self.state_name(current),
                        symbol = %ch,
                        "no transition, rejecting"
                    );
                    return Ok(false);
                }
            }
        }

        Ok(self.accepting.contains(current))
    }

    /// Check if the DFA accepts no strings.
    /// BFS from the start state looking for a reachable accepting state.
    pub fn is_empty(&self) -> bool {
        let Some(start) = self.start else {
            return true;
        };

        if self.accepting.is_empty() {
            return true;
        }

        let mut visited = StateSet::with_capacity(self.state_count());
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(state) = queue.pop_front() {
            if visited.contains(state) {
                continue;
            }
            visited.insert(state);

            if self.accepting.contains(state) {
                return false;
            }

            for symbol in self.alphabet.ids() {
                if let Some(next) = self.transition(state, symbol) {
                    if !visited.contains(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        true
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, name) in self.state_names.iter().enumerate() {
            let id = idx as StateId;
            let start = if self.start == Some(id) { "->" } else { "  " };
            let accept = if self.accepting.contains(id) { "*" } else { " " };
            writeln!(f, "{start}{accept} {name}")?;

            for symbol in self.alphabet.ids() {
                if let Some(destination) = self.transition(id, symbol) {
                    writeln!(
                        f,
                        "      --{}--> {}",
                        self.alphabet.symbol(symbol),
                        self.state_name(destination)
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab_dfa() -> Dfa {
        // A -a-> B -b-> C(accepting)
        let mut alphabet = Alphabet::new();
        let a = alphabet.intern('a');
        let b = alphabet.intern('b');

        let mut dfa = Dfa::new(alphabet);
        let s0 = dfa.add_state("A", false).unwrap();
        let s1 = dfa.add_state("B", false).unwrap();
        let s2 = dfa.add_state("C", true).unwrap();
        dfa.set_start_state(s0);
        dfa.add_transition(s0, a, s1);
        dfa.add_transition(s1, b, s2);
        dfa
    }

    #[test]
    fn accepts_walks_transitions() {
        let dfa = ab_dfa();
        assert!(dfa.accepts("ab").unwrap());
        assert!(!dfa.accepts("a").unwrap());
        assert!(!dfa.accepts("").unwrap());
    }

    #[test]
    fn missing_edge_rejects_without_error() {
        let dfa = ab_dfa();
        assert!(!dfa.accepts("ba").unwrap());
        assert!(!dfa.accepts("aa").unwrap());
        assert!(!dfa.accepts("abb").unwrap());
    }

    #[test]
    fn unknown_symbol_rejects_without_error() {
        let dfa = ab_dfa();
        assert!(!dfa.accepts("x").unwrap());
    }

    #[test]
    fn missing_start_is_reported() {
        let dfa = Dfa::new(Alphabet::new());
        assert_eq!(dfa.accepts(""), Err(AutomatonError::MissingStartState));
    }

    #[test]
    fn duplicate_state_name_is_rejected() {
        let mut dfa = Dfa::new(Alphabet::new());
        dfa.add_state("A", false).unwrap();
        let err = dfa.add_state("A", true).unwrap_err();
        assert_eq!(err, AutomatonError::DuplicateState("A".into()));
    }

    #[test]
    fn emptiness() {
        let dfa = ab_dfa();
        assert!(!dfa.is_empty());

        let mut no_accept = Dfa::new(Alphabet::new());
        let s0 = no_accept.add_state("A", false).unwrap();
        no_accept.set_start_state(s0);
        assert!(no_accept.is_empty());

        assert!(Dfa::new(Alphabet::new()).is_empty());
    }

    #[test]
    fn state_lookup_round_trips() {
        let dfa = ab_dfa();
        let id = dfa.state_id("B").unwrap();
        assert_eq!(dfa.state_name(id), "B");
        assert_eq!(dfa.state_names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }
}
