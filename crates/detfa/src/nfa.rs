//! Epsilon Non-deterministic Finite Automaton (ε-NFA) with a validated
//! two-phase builder.

use crate::error::AutomatonError;
use crate::state::{StateId, StateSet};
use crate::symbol::{Alphabet, EPSILON, SymbolId, is_epsilon};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::trace;

/// An epsilon-NFA over named states and a declared alphabet.
///
/// Constructed through [`Nfa::builder`] and immutable afterwards. Multiple
/// transitions may share a `(state, symbol)` pair, and epsilon edges live in
/// the same table under the reserved [`EPSILON`] marker.
#[derive(Debug, Clone)]
pub struct Nfa {
    /// State names, indexed by id (ids follow declaration order).
    state_names: Vec<String>,
    state_ids: HashMap<String, StateId>,
    alphabet: Alphabet,
    start: Option<StateId>,
    accepting: StateSet,
    /// (source, symbol) -> set of destination states.
    transitions: HashMap<(StateId, SymbolId), StateSet>,
}

impl Nfa {
    /// Start building an NFA: declare states and alphabet first, then wire
    /// transitions.
    pub fn builder() -> NfaBuilder {
        NfaBuilder::default()
    }

    /// Number of declared states.
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

    /// The declared input alphabet (epsilon excluded).
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The designated start state, if any.
    pub fn start_state(&self) -> Option<StateId> {
        self.start
    }

    /// Check whether a state is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(state)
    }

    /// The set of accepting states.
    pub fn accepting_states(&self) -> &StateSet {
        &self.accepting
    }

    /// All destination states for `(state, symbol)`. Returns the empty set,
    /// never an error, when no such edge exists.
    pub fn transitions_from(&self, state: StateId, symbol: SymbolId) -> StateSet {
        self.transitions
            .get(&(state, symbol))
            .cloned()
            .unwrap_or_else(|| StateSet::with_capacity(self.state_count()))
    }

    /// The smallest superset of `states` closed under epsilon transitions.
    ///
    /// Worklist algorithm with the closure set as the visited marker, so a
    /// cyclic epsilon graph terminates with each state enqueued at most
    /// once. The closure of the empty set is the empty set.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.state_count());
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(state) = stack.pop() {
            if closure.contains(state) {
                continue;
            }
            closure.insert(state);

            if let Some(destinations) = self.transitions.get(&(state, EPSILON)) {
                for dest in destinations.iter() {
                    if !closure.contains(dest) {
                        stack.push(dest);
                    }
                }
            }
        }

        closure
    }

    /// The raw move set: all states reachable from `states` on `symbol` by
    /// exactly one non-epsilon transition. Callers compose this with
    /// [`Nfa::epsilon_closure`] to obtain the closure-stable successor.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        assert!(!is_epsilon(symbol), "epsilon moves go through epsilon_closure");

        let mut reached = StateSet::with_capacity(self.state_count());
        for state in states.iter() {
            if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                reached.union_with(destinations);
            }
        }
        reached
    }

    /// Decide membership of `input` by direct nondeterministic simulation:
    /// the frontier of epsilon-closed states is advanced one symbol at a
    /// time, and the string is accepted iff some run ends in an accepting
    /// state.
    pub fn accepts(&self, input: &str) -> Result<bool, AutomatonError> {
        let start = self.start.ok_or(AutomatonError::MissingStartState)?;
        let mut current =
            self.epsilon_closure(&StateSet::singleton(start, self.state_count()));

        for ch in input.chars() {
            let Some(symbol) = self.alphabet.id_of(ch) else {
                trace!(symbol = %ch, "input symbol outside the declared alphabet");
                return Ok(false);
            };
            current = self.epsilon_closure(&self.move_on_symbol(&current, symbol));
            if current.is_empty() {
                trace!(symbol = %ch, "no run survives this symbol");
                return Ok(false);
            }
        }

        Ok(current.intersects(&self.accepting))
    }

    /// Check if the automaton accepts no string at all.
    /// Uses BFS from the start state's epsilon closure.
    pub fn is_empty(&self) -> bool {
        let Some(start) = self.start else {
            return true;
        };

        let mut visited = StateSet::with_capacity(self.state_count());
        let start_closure =
            self.epsilon_closure(&StateSet::singleton(start, self.state_count()));
        let mut queue: VecDeque<StateId> = start_closure.iter().collect();

        while let Some(state) = queue.pop_front() {
            if visited.contains(state) {
                continue;
            }
            visited.insert(state);

            if self.accepting.contains(state) {
                return false;
            }

            for symbol in self.alphabet.ids() {
                if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                    for dest in self.epsilon_closure(destinations).iter() {
                        if !visited.contains(dest) {
                            queue.push_back(dest);
                        }
                    }
                }
            }
        }

        true
    }

    fn names_of(&self, states: &StateSet) -> String {
        states
            .iter()
            .map(|state| self.state_name(state))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, name) in self.state_names.iter().enumerate() {
            let id = idx as StateId;
            let start = if self.start == Some(id) { "->" } else { "  " };
            let accept = if self.accepting.contains(id) { "*" } else { " " };
            writeln!(f, "{start}{accept} {name}")?;

            for symbol in self.alphabet.ids() {
                if let Some(destinations) = self.transitions.get(&(id, symbol)) {
                    writeln!(
                        f,
                        "      --{}--> {}",
                        self.alphabet.symbol(symbol),
                        self.names_of(destinations)
                    )?;
                }
            }
            if let Some(destinations) = self.transitions.get(&(id, EPSILON)) {
                writeln!(f, "      --ε--> {}", self.names_of(destinations))?;
            }
        }
        Ok(())
    }
}

/// Builder for [`Nfa`].
///
/// Declarations are collected as-is; [`NfaBuilder::build`] interns names and
/// validates every reference. Policies: a state name declared twice is
/// rejected; duplicate transitions, accepting designations and alphabet
/// symbols merge under set semantics; a later [`NfaBuilder::start`] call
/// replaces the earlier designation.
#[derive(Debug, Default)]
pub struct NfaBuilder {
    states: Vec<String>,
    alphabet: Vec<char>,
    start: Option<String>,
    accepting: Vec<String>,
    /// `None` as the symbol marks an epsilon transition.
    transitions: Vec<(String, Option<char>, String)>,
}

impl NfaBuilder {
    /// Declare states. Ids are assigned in declaration order.
    pub fn states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare input symbols. Epsilon is not declarable; it is reserved.
    pub fn alphabet<I>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        self.alphabet.extend(symbols);
        self
    }

    /// Designate the start state.
    pub fn start(mut self, name: impl Into<String>) -> Self {
        self.start = Some(name.into());
        self
    }

    /// Mark states as accepting.
    pub fn accepting<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepting.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a transition on a declared input symbol.
    pub fn transition(
        mut self,
        from: impl Into<String>,
        symbol: char,
        to: impl Into<String>,
    ) -> Self {
        self.transitions.push((from.into(), Some(symbol), to.into()));
        self
    }

    /// Add an epsilon (empty-string) transition.
    pub fn epsilon(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.transitions.push((from.into(), None, to.into()));
        self
    }

    /// Validate the declarations and produce the automaton.
    ///
    /// A missing start state is legal here; it is reported later by
    /// determinization or simulation.
    pub fn build(self) -> Result<Nfa, AutomatonError> {
        let mut state_names: Vec<String> = Vec::with_capacity(self.states.len());
        let mut state_ids: HashMap<String, StateId> = HashMap::new();
        for name in self.states {
            if state_ids.contains_key(&name) {
                return Err(AutomatonError::DuplicateState(name));
            }
            let id = state_names.len() as StateId;
            state_ids.insert(name.clone(), id);
            state_names.push(name);
        }

        let mut alphabet = Alphabet::new();
        for symbol in self.alphabet {
            alphabet.intern(symbol);
        }

        let count = state_names.len();

        let start = match &self.start {
            Some(name) => Some(lookup(&state_ids, name)?),
            None => None,
        };

        let mut accepting = StateSet::with_capacity(count);
        for name in &self.accepting {
            accepting.insert(lookup(&state_ids, name)?);
        }

        let mut transitions: HashMap<(StateId, SymbolId), StateSet> = HashMap::new();
        for (from, symbol, to) in &self.transitions {
            let from = lookup(&state_ids, from)?;
            let to = lookup(&state_ids, to)?;
            let symbol = match symbol {
                Some(c) => alphabet
                    .id_of(*c)
                    .ok_or(AutomatonError::UndefinedSymbol(*c))?,
                None => EPSILON,
            };
            transitions
                .entry((from, symbol))
                .or_insert_with(|| StateSet::with_capacity(count))
                .insert(to);
        }

        Ok(Nfa {
            state_names,
            state_ids,
            alphabet,
            start,
            accepting,
            transitions,
        })
    }
}

fn lookup(state_ids: &HashMap<String, StateId>, name: &str) -> Result<StateId, AutomatonError> {
    state_ids
        .get(name)
        .copied()
        .ok_or_else(|| AutomatonError::UndefinedState(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc_nfa() -> Nfa {
        // q0 -a-> q0, q0 -a-> q1, q1 -b-> q2(accepting)
        Nfa::builder()
            .states(["q0", "q1", "q2"])
            .alphabet(['a', 'b'])
            .start("q0")
            .accepting(["q2"])
            .transition("q0", 'a', "q0")
            .transition("q0", 'a', "q1")
            .transition("q1", 'b', "q2")
            .build()
            .unwrap()
    }

    #[test]
    fn builder_rejects_duplicate_state() {
        let err = Nfa::builder()
            .states(["q0", "q1", "q0"])
            .build()
            .unwrap_err();
        assert_eq!(err, AutomatonError::DuplicateState("q0".into()));
    }

    #[test]
    fn builder_rejects_undeclared_transition_endpoint() {
        let err = Nfa::builder()
            .states(["q0"])
            .alphabet(['a'])
            .transition("q0", 'a', "q9")
            .build()
            .unwrap_err();
        assert_eq!(err, AutomatonError::UndefinedState("q9".into()));
    }

    #[test]
    fn builder_rejects_undeclared_symbol() {
        let err = Nfa::builder()
            .states(["q0", "q1"])
            .alphabet(['a'])
            .transition("q0", 'x', "q1")
            .build()
            .unwrap_err();
        assert_eq!(err, AutomatonError::UndefinedSymbol('x'));
    }

    #[test]
    fn builder_rejects_undeclared_start() {
        let err = Nfa::builder().states(["q0"]).start("q7").build().unwrap_err();
        assert_eq!(err, AutomatonError::UndefinedState("q7".into()));
    }

    #[test]
    fn duplicate_transitions_merge() {
        let nfa = Nfa::builder()
            .states(["q0", "q1"])
            .alphabet(['a'])
            .transition("q0", 'a', "q1")
            .transition("q0", 'a', "q1")
            .build()
            .unwrap();
        let a = nfa.alphabet().id_of('a').unwrap();
        assert_eq!(nfa.transitions_from(0, a).len(), 1);
    }

    #[test]
    fn transitions_from_missing_edge_is_empty() {
        let nfa = abc_nfa();
        let b = nfa.alphabet().id_of('b').unwrap();
        assert!(nfa.transitions_from(0, b).is_empty());
    }

    #[test]
    fn closure_of_empty_set_is_empty() {
        let nfa = abc_nfa();
        let closure = nfa.epsilon_closure(&StateSet::with_capacity(3));
        assert!(closure.is_empty());
    }

    #[test]
    fn closure_follows_epsilon_chains() {
        // q0 -ε-> q1 -ε-> q2
        let nfa = Nfa::builder()
            .states(["q0", "q1", "q2"])
            .epsilon("q0", "q1")
            .epsilon("q1", "q2")
            .build()
            .unwrap();
        let closure = nfa.epsilon_closure(&StateSet::singleton(0, 3));
        assert_eq!(closure.to_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn closure_terminates_on_epsilon_cycle() {
        // q0 -ε-> q1, q1 -ε-> q0
        let nfa = Nfa::builder()
            .states(["q0", "q1"])
            .epsilon("q0", "q1")
            .epsilon("q1", "q0")
            .build()
            .unwrap();
        let closure = nfa.epsilon_closure(&StateSet::singleton(0, 2));
        assert_eq!(closure.to_vec(), vec![0, 1]);
    }

    #[test]
    fn closure_is_monotonic_and_idempotent() {
        let nfa = Nfa::builder()
            .states(["q0", "q1", "q2"])
            .epsilon("q0", "q1")
            .build()
            .unwrap();
        let input: StateSet = [0, 2].into_iter().collect();
        let closure = nfa.epsilon_closure(&input);

        assert!(input.iter().all(|state| closure.contains(state)));
        assert_eq!(nfa.epsilon_closure(&closure), closure);
    }

    #[test]
    fn move_unions_all_targets() {
        let nfa = abc_nfa();
        let a = nfa.alphabet().id_of('a').unwrap();
        let moved = nfa.move_on_symbol(&StateSet::singleton(0, 3), a);
        assert_eq!(moved.to_vec(), vec![0, 1]);
    }

    #[test]
    fn accepts_by_direct_simulation() {
        let nfa = abc_nfa();
        assert!(nfa.accepts("ab").unwrap());
        assert!(nfa.accepts("aab").unwrap());
        assert!(!nfa.accepts("").unwrap());
        assert!(!nfa.accepts("b").unwrap());
        assert!(!nfa.accepts("abb").unwrap());
    }

    #[test]
    fn accepts_follows_epsilon_edges() {
        // q0 -ε-> q1 -a-> q2(accepting)
        let nfa = Nfa::builder()
            .states(["q0", "q1", "q2"])
            .alphabet(['a'])
            .start("q0")
            .accepting(["q2"])
            .epsilon("q0", "q1")
            .transition("q1", 'a', "q2")
            .build()
            .unwrap();
        assert!(nfa.accepts("a").unwrap());
        assert!(!nfa.accepts("").unwrap());
    }

    #[test]
    fn accepts_requires_start_state() {
        let nfa = Nfa::builder()
            .states(["q0"])
            .alphabet(['a'])
            .build()
            .unwrap();
        assert_eq!(nfa.accepts("a"), Err(AutomatonError::MissingStartState));
    }

    #[test]
    fn unknown_input_symbol_rejects() {
        let nfa = abc_nfa();
        assert!(!nfa.accepts("az").unwrap());
    }

    #[test]
    fn emptiness() {
        let nfa = abc_nfa();
        assert!(!nfa.is_empty());

        // Accepting state unreachable from start.
        let stuck = Nfa::builder()
            .states(["q0", "q1"])
            .alphabet(['a'])
            .start("q0")
            .accepting(["q1"])
            .transition("q1", 'a', "q1")
            .build()
            .unwrap();
        assert!(stuck.is_empty());
    }

    #[test]
    fn display_marks_roles() {
        let nfa = abc_nfa();
        let rendered = nfa.to_string();
        assert!(rendered.contains("-> "));
        assert!(rendered.contains(" * q2"));
        assert!(rendered.contains("--a--> q0, q1"));
    }
}
