//! Subset construction: converting an ε-NFA into an equivalent DFA.

use crate::dfa::Dfa;
use crate::error::AutomatonError;
use crate::nfa::Nfa;
use crate::state::{StateId, StateSet};
use indexmap::IndexMap;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Convert an epsilon-NFA into an equivalent DFA using the powerset
/// construction.
///
/// Each DFA state stands for one epsilon-closure-stable set of NFA states,
/// named from its members (sorted, so the same subset always gets the same
/// name). Subsets are explored breadth-first from the closure of the start
/// state; a symbol whose move set closes to nothing produces no edge. The
/// output is a freshly built automaton and the source NFA is left
/// untouched, so both remain independently simulatable.
///
/// Termination is guaranteed: the number of distinct reachable subsets is
/// bounded by 2^(NFA state count), and each subset enters the worklist once.
pub fn determinize(nfa: &Nfa) -> Result<Dfa, AutomatonError> {
    let start = nfa.start_state().ok_or(AutomatonError::MissingStartState)?;
    debug!(
        states = nfa.state_count(),
        symbols = nfa.alphabet().len(),
        "starting subset construction"
    );

    // Subsets are keyed by their canonical sorted member-id vec: value
    // equality on membership, not container identity.
    let mut subset_ids: IndexMap<Vec<StateId>, StateId> = IndexMap::new();
    let mut dfa = Dfa::new(nfa.alphabet().clone());

    let initial = nfa.epsilon_closure(&StateSet::singleton(start, nfa.state_count()));
    let initial_id = dfa.add_state(
        subset_label(nfa, &initial),
        initial.intersects(nfa.accepting_states()),
    )?;
    dfa.set_start_state(initial_id);
    subset_ids.insert(initial.to_vec(), initial_id);

    let mut worklist: VecDeque<(StateSet, StateId)> = VecDeque::new();
    worklist.push_back((initial, initial_id));

    while let Some((current, source)) = worklist.pop_front() {
        for symbol in nfa.alphabet().ids() {
            let destination = nfa.epsilon_closure(&nfa.move_on_symbol(&current, symbol));

            // No run survives this symbol: no edge, the simulator rejects.
            if destination.is_empty() {
                continue;
            }

            let key = destination.to_vec();
            let destination_id = match subset_ids.get(&key) {
                Some(&existing) => existing,
                None => {
                    let label = subset_label(nfa, &destination);
                    trace!(subset = %label, "discovered DFA state");
                    let id = dfa.add_state(label, destination.intersects(nfa.accepting_states()))?;
                    subset_ids.insert(key, id);
                    worklist.push_back((destination, id));
                    id
                }
            };

            dfa.add_transition(source, symbol, destination_id);
        }
    }

    debug!(dfa_states = dfa.state_count(), "subset construction finished");
    Ok(dfa)
}

/// Deterministic name for a subset: its member state names, sorted, in
/// braces.
fn subset_label(nfa: &Nfa, subset: &StateSet) -> String {
    let mut names: Vec<&str> = subset.iter().map(|state| nfa.state_name(state)).collect();
    names.sort_unstable();
    format!("{{{}}}", names.join(","))
}
