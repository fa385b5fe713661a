//! This module provides structural diagnostics for automata: states that can never be
//! reached, states that can never lead to acceptance, and missing transitions.
//!
//! None of these are construction errors. A partial transition relation is perfectly
//! valid, and unreachable states do not change the accepted language.

use crate::automaton::Automaton;
use crate::types::{State, Symbol};
use std::collections::HashSet;
use std::fmt;

/// A diagnostic produced by `analyze`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// States that cannot be reached from the root.
    UnreachableStates(Vec<State>),
    /// Reachable states from which no final state can be reached.
    DeadStates(Vec<State>),
    /// `(state, symbol)` pairs with no transition.
    MissingTransitions(Vec<(State, Symbol)>),
    /// No final state is reachable, so the automaton accepts no word at all.
    EmptyLanguage,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::UnreachableStates(states) => {
                write!(f, "Unreachable states: {}", join(states))
            }
            Finding::DeadStates(states) => {
                write!(f, "Dead states (cannot reach a final state): {}", join(states))
            }
            Finding::MissingTransitions(pairs) => {
                let pairs: Vec<String> = pairs
                    .iter()
                    .map(|(state, symbol)| format!("({state}, {symbol})"))
                    .collect();
                write!(f, "Missing transitions: {}", pairs.join(", "))
            }
            Finding::EmptyLanguage => write!(f, "The automaton accepts no words"),
        }
    }
}

/// Analyzes an `Automaton` and returns every finding, in a fixed order.
///
/// # Returns
///
/// * An empty `Vec` if the automaton is complete and every state is both reachable
///   and able to reach a final state.
pub fn analyze(automaton: &Automaton) -> Vec<Finding> {
    let findings: Vec<Finding> = [
        check_empty_language,
        check_unreachable_states,
        check_dead_states,
        check_missing_transitions,
    ]
    .iter()
    .filter_map(|check| check(automaton).err())
    .collect();

    tracing::debug!(findings = findings.len(), "analyzed automaton");

    findings
}

/// Returns every state reachable from the root, using a depth-first traversal.
pub fn reachable_states(automaton: &Automaton) -> HashSet<State> {
    let mut visited = HashSet::new();
    let mut stack = vec![*automaton.root()];

    while let Some(state) = stack.pop() {
        if !visited.insert(state) {
            continue;
        }

        for symbol in automaton.alphabet() {
            if let Some(next) = automaton.next(&state, symbol) {
                if !visited.contains(next) {
                    stack.push(*next);
                }
            }
        }
    }

    visited
}

/// Returns every state from which some final state can be reached.
///
/// Computed as a fixpoint: a state is live if it is final or has a transition into a live state.
pub fn live_states(automaton: &Automaton) -> HashSet<State> {
    let mut live: HashSet<State> = automaton.finals().into_iter().collect();

    loop {
        let before = live.len();
        for transition in automaton.transitions() {
            if live.contains(&transition.to) {
                live.insert(transition.from);
            }
        }

        if live.len() == before {
            return live;
        }
    }
}

/// Flags an automaton whose root cannot reach any final state.
fn check_empty_language(automaton: &Automaton) -> Result<(), Finding> {
    if live_states(automaton).contains(automaton.root()) {
        Ok(())
    } else {
        Err(Finding::EmptyLanguage)
    }
}

/// Flags states that no word leads to.
fn check_unreachable_states(automaton: &Automaton) -> Result<(), Finding> {
    let reachable = reachable_states(automaton);
    let unreachable: Vec<State> = automaton
        .states()
        .iter()
        .filter(|state| !reachable.contains(state))
        .copied()
        .collect();

    if !unreachable.is_empty() {
        return Err(Finding::UnreachableStates(unreachable));
    }

    Ok(())
}

/// Flags reachable states that can never lead to acceptance.
///
/// When the language is empty every reachable state is dead; that case is already
/// reported as `EmptyLanguage` and is not repeated here.
fn check_dead_states(automaton: &Automaton) -> Result<(), Finding> {
    let live = live_states(automaton);
    if !live.contains(automaton.root()) {
        return Ok(());
    }

    let reachable = reachable_states(automaton);
    let dead: Vec<State> = automaton
        .states()
        .iter()
        .filter(|state| reachable.contains(state) && !live.contains(state))
        .copied()
        .collect();

    if !dead.is_empty() {
        return Err(Finding::DeadStates(dead));
    }

    Ok(())
}

/// Flags every `(state, symbol)` pair without a transition.
fn check_missing_transitions(automaton: &Automaton) -> Result<(), Finding> {
    let missing: Vec<(State, Symbol)> = automaton
        .states()
        .iter()
        .flat_map(|state| {
            automaton
                .alphabet()
                .iter()
                .filter(move |symbol| automaton.next(state, symbol).is_none())
                .map(move |symbol| (*state, *symbol))
        })
        .collect();

    if !missing.is_empty() {
        return Err(Finding::MissingTransitions(missing));
    }

    Ok(())
}

fn join(states: &[State]) -> String {
    states
        .iter()
        .map(State::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
