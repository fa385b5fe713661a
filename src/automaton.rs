//! This module defines the `Automaton` struct, an immutable deterministic finite automaton,
//! together with its construction-time validation and the acceptance algorithm.

use crate::types::{ConstructionError, DfaError, State, Symbol, Transition, TransitionRelation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// A deterministic finite automaton: states, alphabet, transition relation, root, and final states.
///
/// States and alphabet keep the order in which they were first supplied, which is
/// the order used when rendering. An `Automaton` is never mutated after `build`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Parts", into = "Parts")]
pub struct Automaton {
    states: Vec<State>,
    alphabet: Vec<Symbol>,
    transitions: TransitionRelation,
    root: State,
    finals: HashSet<State>,
    state_set: HashSet<State>,
    symbol_set: HashSet<Symbol>,
}

/// A named automaton, as read from a definition file or the built-in catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub automaton: Automaton,
}

/// The serialized form of an `Automaton`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Parts {
    states: Vec<State>,
    alphabet: Vec<Symbol>,
    transitions: Vec<Transition>,
    root: State,
    #[serde(rename = "final")]
    finals: Vec<State>,
}

impl TryFrom<Parts> for Automaton {
    type Error = ConstructionError;

    fn try_from(parts: Parts) -> Result<Self, Self::Error> {
        let transitions = TransitionRelation::try_from_transitions(parts.transitions)?;
        Automaton::build(
            parts.states,
            parts.alphabet,
            transitions,
            parts.finals,
            parts.root,
        )
    }
}

impl From<Automaton> for Parts {
    fn from(automaton: Automaton) -> Self {
        let finals = automaton
            .states
            .iter()
            .filter(|state| automaton.finals.contains(state))
            .copied()
            .collect();

        Parts {
            transitions: automaton.transitions(),
            states: automaton.states,
            alphabet: automaton.alphabet,
            root: automaton.root,
            finals,
        }
    }
}

impl Automaton {
    /// Builds an automaton, checking every structural invariant.
    ///
    /// # Arguments
    ///
    /// * `states` - The states; duplicates are dropped, first occurrence wins.
    /// * `alphabet` - The input symbols; duplicates are dropped, first occurrence wins.
    /// * `transitions` - The transition relation.
    /// * `finals` - The accepting states. May be empty.
    /// * `root` - The start state.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if all invariants hold.
    /// * `Err(ConstructionError)` naming the first violated invariant and the offending item.
    pub fn build<S, A, F>(
        states: S,
        alphabet: A,
        transitions: TransitionRelation,
        finals: F,
        root: impl Into<State>,
    ) -> Result<Self, ConstructionError>
    where
        S: IntoIterator,
        S::Item: Into<State>,
        A: IntoIterator,
        A::Item: Into<Symbol>,
        F: IntoIterator,
        F::Item: Into<State>,
    {
        let (states, state_set) = canonicalize(states.into_iter().map(Into::<State>::into));
        let (alphabet, symbol_set) =
            canonicalize(alphabet.into_iter().map(Into::<Symbol>::into));
        let root: State = root.into();

        if states.is_empty() {
            return Err(ConstructionError::EmptyStates);
        }

        if alphabet.is_empty() {
            return Err(ConstructionError::EmptyAlphabet);
        }

        if !state_set.contains(&root) {
            return Err(ConstructionError::RootNotInStates(root));
        }

        let mut final_set = HashSet::new();
        for state in finals.into_iter().map(Into::<State>::into) {
            if !state_set.contains(&state) {
                return Err(ConstructionError::FinalNotSubsetOfStates(state));
            }
            final_set.insert(state);
        }

        check_transitions(&transitions, &state_set, &symbol_set)?;

        tracing::debug!(
            states = states.len(),
            symbols = alphabet.len(),
            transitions = transitions.len(),
            root = %root,
            "built automaton"
        );

        Ok(Self {
            states,
            alphabet,
            transitions,
            root,
            finals: final_set,
            state_set,
            symbol_set,
        })
    }

    /// Returns the states in canonical order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the alphabet in canonical order.
    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    pub fn root(&self) -> &State {
        &self.root
    }

    /// Returns the final states in canonical order.
    pub fn finals(&self) -> Vec<State> {
        self.states
            .iter()
            .filter(|state| self.finals.contains(state))
            .copied()
            .collect()
    }

    pub fn relation(&self) -> &TransitionRelation {
        &self.transitions
    }

    /// Returns the transitions ordered by the canonical state and symbol order.
    pub fn transitions(&self) -> Vec<Transition> {
        self.states
            .iter()
            .flat_map(|from| {
                self.alphabet.iter().filter_map(move |symbol| {
                    self.next(from, symbol).map(|to| Transition {
                        from: *from,
                        symbol: *symbol,
                        to: *to,
                    })
                })
            })
            .collect()
    }

    pub fn is_final(&self, state: &State) -> bool {
        self.finals.contains(state)
    }

    pub fn is_root(&self, state: &State) -> bool {
        self.root == *state
    }

    pub fn has_state(&self, state: &State) -> bool {
        self.state_set.contains(state)
    }

    pub fn has_symbol(&self, symbol: &Symbol) -> bool {
        self.symbol_set.contains(symbol)
    }

    /// Looks up the single transition for `(state, symbol)`.
    pub fn next(&self, state: &State, symbol: &Symbol) -> Option<&State> {
        self.transitions.get(state, symbol)
    }

    /// Runs the extended transition function over `word`, starting at the root.
    ///
    /// Returns the state reached after consuming the whole word, or `None` as soon
    /// as a symbol has no transition from the current state.
    pub fn walk<'w, I>(&self, word: I) -> Option<&State>
    where
        I: IntoIterator<Item = &'w Symbol>,
    {
        let mut current = &self.root;
        for symbol in word {
            current = self.next(current, symbol)?;
        }
        Some(current)
    }

    /// Decides whether `word` belongs to the language of this automaton.
    ///
    /// The word is rejected immediately when the automaton gets stuck. Symbols outside
    /// the alphabet have no transitions, so they are rejected the same way.
    pub fn accepts<'w, I>(&self, word: I) -> bool
    where
        I: IntoIterator<Item = &'w Symbol>,
    {
        self.walk(word).is_some_and(|state| self.is_final(state))
    }

    /// Checks that every symbol of `word` is in the alphabet.
    pub fn check_word<'w, I>(&self, word: I) -> Result<(), DfaError>
    where
        I: IntoIterator<Item = &'w Symbol>,
    {
        word.into_iter()
            .find(|symbol| !self.has_symbol(symbol))
            .map_or(Ok(()), |symbol| Err(DfaError::UnknownSymbol(*symbol)))
    }

    /// Splits text into symbols of this automaton.
    ///
    /// If every symbol of the alphabet is a single character the text is split per
    /// character, otherwise it is split on whitespace and commas.
    pub fn tokenize(&self, text: &str) -> Vec<Symbol> {
        if self
            .alphabet
            .iter()
            .all(|symbol| symbol.as_str().chars().count() == 1)
        {
            crate::types::word(text)
        } else {
            text.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
                .map(Symbol::from)
                .collect()
        }
    }
}

/// Deduplicates items, keeping the first occurrence order.
fn canonicalize<T, I>(items: I) -> (Vec<T>, HashSet<T>)
where
    T: Copy + Eq + Hash,
    I: Iterator<Item = T>,
{
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    for item in items {
        if seen.insert(item) {
            order.push(item);
        }
    }
    (order, seen)
}

/// Checks that every transition only references known states and symbols.
///
/// Entries are checked in sorted order so the reported offender is deterministic.
fn check_transitions(
    transitions: &TransitionRelation,
    states: &HashSet<State>,
    symbols: &HashSet<Symbol>,
) -> Result<(), ConstructionError> {
    for Transition { from, symbol, to } in transitions.sorted() {
        if !states.contains(&from) {
            return Err(ConstructionError::TransitionReferencesUnknownState {
                from,
                symbol,
                state: from,
            });
        }

        if !symbols.contains(&symbol) {
            return Err(ConstructionError::TransitionReferencesUnknownSymbol { from, symbol });
        }

        if !states.contains(&to) {
            return Err(ConstructionError::TransitionReferencesUnknownState {
                from,
                symbol,
                state: to,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{word, ConstructionErrorKind};
    use proptest::prelude::*;

    /// The four-state automaton accepting words over {a, b} of the form b*a+.
    pub(crate) fn ends_with_a() -> Automaton {
        let transitions: TransitionRelation = [
            ("q1", "a", "q2"),
            ("q1", "b", "q1"),
            ("q2", "a", "q2"),
            ("q3", "b", "q3"),
            ("q3", "a", "q4"),
        ]
        .into_iter()
        .collect();

        Automaton::build(["q1", "q2", "q3", "q4"], ["a", "b"], transitions, ["q2"], "q1")
            .unwrap()
    }

    fn build_error(
        states: &[&str],
        alphabet: &[&str],
        transitions: &[(&str, &str, &str)],
        finals: &[&str],
        root: &str,
    ) -> ConstructionErrorKind {
        let relation: TransitionRelation = transitions.iter().copied().collect();
        Automaton::build(
            states.iter().copied(),
            alphabet.iter().copied(),
            relation,
            finals.iter().copied(),
            root,
        )
        .unwrap_err()
        .kind()
    }

    #[test]
    fn test_accepts_example_words() {
        let automaton = ends_with_a();

        assert!(automaton.accepts(&word("a")));
        assert!(automaton.accepts(&word("ba")));
        assert!(automaton.accepts(&word("bbaaa")));
        assert!(!automaton.accepts(&word("ab")));
        assert!(!automaton.accepts(&word("")));
        assert!(!automaton.accepts(&word("b")));
    }

    #[test]
    fn test_empty_word_accepted_when_root_is_final() {
        let transitions: TransitionRelation = [("s", "0", "s")].into_iter().collect();
        let automaton = Automaton::build(["s"], ["0"], transitions, ["s"], "s").unwrap();

        assert!(automaton.accepts(&word("")));
        assert!(automaton.accepts(&word("000")));
    }

    #[test]
    fn test_unknown_symbol_is_rejected_not_an_error() {
        let automaton = ends_with_a();

        assert!(!automaton.accepts(&word("ac")));
        assert!(!automaton.accepts(&word("z")));
        assert_eq!(
            automaton.check_word(&word("abz")),
            Err(DfaError::UnknownSymbol(Symbol::new("z")))
        );
        assert!(automaton.check_word(&word("ab")).is_ok());
    }

    #[test]
    fn test_walk_reports_reached_state() {
        let automaton = ends_with_a();

        assert_eq!(automaton.walk(&word("bba")), Some(&State::new("q2")));
        assert_eq!(automaton.walk(&word("")), Some(&State::new("q1")));
        assert_eq!(automaton.walk(&word("ab")), None);
    }

    #[test]
    fn test_empty_final_set_accepts_nothing() {
        let transitions: TransitionRelation = [("s", "x", "s")].into_iter().collect();
        let automaton =
            Automaton::build(["s"], ["x"], transitions, Vec::<State>::new(), "s").unwrap();

        assert!(!automaton.accepts(&word("")));
        assert!(!automaton.accepts(&word("xxx")));
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            build_error(&["q1"], &["a"], &[], &[], "q0"),
            ConstructionErrorKind::RootNotInStates
        );
        assert_eq!(
            build_error(&["q1"], &["a"], &[], &["q9"], "q1"),
            ConstructionErrorKind::FinalNotSubsetOfStates
        );
        assert_eq!(
            build_error(&["q1"], &["a"], &[("q1", "a", "q2")], &[], "q1"),
            ConstructionErrorKind::TransitionReferencesUnknownState
        );
        assert_eq!(
            build_error(&["q1"], &["a"], &[("q7", "a", "q1")], &[], "q1"),
            ConstructionErrorKind::TransitionReferencesUnknownState
        );
        assert_eq!(
            build_error(&["q1"], &["a"], &[("q1", "b", "q1")], &[], "q1"),
            ConstructionErrorKind::TransitionReferencesUnknownSymbol
        );
        assert_eq!(
            build_error(&[], &["a"], &[], &[], "q1"),
            ConstructionErrorKind::EmptyStates
        );
        assert_eq!(
            build_error(&["q1"], &[], &[], &[], "q1"),
            ConstructionErrorKind::EmptyAlphabet
        );
    }

    #[test]
    fn test_construction_error_names_offender() {
        let relation: TransitionRelation = [("q1", "a", "qx")].into_iter().collect();
        let error = Automaton::build(["q1"], ["a"], relation, ["q1"], "q1").unwrap_err();

        assert_eq!(
            error,
            ConstructionError::TransitionReferencesUnknownState {
                from: State::new("q1"),
                symbol: Symbol::new("a"),
                state: State::new("qx"),
            }
        );
    }

    #[test]
    fn test_duplicates_keep_first_order() {
        let automaton = Automaton::build(
            ["q2", "q1", "q2"],
            ["b", "a", "b"],
            TransitionRelation::new(),
            ["q1", "q1"],
            "q1",
        )
        .unwrap();

        assert_eq!(automaton.states(), &[State::new("q2"), State::new("q1")]);
        assert_eq!(automaton.alphabet(), &[Symbol::new("b"), Symbol::new("a")]);
        assert_eq!(automaton.finals(), vec![State::new("q1")]);
    }

    #[test]
    fn test_tokenize() {
        let automaton = ends_with_a();
        assert_eq!(automaton.tokenize("ba"), word("ba"));

        let relation: TransitionRelation =
            [("s", "if", "t"), ("t", "ident", "s")].into_iter().collect();
        let tokens = Automaton::build(["s", "t"], ["if", "ident"], relation, ["s"], "s").unwrap();
        assert_eq!(
            tokens.tokenize("if ident, if"),
            vec![Symbol::new("if"), Symbol::new("ident"), Symbol::new("if")]
        );
        assert!(!tokens.accepts(&tokens.tokenize("if ident if")));
        assert!(tokens.accepts(&tokens.tokenize("if ident")));
    }

    #[test]
    fn test_serialization_rebuilds_automaton() {
        let automaton = ends_with_a();
        let json = serde_json::to_value(&automaton).unwrap();
        assert_eq!(json["root"], "q1");
        assert_eq!(json["final"], serde_json::json!(["q2"]));

        let back: Automaton = serde_json::from_value(json).unwrap();
        assert_eq!(back, automaton);
    }

    #[test]
    fn test_deserialization_validates() {
        let json = serde_json::json!({
            "states": ["q1"],
            "alphabet": ["a"],
            "transitions": [{ "from": "q1", "symbol": "a", "to": "q1" }],
            "root": "q2",
            "final": [],
        });

        let error = serde_json::from_value::<Automaton>(json).unwrap_err();
        assert!(error.to_string().contains("Root state q2"));
    }

    #[test]
    fn test_shared_across_threads() {
        let automaton = ends_with_a();
        let words = ["a", "ba", "ab", ""];

        let results: Vec<Vec<bool>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        words
                            .iter()
                            .map(|w| automaton.accepts(&word(w)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in results {
            assert_eq!(result, vec![true, true, false, false]);
        }
    }

    fn symbol_strategy() -> impl Strategy<Value = Vec<Symbol>> {
        prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..12)
            .prop_map(|symbols| symbols.into_iter().map(Symbol::from).collect())
    }

    /// Random partial automata over `{a, b}` with one to four states.
    fn automaton_strategy() -> impl Strategy<Value = Automaton> {
        (1usize..5)
            .prop_flat_map(|n| {
                (
                    prop::collection::vec(prop::option::of(0..n), n * 2),
                    prop::collection::vec(any::<bool>(), n),
                    0..n,
                )
            })
            .prop_map(|(targets, finals, root)| {
                let name = |i: usize| format!("s{i}");
                let alphabet = ["a", "b"];
                let relation: TransitionRelation = targets
                    .into_iter()
                    .enumerate()
                    .filter_map(|(k, to)| to.map(|to| (name(k / 2), alphabet[k % 2], name(to))))
                    .collect();
                let accepting = (0..finals.len()).filter(|i| finals[*i]).map(name);
                let states = (0..finals.len()).map(name);

                Automaton::build(states, alphabet, relation, accepting, name(root)).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_acceptance_is_deterministic(automaton in automaton_strategy(), w in symbol_strategy()) {
            prop_assert_eq!(automaton.accepts(&w), automaton.accepts(&w));
        }

        #[test]
        fn prop_empty_word_accepted_iff_root_is_final(automaton in automaton_strategy()) {
            prop_assert_eq!(automaton.accepts(&word("")), automaton.is_final(automaton.root()));
        }

        #[test]
        fn prop_stuck_prefix_rejects_any_suffix_for_any_automaton(
            automaton in automaton_strategy(),
            w in symbol_strategy(),
            suffix in symbol_strategy(),
        ) {
            prop_assume!(automaton.walk(&w).is_none());

            let extended: Vec<Symbol> = w.iter().chain(suffix.iter()).copied().collect();
            prop_assert!(!automaton.accepts(&extended));
        }

        #[test]
        fn prop_stuck_prefix_rejects_any_suffix(w in symbol_strategy(), suffix in symbol_strategy()) {
            let automaton = ends_with_a();
            prop_assume!(automaton.walk(&w).is_none());

            let extended: Vec<Symbol> = w.iter().chain(suffix.iter()).copied().collect();
            prop_assert!(!automaton.accepts(&extended));
        }

        #[test]
        fn prop_accepts_matches_language(w in symbol_strategy()) {
            let automaton = ends_with_a();
            let text: String = w.iter().map(|s| s.as_str()).collect();
            let trimmed = text.trim_start_matches('b');
            let expected = !trimmed.is_empty() && trimmed.chars().all(|c| c == 'a');
            prop_assert_eq!(automaton.accepts(&w), expected);
        }
    }
}
