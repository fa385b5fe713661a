//! This module defines the core data structures and types used throughout the automaton
//! engine, including state and symbol identifiers, the transition relation, and error types.

use internment::Intern;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::hash_map::{self, HashMap};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The maximum allowed size for an automaton definition in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB
/// The placeholder rendered for an undefined transition.
pub const NO_TRANSITION: &str = "--";

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Intern<String>);

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(Intern::new(name.into()))
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self::new(name)
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.as_str().cmp(other.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::new)
            }
        }
    };
}

identifier! {
    /// A named state. Two states are equal iff their names are equal.
    State
}

identifier! {
    /// An atomic input symbol, usually a single character or a token tag.
    Symbol
}

/// Splits text into one symbol per character.
pub fn word(text: &str) -> Vec<Symbol> {
    text.chars().map(|c| Symbol::new(c.to_string())).collect()
}

/// A single `(from, symbol) -> to` entry of a transition relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: State,
    pub symbol: Symbol,
    pub to: State,
}

impl Transition {
    pub fn new(from: impl Into<State>, symbol: impl Into<Symbol>, to: impl Into<State>) -> Self {
        Self {
            from: from.into(),
            symbol: symbol.into(),
            to: to.into(),
        }
    }
}

/// A partial function from `(State, Symbol)` to `State`.
///
/// A missing entry means there is no transition for the pair; the automaton gets
/// stuck there instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionRelation(HashMap<(State, Symbol), State>);

impl TransitionRelation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `(from, symbol) -> to`, returning the previous target if any.
    pub fn insert(
        &mut self,
        from: impl Into<State>,
        symbol: impl Into<Symbol>,
        to: impl Into<State>,
    ) -> Option<State> {
        self.0.insert((from.into(), symbol.into()), to.into())
    }

    /// Builds a relation from a list of transitions, rejecting two different
    /// targets for the same `(from, symbol)` pair.
    pub fn try_from_transitions<I>(transitions: I) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = Transition>,
    {
        let mut relation = Self::new();
        for Transition { from, symbol, to } in transitions {
            match relation.0.entry((from, symbol)) {
                hash_map::Entry::Vacant(e) => {
                    e.insert(to);
                }
                hash_map::Entry::Occupied(e) if *e.get() == to => {}
                hash_map::Entry::Occupied(e) => {
                    return Err(ConstructionError::NondeterministicTransition {
                        state: from,
                        symbol,
                        first: *e.get(),
                        second: to,
                    });
                }
            }
        }

        Ok(relation)
    }

    pub fn get(&self, from: &State, symbol: &Symbol) -> Option<&State> {
        self.0.get(&(*from, *symbol))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&State, &Symbol, &State)> {
        self.0.iter().map(|((from, symbol), to)| (from, symbol, to))
    }

    /// Returns every entry as a `Transition`, sorted by source state and symbol name.
    pub fn sorted(&self) -> Vec<Transition> {
        let mut transitions: Vec<Transition> = self
            .iter()
            .map(|(from, symbol, to)| Transition {
                from: *from,
                symbol: *symbol,
                to: *to,
            })
            .collect();
        transitions.sort_by(|a, b| (a.from, a.symbol).cmp(&(b.from, b.symbol)));
        transitions
    }
}

impl<F, S, T> FromIterator<(F, S, T)> for TransitionRelation
where
    F: Into<State>,
    S: Into<Symbol>,
    T: Into<State>,
{
    /// Collects `(from, symbol, to)` triples. Later entries overwrite earlier ones.
    fn from_iter<I: IntoIterator<Item = (F, S, T)>>(iter: I) -> Self {
        let mut relation = Self::new();
        for (from, symbol, to) in iter {
            relation.insert(from, symbol, to);
        }
        relation
    }
}

/// The invariant violated while constructing an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionErrorKind {
    RootNotInStates,
    FinalNotSubsetOfStates,
    TransitionReferencesUnknownState,
    TransitionReferencesUnknownSymbol,
    EmptyStates,
    EmptyAlphabet,
    NondeterministicTransition,
}

/// Represents the ways an automaton can fail validation at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// The root state is not one of the automaton's states.
    #[error("Root state {0} is not in the state set")]
    RootNotInStates(State),
    /// A final state is not one of the automaton's states.
    #[error("Final state {0} is not in the state set")]
    FinalNotSubsetOfStates(State),
    /// A transition names a source or target state that is not in the state set.
    #[error("Transition ({from}, {symbol}) references unknown state {state}")]
    TransitionReferencesUnknownState {
        from: State,
        symbol: Symbol,
        state: State,
    },
    /// A transition is keyed by a symbol outside the alphabet.
    #[error("Transition ({from}, {symbol}) references unknown symbol {symbol}")]
    TransitionReferencesUnknownSymbol { from: State, symbol: Symbol },
    #[error("State set is empty")]
    EmptyStates,
    #[error("Alphabet is empty")]
    EmptyAlphabet,
    /// Two different targets were given for the same `(state, symbol)` pair.
    #[error("Transition ({state}, {symbol}) has two targets: {first} and {second}")]
    NondeterministicTransition {
        state: State,
        symbol: Symbol,
        first: State,
        second: State,
    },
}

impl ConstructionError {
    pub fn kind(&self) -> ConstructionErrorKind {
        match self {
            Self::RootNotInStates(_) => ConstructionErrorKind::RootNotInStates,
            Self::FinalNotSubsetOfStates(_) => ConstructionErrorKind::FinalNotSubsetOfStates,
            Self::TransitionReferencesUnknownState { .. } => {
                ConstructionErrorKind::TransitionReferencesUnknownState
            }
            Self::TransitionReferencesUnknownSymbol { .. } => {
                ConstructionErrorKind::TransitionReferencesUnknownSymbol
            }
            Self::EmptyStates => ConstructionErrorKind::EmptyStates,
            Self::EmptyAlphabet => ConstructionErrorKind::EmptyAlphabet,
            Self::NondeterministicTransition { .. } => {
                ConstructionErrorKind::NondeterministicTransition
            }
        }
    }
}

/// Represents various errors that can occur while defining, loading, or running automata.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DfaError {
    /// The automaton violates a structural invariant.
    #[error("Invalid automaton: {0}")]
    Construction(#[from] ConstructionError),
    /// Indicates an error during the parsing of an automaton definition.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a definition that parsed but is incomplete or inconsistent.
    #[error("Definition validation error: {0}")]
    ValidationError(String),
    /// A word contains a symbol outside the automaton's alphabet.
    #[error("Symbol {0} is not in the alphabet")]
    UnknownSymbol(Symbol),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}
