//! This crate provides the core logic for deterministic finite automata.
//! It includes modules for building and validating automata, deciding word acceptance,
//! stepping through a run, rendering transition tables, analyzing structure, parsing
//! `.dfa` definitions, and a catalog of built-in examples.

pub mod analyzer;
pub mod automaton;
pub mod catalog;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod table;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `Finding` enum from the analyzer module.
pub use analyzer::{analyze, Finding};
/// Re-exports the `Automaton` and `Definition` structs from the automaton module.
pub use automaton::{Automaton, Definition};
/// Re-exports `Catalog`, `CatalogEntry`, and `DEFINITIONS` from the catalog module.
pub use catalog::{Catalog, CatalogEntry, DEFINITIONS};
/// Re-exports the `Loader` struct from the loader module.
pub use loader::Loader;
/// Re-exports the stepping machine and its outcomes from the machine module.
pub use machine::{Halt, Machine, Mode, Step};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the table renderer from the table module.
pub use table::{render, Role, TransitionTable};
/// Re-exports the core identifier, relation, and error types from the types module.
pub use types::{
    word, ConstructionError, ConstructionErrorKind, DfaError, State, Symbol, Transition,
    TransitionRelation, MAX_DEFINITION_SIZE,
};
