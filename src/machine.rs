//! This module defines the `Machine` struct, which runs a word through an `Automaton`
//! one symbol at a time. It keeps the current state, the read position, and the trace
//! of visited states, which makes it suitable for debugging and step-by-step display.

use crate::automaton::Automaton;
use crate::types::{DfaError, State, Symbol};

/// Controls how the machine treats symbols outside the alphabet.
///
/// - `Normal` (default): an unknown symbol has no transition, so the machine gets stuck.
/// - `Strict`: an unknown symbol halts the machine with `DfaError::UnknownSymbol`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Strict,
}

/// Represents the outcome of a single machine step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// One symbol was consumed and the machine moved to its next state.
    Continue,
    /// The machine has stopped; no further steps change anything.
    Halt(Halt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// The whole word was consumed and the machine stopped in a final state.
    Accepted(State),
    /// The whole word was consumed but the machine stopped in a non-final state.
    Rejected(State),
    /// No transition is defined for `symbol` at `position` from `state`.
    Stuck {
        state: State,
        symbol: Symbol,
        position: usize,
    },
    Err(DfaError),
}

impl Halt {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Halt::Accepted(_))
    }
}

/// Executes an automaton over a single word.
pub struct Machine<'a> {
    automaton: &'a Automaton,
    word: Vec<Symbol>,
    mode: Mode,
    state: State,
    position: usize,
    trace: Vec<State>,
    halt: Option<Halt>,
}

impl<'a> Machine<'a> {
    /// Creates a machine positioned at the automaton's root, before the first symbol of `word`.
    pub fn new(automaton: &'a Automaton, word: Vec<Symbol>) -> Self {
        Self::with_mode(automaton, word, Mode::default())
    }

    pub fn with_mode(automaton: &'a Automaton, word: Vec<Symbol>, mode: Mode) -> Self {
        let root = *automaton.root();
        Self {
            automaton,
            word,
            mode,
            state: root,
            position: 0,
            trace: vec![root],
            halt: None,
        }
    }

    /// Consumes the next symbol of the word.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a symbol was consumed.
    /// * `Step::Halt(_)` once the word is exhausted or the machine is stuck. Calling
    ///   `step` again keeps returning the same halt.
    pub fn step(&mut self) -> Step {
        if let Some(halt) = &self.halt {
            return Step::Halt(halt.clone());
        }

        let Some(symbol) = self.word.get(self.position).copied() else {
            let halt = if self.automaton.is_final(&self.state) {
                Halt::Accepted(self.state)
            } else {
                Halt::Rejected(self.state)
            };
            return self.halt(halt);
        };

        if self.mode == Mode::Strict && !self.automaton.has_symbol(&symbol) {
            return self.halt(Halt::Err(DfaError::UnknownSymbol(symbol)));
        }

        let Some(next) = self.automaton.next(&self.state, &symbol).copied() else {
            return self.halt(Halt::Stuck {
                state: self.state,
                symbol,
                position: self.position,
            });
        };

        tracing::trace!(from = %self.state, %symbol, to = %next, position = self.position, "step");

        self.state = next;
        self.position += 1;
        self.trace.push(next);

        Step::Continue
    }

    fn halt(&mut self, halt: Halt) -> Step {
        tracing::trace!(?halt, steps = self.position, "halted");
        self.halt = Some(halt.clone());
        Step::Halt(halt)
    }

    /// Runs the machine until it halts.
    ///
    /// Every `Continue` consumes one symbol, so this takes at most `word.len() + 1` steps.
    pub fn run(&mut self) -> Halt {
        loop {
            if let Step::Halt(halt) = self.step() {
                return halt;
            }
        }
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the index of the next symbol to be read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of symbols consumed so far.
    pub fn step_count(&self) -> usize {
        self.trace.len() - 1
    }

    pub fn word(&self) -> &[Symbol] {
        &self.word
    }

    /// Returns the symbols not consumed yet.
    pub fn remaining(&self) -> &[Symbol] {
        &self.word[self.position..]
    }

    /// Returns every state visited so far, starting with the root.
    pub fn trace(&self) -> &[State] {
        &self.trace
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Resets the machine to the root, before the first symbol.
    pub fn reset(&mut self) {
        let root = *self.automaton.root();
        self.state = root;
        self.position = 0;
        self.trace = vec![root];
        self.halt = None;
    }
}
