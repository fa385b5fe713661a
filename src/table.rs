//! Transition table rendering.
//!
//! A table has one header line listing the alphabet and one line per state. Each
//! state line starts with a three column marker describing the state's role.

use crate::automaton::Automaton;
use crate::types::{State, NO_TRANSITION};
use std::fmt;

/// The role a state plays in its automaton, shown as the row marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Both the root and a final state.
    Both,
    /// A final (accepting) state.
    Accepting,
    /// The root (start) state.
    Start,
    Plain,
}

impl Role {
    pub fn of(automaton: &Automaton, state: &State) -> Self {
        match (automaton.is_root(state), automaton.is_final(state)) {
            (true, true) => Role::Both,
            (false, true) => Role::Accepting,
            (true, false) => Role::Start,
            (false, false) => Role::Plain,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Role::Both => "<->",
            Role::Accepting => "<- ",
            Role::Start => "-> ",
            Role::Plain => "   ",
        }
    }
}

/// A borrowed view of an automaton that formats as its transition table.
pub struct TransitionTable<'a> {
    automaton: &'a Automaton,
}

impl<'a> TransitionTable<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        Self { automaton }
    }

    /// Returns the text of every cell, row by row, in canonical state and symbol order.
    pub fn cells(&self) -> Vec<Vec<&'a str>> {
        let automaton = self.automaton;
        automaton
            .states()
            .iter()
            .map(|state| {
                automaton
                    .alphabet()
                    .iter()
                    .map(|symbol| {
                        automaton
                            .next(state, symbol)
                            .map_or(NO_TRANSITION, |target| target.as_str())
                    })
                    .collect()
            })
            .collect()
    }

    fn widths(&self, cells: &[Vec<&str>]) -> (usize, Vec<usize>) {
        let state_width = self
            .automaton
            .states()
            .iter()
            .map(|state| width(state.as_str()))
            .max()
            .unwrap_or(0);

        let column_widths = self
            .automaton
            .alphabet()
            .iter()
            .enumerate()
            .map(|(column, symbol)| {
                cells
                    .iter()
                    .map(|row| width(row[column]))
                    .chain([width(symbol.as_str()), width(NO_TRANSITION)])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        (state_width, column_widths)
    }
}

impl fmt::Display for TransitionTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.cells();
        let (state_width, column_widths) = self.widths(&cells);
        let marker_width = Role::Plain.marker().len();

        write!(f, "{:width$}", "", width = marker_width + state_width)?;
        for (symbol, &w) in self.automaton.alphabet().iter().zip(&column_widths) {
            write!(f, " | {:>w$}", symbol.as_str())?;
        }
        writeln!(f)?;

        for (state, row) in self.automaton.states().iter().zip(&cells) {
            let marker = Role::of(self.automaton, state).marker();
            write!(f, "{marker}{:<state_width$}", state.as_str())?;
            for (cell, &w) in row.iter().zip(&column_widths) {
                write!(f, " | {cell:>w$}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Renders the transition table of `automaton`.
pub fn render(automaton: &Automaton) -> String {
    TransitionTable::new(automaton).to_string()
}

fn width(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::ends_with_a;
    use crate::types::TransitionRelation;

    #[test]
    fn test_render_example() {
        let table = render(&ends_with_a());

        let expected = concat!(
            "      |  a |  b\n",
            "-> q1 | q2 | q1\n",
            "<- q2 | q2 | --\n",
            "   q3 | q4 | q3\n",
            "   q4 | -- | --\n",
        );
        assert_eq!(table, expected);
    }

    #[test]
    fn test_render_is_idempotent() {
        let automaton = ends_with_a();
        assert_eq!(render(&automaton), render(&automaton));
    }

    #[test]
    fn test_render_row_and_column_counts() {
        let automaton = ends_with_a();
        let table = render(&automaton);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 1 + automaton.states().len());
        for line in &lines {
            assert_eq!(line.matches(" | ").count(), automaton.alphabet().len());
        }

        let defined = table.lines().skip(1).flat_map(|line| line.split(" | ").skip(1));
        let filled = defined.filter(|cell| cell.trim() != NO_TRANSITION).count();
        assert_eq!(filled, automaton.relation().len());
    }

    #[test]
    fn test_root_and_final_marker() {
        let relation: TransitionRelation =
            [("even", "1", "odd"), ("odd", "1", "even")].into_iter().collect();
        let automaton =
            Automaton::build(["even", "odd"], ["0", "1"], relation, ["even"], "even").unwrap();

        let table = render(&automaton);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[1], "<->even | -- |  odd");
        assert_eq!(lines[2], "   odd  | -- | even");
        assert_eq!(Role::of(&automaton, &State::new("even")), Role::Both);
        assert_eq!(Role::of(&automaton, &State::new("odd")), Role::Plain);
    }

    #[test]
    fn test_cells_use_placeholder() {
        let automaton = ends_with_a();
        let cells = TransitionTable::new(&automaton).cells();

        assert_eq!(cells[1], vec!["q2", NO_TRANSITION]);
        assert_eq!(cells[3], vec![NO_TRANSITION, NO_TRANSITION]);
    }
}
