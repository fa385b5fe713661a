//! This module provides the parser for automaton definitions, utilizing the `pest` crate.
//! It defines the grammar for `.dfa` files and functions to parse the input into a `Definition`.

use crate::{
    automaton::{Automaton, Definition},
    types::{DfaError, State, Symbol, TransitionRelation, MAX_DEFINITION_SIZE},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;
use std::iter;

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// Parses the given input string into a `Definition`.
///
/// This is the main entry point for parsing automaton definitions. Sections the input
/// omits are filled in: the start state defaults to the first rule block, and the
/// state set and alphabet default to everything the definition mentions, in order of
/// first appearance. The result is built with `Automaton::build`, so every returned
/// definition is valid.
///
/// # Arguments
///
/// * `input` - A string slice containing the automaton definition.
///
/// # Returns
///
/// * `Ok(Definition)` if the input is successfully parsed and validated.
/// * `Err(DfaError::ParseError)` if there are any syntax errors.
/// * `Err(DfaError::ValidationError)` if a required section is missing.
/// * `Err(DfaError::Construction)` if the automaton breaks a structural invariant.
pub fn parse(input: &str) -> Result<Definition, DfaError> {
    if input.len() > MAX_DEFINITION_SIZE {
        return Err(DfaError::ValidationError(format!(
            "Definition is {} bytes, the limit is {} bytes",
            input.len(),
            MAX_DEFINITION_SIZE
        )));
    }

    let root = DefinitionParser::parse(Rule::program, input.trim())
        .map_err(|e| DfaError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| DfaError::ValidationError("Empty definition".to_string()))?;

    let definition = parse_program(root)?;

    tracing::debug!(
        name = %definition.name,
        states = definition.automaton.states().len(),
        "parsed definition"
    );

    Ok(definition)
}

/// A state block of the `rules:` section.
struct Block {
    state: State,
    actions: Vec<(Symbol, State)>,
}

/// Parses the top-level structure of a definition from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Definition, DfaError> {
    let mut name: Option<String> = None;
    let mut alphabet: Option<Vec<Symbol>> = None;
    let mut states: Option<Vec<State>> = None;
    let mut start: Option<State> = None;
    let mut finals: Option<Vec<State>> = None;
    let mut blocks: Option<Vec<Block>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_text(p)),
            Rule::alphabet => alphabet = Some(parse_symbols(p)),
            Rule::states => states = Some(parse_states(p)),
            Rule::start => start = parse_states(p).into_iter().next(),
            Rule::finals => finals = Some(parse_states(p)),
            Rule::rules => blocks = Some(parse_rules(p)?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let blocks = check_required_rule(blocks, "rules")?;
    let start = start.or_else(|| blocks.first().map(|block| block.state));
    let start = check_required_rule(start, "start")?;
    let finals = finals.unwrap_or_default();

    let states = states.unwrap_or_else(|| {
        iter::once(start)
            .chain(blocks.iter().flat_map(|block| {
                iter::once(block.state).chain(block.actions.iter().map(|(_, to)| *to))
            }))
            .collect()
    });

    let alphabet = alphabet.unwrap_or_else(|| {
        blocks
            .iter()
            .flat_map(|block| block.actions.iter().map(|(symbol, _)| *symbol))
            .collect()
    });

    let transitions: TransitionRelation = blocks
        .iter()
        .flat_map(|block| {
            block
                .actions
                .iter()
                .map(|(symbol, to)| (block.state, *symbol, *to))
        })
        .collect();

    let automaton = Automaton::build(states, alphabet, transitions, finals, start)?;

    Ok(Definition { name, automaton })
}

/// Parses the `rules:` section into state blocks, rejecting repeated blocks and
/// repeated `(state, symbol)` pairs.
fn parse_rules(pair: Pair<Rule>) -> Result<Vec<Block>, DfaError> {
    let mut blocks = Vec::new();
    let mut seen_states = HashSet::new();
    let mut seen_pairs = HashSet::new();

    for block_pair in pair.into_inner() {
        let span = block_pair.as_span();
        let mut state = None;
        let mut actions = Vec::new();

        for p in block_pair.into_inner() {
            match p.as_rule() {
                Rule::identifier => state = Some(State::new(p.as_str())),
                Rule::action => actions.push(p),
                _ => {}
            }
        }

        let state = state.ok_or_else(|| parse_error("Missing state name", span))?;

        // Prevent duplicated state blocks
        if !seen_states.insert(state) {
            return Err(parse_error(
                &format!("Duplicate transition block: {state}"),
                span,
            ));
        }

        let mut block = Block {
            state,
            actions: Vec::new(),
        };

        for action in actions {
            let action_span = action.as_span();
            let (symbols, to) = parse_action(action)?;

            for symbol in symbols {
                if !seen_pairs.insert((state, symbol)) {
                    return Err(parse_error(
                        &format!("Duplicate transition for state '{state}' on symbol '{symbol}'"),
                        action_span,
                    ));
                }
                block.actions.push((symbol, to));
            }
        }

        blocks.push(block);
    }

    Ok(blocks)
}

/// Parses `a, b -> q1` into its symbols and target state.
fn parse_action(pair: Pair<Rule>) -> Result<(Vec<Symbol>, State), DfaError> {
    let span = pair.as_span();
    let mut symbols = Vec::new();
    let mut target = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::symbols => symbols = parse_symbols(p),
            Rule::identifier => target = Some(State::new(p.as_str())),
            _ => {}
        }
    }

    let target = target.ok_or_else(|| parse_error("Missing target state", span))?;

    Ok((symbols, target))
}

/// Collects every symbol below `pair`, unquoting quoted symbols.
fn parse_symbols(pair: Pair<Rule>) -> Vec<Symbol> {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(|p| parse_symbol(p.as_str()))
        .collect()
}

/// Parses a single symbol, handling quoted and unquoted forms.
fn parse_symbol(input: &str) -> Symbol {
    let unquoted = input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input);
    Symbol::new(unquoted)
}

/// Collects every state name below `pair`.
fn parse_states(pair: Pair<Rule>) -> Vec<State> {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::identifier)
        .map(|p| State::new(p.as_str()))
        .collect()
}

/// Extracts the free text of a `name:` section.
fn parse_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::text)
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Creates a `DfaError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> DfaError {
    DfaError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Returns the keyword that introduces a section.
fn section_name(rule: Rule) -> &'static str {
    match rule {
        Rule::name => "name",
        Rule::alphabet => "alphabet",
        Rule::states => "states",
        Rule::start => "start",
        Rule::finals => "final",
        Rule::rules => "rules",
        _ => "",
    }
}

/// Checks if a given section has already been declared.
fn check_unique_rule(rule: Rule, span: Span, seen: &mut HashSet<Rule>) -> Result<(), DfaError> {
    if section_name(rule).is_empty() {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{}:\" declaration", section_name(rule)),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, DfaError> {
    value.ok_or_else(|| DfaError::ValidationError(format!("Missing '{name}' section")))
}
