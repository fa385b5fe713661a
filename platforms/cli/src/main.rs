mod logging;

use anyhow::{bail, Context};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use dfa::{analyze, render, Automaton, Catalog, Definition, Halt, Loader, Machine, Mode};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

/// Tests words against a deterministic finite automaton.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  dfa-cli --builtin 'Ends with a' a ba ab
  dfa-cli --file demos/even-zeros.dfa --table 0110
  cat demos/contains-ab.dfa | dfa-cli --analyze bab")]
struct Cli {
    /// Path to an automaton definition file (.dfa).
    /// If neither this nor --builtin is given, the definition is read from stdin.
    #[clap(short, long, conflicts_with = "builtin")]
    file: Option<PathBuf>,

    /// Name of a built-in automaton (see --list).
    #[clap(short, long)]
    builtin: Option<String>,

    /// List the built-in automata and exit.
    #[clap(short, long)]
    list: bool,

    /// Print the transition table.
    #[clap(short, long)]
    table: bool,

    /// Report unreachable states, dead states, and missing transitions.
    #[clap(short, long)]
    analyze: bool,

    /// Treat symbols outside the alphabet as errors instead of rejections.
    #[clap(short, long)]
    strict: bool,

    /// Print the states visited by each word.
    #[clap(long)]
    trace: bool,

    /// Print the automaton as JSON.
    #[clap(long)]
    json: bool,

    #[clap(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// Words to test. Single-character alphabets split words per character,
    /// other alphabets take whitespace or comma separated symbols.
    words: Vec<String>,
}

/// The result of testing every word.
#[derive(Debug, Default, PartialEq)]
struct Summary {
    rejected: usize,
    errors: usize,
}

impl Summary {
    fn exit_code(&self) -> ExitCode {
        if self.errors > 0 {
            ExitCode::from(2)
        } else if self.rejected > 0 {
            ExitCode::from(1)
        } else {
            ExitCode::SUCCESS
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbosity.tracing_level_filter()) {
        eprintln!("error: failed to initialize logging: {e}");
        return ExitCode::from(2);
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    if cli.list {
        list_builtins()?;
        return Ok(ExitCode::SUCCESS);
    }

    let definition = load_definition(cli)?;
    let automaton = &definition.automaton;
    tracing::info!(name = %definition.name, states = automaton.states().len(), "loaded automaton");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&definition)?);
    }

    if cli.table {
        print!("{}", render(automaton));
    }

    if cli.analyze {
        for finding in analyze(automaton) {
            println!("warning: {finding}");
        }
    }

    let mode = if cli.strict { Mode::Strict } else { Mode::Normal };
    let summary = test_words(automaton, &cli.words, mode, cli.trace);

    Ok(summary.exit_code())
}

fn list_builtins() -> anyhow::Result<()> {
    for index in 0..Catalog::count() {
        let info = Catalog::info(index)?;
        println!(
            "{}: {} ({} states, {} symbols, {} transitions)",
            info.index, info.name, info.state_count, info.symbol_count, info.transition_count
        );
    }
    Ok(())
}

fn load_definition(cli: &Cli) -> anyhow::Result<Definition> {
    if let Some(path) = &cli.file {
        return Loader::load(path).with_context(|| format!("loading {}", path.display()));
    }

    if let Some(name) = &cli.builtin {
        return Ok(Catalog::by_name(name)?);
    }

    if io::stdin().is_terminal() {
        bail!("no automaton given: use --file, --builtin, or pipe a definition on stdin");
    }

    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("reading definition from stdin")?;

    Ok(Loader::load_from_string(&content)?)
}

fn test_words(automaton: &Automaton, words: &[String], mode: Mode, trace: bool) -> Summary {
    let mut summary = Summary::default();

    for text in words {
        let mut machine = Machine::with_mode(automaton, automaton.tokenize(text), mode);
        let halt = machine.run();

        match &halt {
            Halt::Accepted(_) => {}
            Halt::Err(_) => summary.errors += 1,
            _ => summary.rejected += 1,
        }

        println!("{text:?}: {}", verdict(&halt));

        if trace {
            let states: Vec<&str> = machine.trace().iter().map(|state| state.as_str()).collect();
            println!("  {}", states.join(" -> "));
        }
    }

    summary
}

fn verdict(halt: &Halt) -> String {
    match halt {
        Halt::Accepted(state) => format!("accepted (in {state})"),
        Halt::Rejected(state) => format!("rejected (stopped in non-final {state})"),
        Halt::Stuck {
            state,
            symbol,
            position,
        } => format!("rejected (stuck in {state} on '{symbol}' at {position})"),
        Halt::Err(e) => format!("error ({e})"),
    }
}
