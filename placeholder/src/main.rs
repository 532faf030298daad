use clap::{Parser, Subcommand};
use console::style;
use placeholder::builtin_functions::sql::Database;
use placeholder::placeholders::{ON_END, ON_START, OUTPUT_FORMAT, OUTPUT_NAME};
use placeholder::{
    evaluator_with_database, parse_raw_value, render_error, PlaceholderSet, RenderError,
};
use placeholder_eval::{EvalError, Evaluator};
use placeholder_parser::{parse, visitor::called_functions};
use placeholder_source::Source;
use placeholder_value::Value;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use thiserror::Error;

/// Evaluate placeholder expressions and fill `{KEY}` placeholders in text.
#[derive(Parser, Debug)]
#[command(name = "placeholder", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// SQLite database queried by `SQL(...)`, opened on first use
    #[arg(long, global = true, value_name = "PATH", default_value = "data.db")]
    db: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read values from stdin line by line and print what they evaluate to (default)
    Repl,
    /// Evaluate raw values: expressions, templates or plain text
    Eval {
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Interpolate every `{expression}` in TEXT
    Template { text: String },
    /// Parse an expression without evaluating it and list the functions it calls
    Check { expr: String },
    /// List the available functions
    Functions,
    /// Compute placeholders and substitute them into FILE (or stdin)
    Fill {
        /// Placeholder definition, may be repeated
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Expression evaluated before the placeholders
        #[arg(long, value_name = "EXPR")]
        on_start: Vec<String>,
        /// Expression evaluated after the placeholders
        #[arg(long, value_name = "EXPR")]
        on_end: Vec<String>,
        /// Output name pattern, e.g. `Invoice-{NUM}`
        #[arg(long, value_name = "PATTERN")]
        name: Option<String>,
        /// Requested output format, may be repeated
        #[arg(long, value_name = "FMT")]
        format: Vec<String>,
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    /// Rendered with a diagnostic pointing into `text`.
    #[error("{source}")]
    Expression { text: String, source: EvalError },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("invalid definition '{0}', expected KEY=VALUE")]
    InvalidSet(String),
    #[error("unknown function(s): {0}")]
    UnknownFunctions(String),
    #[error("{path}: {source}")]
    Read { path: String, source: io::Error },
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let database = Rc::new(Database::new(cli.db));
    let evaluator = evaluator_with_database(Rc::clone(&database));

    let result = match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => repl(&evaluator).map_err(CliError::from),
        Command::Eval { values } => eval(&evaluator, &values),
        Command::Template { text } => template(&evaluator, &text),
        Command::Check { expr } => check(&evaluator, &expr),
        Command::Functions => {
            functions(&evaluator);
            Ok(())
        }
        Command::Fill {
            set,
            on_start,
            on_end,
            name,
            format,
            file,
        } => {
            let mut placeholders = PlaceholderSet::new();
            for hook in on_start {
                placeholders.insert(ON_START, Value::from(hook));
            }
            for hook in on_end {
                placeholders.insert(ON_END, Value::from(hook));
            }
            if let Some(name) = name {
                placeholders.insert(OUTPUT_NAME, Value::from(name));
            }
            for format in format {
                placeholders.insert(OUTPUT_FORMAT, Value::from(format));
            }
            fill(&evaluator, placeholders, &set, file)
        }
    };
    database.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Expression { text, source }) => {
            eprintln!("{}", render_error(&text, &source));
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{} {}", style("Error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn repl(evaluator: &Evaluator) -> io::Result<()> {
    let mut stdout = io::stdout();
    let stdin = io::stdin();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            println!();
            return Ok(());
        }
        let input = input.trim_end_matches(&['\r', '\n'][..]);
        if input.trim().is_empty() {
            continue;
        }

        match evaluator.evaluate_value(&Value::from(input)) {
            Ok(value) => println!("{}", style(value).green()),
            Err(err) => eprintln!("{}", render_error(input, &err)),
        }
    }
}

fn eval(evaluator: &Evaluator, values: &[String]) -> Result<(), CliError> {
    for raw in values {
        let value = evaluator
            .evaluate_value(&Value::from(raw.as_str()))
            .map_err(|source| CliError::Expression {
                text: raw.clone(),
                source,
            })?;
        println!("{}", value);
    }
    Ok(())
}

fn template(evaluator: &Evaluator, text: &str) -> Result<(), CliError> {
    let rendered = evaluator
        .evaluate_template(text)
        .map_err(|source| CliError::Expression {
            text: text.to_string(),
            source,
        })?;
    println!("{}", rendered);
    Ok(())
}

fn check(evaluator: &Evaluator, expr: &str) -> Result<(), CliError> {
    let ast = parse(&Source::new(expr)).map_err(|err| CliError::Expression {
        text: expr.to_string(),
        source: err.into(),
    })?;

    println!("{}", style("ok").green());
    let mut unknown = Vec::new();
    for ident in called_functions(&ast) {
        if evaluator.registry().has(ident) {
            println!("  {}", ident);
        } else {
            println!("  {} {}", ident, style("(unknown)").yellow());
            unknown.push(ident);
        }
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(CliError::UnknownFunctions(unknown.join(", ")))
    }
}

fn functions(evaluator: &Evaluator) {
    let registry = evaluator.registry();
    for name in registry.names() {
        if let Some(function) = registry.get(name) {
            println!("{:<18} {} argument(s)", name, function.arity);
        }
    }
}

fn fill(
    evaluator: &Evaluator,
    mut placeholders: PlaceholderSet,
    definitions: &[String],
    file: Option<PathBuf>,
) -> Result<(), CliError> {
    for definition in definitions {
        let (key, raw) = definition
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| CliError::InvalidSet(definition.clone()))?;
        placeholders.insert(key.trim(), parse_raw_value(raw));
    }

    let text = match &file {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let rendered = placeholders.render(evaluator)?;
    let mut stdout = io::stdout();
    stdout.write_all(rendered.substitute(&text).as_bytes())?;
    stdout.flush()?;

    if let Some(name) = &rendered.output_name {
        if rendered.output_formats.is_empty() {
            eprintln!("output: {}", name);
        } else {
            eprintln!("output: {} [{}]", name, rendered.output_formats.join(", "));
        }
    }
    Ok(())
}
