//! cellgraph CLI - inspect and edit cell models

use anyhow::{bail, Context, Result};
use cellgraph::prelude::*;
use cellgraph::storage::{json, sqlite};
use cellgraph::ViewPositions;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cellgraph")]
#[command(author, version, about = "Reactive cell model tool")]
struct Cli {
    /// Log model activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every cell with its formula and value or error
    Show {
        /// Model file (json, db, sqlite)
        input: PathBuf,
    },

    /// Print cell names in evaluation order
    Order {
        /// Model file (json, db, sqlite)
        input: PathBuf,
    },

    /// Set a cell's formula, creating the cell if needed, and save
    Set {
        /// Model file (json, db, sqlite)
        input: PathBuf,

        /// Cell name
        cell: String,

        /// New formula text
        formula: String,

        /// Write to this file instead of the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate a formula without cell references
    Eval {
        /// Formula text, e.g. "average(1;2;10;6;3)"
        formula: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Show { input } => show(&input),
        Commands::Order { input } => order(&input),
        Commands::Set {
            input,
            cell,
            formula,
            output,
        } => set(&input, &cell, &formula, output.as_deref()),
        Commands::Eval { formula } => eval(&formula),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Storage backend chosen by file extension
enum Format {
    Json,
    Sqlite,
}

fn format_of(path: &Path) -> Result<Format> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("json") => Ok(Format::Json),
        Some("db") | Some("sqlite") => Ok(Format::Sqlite),
        _ => bail!("Unsupported file format: {}", path.display()),
    }
}

fn load(path: &Path) -> Result<(Model, ViewPositions)> {
    let loaded = match format_of(path)? {
        Format::Json => json::load(path).map(|model| (model, ViewPositions::new())),
        Format::Sqlite => sqlite::load(path),
    };
    loaded.with_context(|| format!("Failed to open '{}'", path.display()))
}

fn save(model: &Model, positions: &ViewPositions, path: &Path) -> Result<()> {
    let saved = match format_of(path)? {
        Format::Json => json::save(model, path),
        Format::Sqlite => sqlite::save(model, positions, path),
    };
    saved.with_context(|| format!("Failed to write '{}'", path.display()))
}

/// One-line rendering of a cell's state
fn describe(cell: &Cell) -> String {
    if let Some(table) = cell.table() {
        return format!("table {}x{}", table.rows(), table.cols());
    }
    match cell.value() {
        Ok(value) => value.as_text(),
        Err(error) => format!("#ERROR ({})", error),
    }
}

fn show(input: &Path) -> Result<()> {
    let (model, _) = load(input)?;

    println!("File: {}", input.display());
    println!("Cells: {}", model.len());
    println!();

    let width = model.cells().map(|c| c.name().len()).max().unwrap_or(0);
    for cell in model.cells() {
        println!(
            "{:width$}  {:<24}  {}",
            cell.name(),
            cell.formula(),
            describe(cell),
            width = width
        );
    }

    let errors = model.cells().filter(|c| c.has_error()).count();
    if errors > 0 {
        eprintln!("{} cell(s) in error", errors);
    }
    Ok(())
}

fn order(input: &Path) -> Result<()> {
    let (model, _) = load(input)?;
    for id in model.evaluation_order() {
        let cell = model.cell(id)?;
        println!("{}", cell.name());
    }
    Ok(())
}

fn set(input: &Path, name: &str, formula: &str, output: Option<&Path>) -> Result<()> {
    let (mut model, positions) = load(input)?;

    let id = match model.id_of(name) {
        Some(id) => {
            model.set_formula(id, formula)?;
            id
        }
        None => model
            .create_cell(Some(name), Some(formula))
            .with_context(|| format!("Failed to create cell '{}'", name))?,
    };

    let cell = model.cell(id)?;
    println!("{} = {}", cell.name(), describe(cell));

    let target = output.unwrap_or(input);
    save(&model, &positions, target)?;
    eprintln!("Wrote {} cells to '{}'", model.len(), target.display());
    Ok(())
}

fn eval(formula: &str) -> Result<()> {
    let mut model = Model::new();
    let id = model.create_cell(None, Some(formula))?;
    let cell = model.cell(id)?;
    match cell.value() {
        Ok(value) => {
            println!("{}", value.as_text());
            Ok(())
        }
        Err(error) => bail!("{}", error),
    }
}
