use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xml_sheets::model::{Cell, Table};
use xml_sheets::sync::{self, ExportRequest};
use xml_sheets::{ErrorKind, IoFailure, Result, Session, ToolError};

fn main() {
    if let Err(error) = init_tracing() {
        eprintln!("warning: {error}");
    }

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(exit_code(&error));
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert(args) => execute_convert(args),
        Command::Inspect(args) => execute_inspect(args),
    }
}

fn execute_convert(args: ConvertArgs) -> Result<()> {
    ensure_input(&args.input)?;

    let mut session = Session::new();
    if !args.quiet {
        session.log.add_listener(|entry| println!("{entry}"));
    }

    let outcome = convert(&mut session, &args);

    // The log is saved even when the conversion failed, so the failure is
    // part of it.
    match &args.save_log {
        Some(log_path) => finish(outcome, sync::save_log(&mut session, log_path).map(|_| ())),
        None => outcome,
    }
}

/// Combines the conversion outcome with the log save. A conversion failure
/// wins; a save failure is only reported when it would otherwise be lost.
fn finish(outcome: Result<()>, saved: Result<()>) -> Result<()> {
    match (outcome, saved) {
        (Err(err), Err(save_err)) => {
            eprintln!("warning: failed to save log: {save_err}");
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(()), saved) => saved,
    }
}

fn convert(session: &mut Session, args: &ConvertArgs) -> Result<()> {
    sync::load_xml(session, &args.input)?;

    let request = ExportRequest {
        source: args.input.clone(),
        output: args.output.clone(),
        columns: (!args.columns.is_empty()).then(|| args.columns.clone()),
    };
    sync::export_excel(session, &request)?;
    Ok(())
}

fn execute_inspect(args: InspectArgs) -> Result<()> {
    ensure_input(&args.input)?;

    let mut session = Session::new();
    sync::load_xml(&mut session, &args.input)?;
    let table = session.store.table().ok_or(ToolError::NoTable)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(table)?);
    } else {
        print_table(table);
    }
    Ok(())
}

fn print_table(table: &Table) {
    println!("{}", table.columns().join("\t"));
    for row in table.rows() {
        let cells: Vec<&str> = table
            .columns()
            .iter()
            .map(|column| match row.cell(column) {
                Cell::Text(text) => text,
                Cell::Empty => "",
                Cell::Missing => "-",
            })
            .collect();
        println!("{}", cells.join("\t"));
    }
}

fn ensure_input(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ToolError::MissingInput(path.to_path_buf()))
    }
}

fn exit_code(error: &ToolError) -> i32 {
    match error.kind() {
        ErrorKind::Syntax => 2,
        ErrorKind::Io(IoFailure::ResourceBusy) => 3,
        ErrorKind::Io(IoFailure::Other) | ErrorKind::Unclassified => 1,
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Flatten XML documents into spreadsheet tables."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an XML document into a sheet of an Excel workbook.
    Convert(ConvertArgs),
    /// Print the table an XML document flattens into.
    Inspect(InspectArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input XML file path.
    #[arg(long)]
    input: PathBuf,

    /// Output workbook path. An existing workbook receives a new sheet.
    #[arg(long)]
    output: PathBuf,

    /// Comma-separated list of columns to export. Defaults to all columns.
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Save the event log to this file once done.
    #[arg(long)]
    save_log: Option<PathBuf>,

    /// Do not echo log entries to stdout.
    #[arg(long, short)]
    quiet: bool,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Input XML file path.
    #[arg(long)]
    input: PathBuf,

    /// Print the table as JSON.
    #[arg(long)]
    json: bool,
}
