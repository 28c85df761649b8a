use log::{debug, info, warn};

use name_highlight::{highlight_with, Marker};
use snafu::{prelude::*, Snafu};

use std::fmt::Display;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::review::config_reader::*;
use crate::review::feedback::FeedbackStore;
use crate::review::reports::ReportLibrary;
use crate::review::session::{Reviewer, Session};

mod config_reader;
mod feedback;
mod io_common;
mod io_csv;
mod io_xlsx;
mod render;
mod reports;
mod session;

#[derive(Debug, Snafu)]
pub enum ReviewError {
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet {sheet:?} in {path}"))]
    MissingWorksheet { path: String, sheet: String },
    #[snafu(display("The Excel file {path} is empty"))]
    EmptyExcel { path: String },
    #[snafu(display("Column {column:?} not found in {path}"))]
    MissingColumn { path: String, column: String },
    #[snafu(display("No row with a speaker in {path}"))]
    EmptyTable { path: String },
    #[snafu(display("Error reading {path}"))]
    OpeningFile { source: io::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    WritingFile { source: io::Error, path: String },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Entry {index} does not exist (entries go from 1 to {total})"))]
    IndexOutOfRange { index: usize, total: usize },
    #[snafu(display("Unknown summary {name:?} (expected issue, position, argument or proposal)"))]
    UnknownField { name: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReviewResult<T> = Result<T, ReviewError>;

/// The four extracted summaries that reviewers annotate.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum SummaryField {
    Issue,
    Position,
    Argument,
    Proposal,
}

impl SummaryField {
    pub const ALL: [SummaryField; 4] = [
        SummaryField::Issue,
        SummaryField::Position,
        SummaryField::Argument,
        SummaryField::Proposal,
    ];

    /// The name used in the feedback file.
    pub fn key(&self) -> &'static str {
        match self {
            SummaryField::Issue => "issue",
            SummaryField::Position => "position",
            SummaryField::Argument => "argument",
            SummaryField::Proposal => "proposal",
        }
    }

    /// The header of the column holding this summary in the positions table.
    pub fn column(&self) -> &'static str {
        match self {
            SummaryField::Issue => "issueSum",
            SummaryField::Position => "positionSum",
            SummaryField::Argument => "argSum",
            SummaryField::Proposal => "propSum",
        }
    }

    /// Exact lookup of a feedback file key. User input goes through `FromStr`.
    pub fn from_key(key: &str) -> Option<SummaryField> {
        SummaryField::ALL.iter().find(|f| f.key() == key).cloned()
    }

    pub fn label(&self) -> &'static str {
        match self {
            SummaryField::Issue => "Issue",
            SummaryField::Position => "Position",
            SummaryField::Argument => "Argument",
            SummaryField::Proposal => "Proposal",
        }
    }
}

impl FromStr for SummaryField {
    type Err = ReviewError;

    fn from_str(s: &str) -> ReviewResult<SummaryField> {
        SummaryField::ALL
            .iter()
            .find(|f| f.key().eq_ignore_ascii_case(s.trim()))
            .cloned()
            .context(UnknownFieldSnafu { name: s })
    }
}

impl Display for SummaryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One speaker intervention, as displayed to the reviewer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReviewEntry {
    /// Position in the table once the rows without speaker are dropped.
    /// This is the row identifier used by the feedback file.
    pub index: usize,
    pub speaker: String,
    /// The speaker, with the intervention number when the speaker talks more than once.
    pub display_name: String,
    pub report: Option<String>,
    pub issue: Option<String>,
    pub position: Option<String>,
    pub argument: Option<String>,
    pub proposal: Option<String>,
}

impl ReviewEntry {
    pub fn summary(&self, field: SummaryField) -> Option<&str> {
        match field {
            SummaryField::Issue => self.issue.as_deref(),
            SummaryField::Position => self.position.as_deref(),
            SummaryField::Argument => self.argument.as_deref(),
            SummaryField::Proposal => self.proposal.as_deref(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Html,
}

fn read_format(format: &Option<String>) -> ReviewResult<OutputFormat> {
    match format.as_deref() {
        None | Some("text") => Ok(OutputFormat::Text),
        Some("html") => Ok(OutputFormat::Html),
        Some(x) => whatever!("Unknown output format {:?} (expected text or html)", x),
    }
}

fn text_marker(args: &Args) -> Marker<'static> {
    pick_text_marker(args.no_color, io::stdout().is_terminal())
}

// Colors only go to a terminal.
fn pick_text_marker(no_color: bool, terminal: bool) -> Marker<'static> {
    if no_color || !terminal {
        Marker::BRACKETS
    } else {
        Marker::ANSI
    }
}

pub fn load_entries(settings: &Settings) -> ReviewResult<Vec<ReviewEntry>> {
    let path = settings.positions.display().to_string();
    info!(
        "Attempting to read positions file {:?} as {:?}",
        path, settings.input_type
    );
    let rows = match settings.input_type {
        InputType::Csv => io_csv::read_csv_positions(&path)?,
        InputType::Xlsx => {
            io_xlsx::read_xlsx_positions(&path, settings.excel_worksheet_name.as_deref())?
        }
    };
    let entries = io_common::assemble_entries(rows);
    ensure!(!entries.is_empty(), EmptyTableSnafu { path });
    info!("Loaded {} entries", entries.len());
    Ok(entries)
}

// Converts a 1-based entry number into a table index.
fn entry_index(number: usize, total: usize) -> ReviewResult<usize> {
    ensure!(
        number >= 1 && number <= total,
        IndexOutOfRangeSnafu {
            index: number,
            total
        }
    );
    Ok(number - 1)
}

/// Entry point for all the commands.
pub fn run(args: &Args) -> ReviewResult<()> {
    let settings = read_settings(args)?;
    debug!("run: settings: {:?}", settings);
    match &args.command {
        Command::Review { start } => run_review(args, &settings, start.unwrap_or(1)),
        Command::Show { index, format } => run_show(args, &settings, *index, read_format(format)?),
        Command::Vote {
            index,
            field,
            up,
            down,
        } => {
            let approved = match (*up, *down) {
                (true, false) => true,
                (false, true) => false,
                _ => whatever!("Exactly one of --up or --down must be given"),
            };
            run_vote(&settings, *index, field.parse()?, approved)
        }
        Command::Comment { index, field, text } => {
            run_comment(&settings, *index, field.parse()?, text)
        }
        Command::Progress => run_progress(&settings),
        Command::Highlight {
            speaker,
            text,
            file,
            format,
        } => run_highlight(args, &settings, speaker, text, file, read_format(format)?),
        Command::Export { out } => run_export(&settings, out),
        Command::Import { file, preview } => run_import(&settings, file, *preview),
        Command::Codebook { out } => run_codebook(&settings, out),
    }
}

fn open_reviewer(
    settings: &Settings,
    start: usize,
    marker: Marker<'static>,
) -> ReviewResult<Reviewer> {
    let entries = load_entries(settings)?;
    let current = entry_index(start, entries.len())?;
    let store = FeedbackStore::load(&settings.feedback)?;
    let reports = ReportLibrary::new(&settings.reports_dir);
    let session = Session {
        current,
        total: entries.len(),
        highlight: settings.highlight,
    };
    Ok(Reviewer::new(entries, reports, store, session, marker))
}

fn run_review(args: &Args, settings: &Settings, start: usize) -> ReviewResult<()> {
    let mut reviewer = open_reviewer(settings, start, text_marker(args))?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    reviewer.run_loop(stdin.lock(), stdout.lock())?;
    let session = reviewer.session();
    println!("Stopped at entry {} / {}", session.current + 1, session.total);
    Ok(())
}

fn run_show(
    args: &Args,
    settings: &Settings,
    number: usize,
    format: OutputFormat,
) -> ReviewResult<()> {
    let entries = load_entries(settings)?;
    let index = entry_index(number, entries.len())?;
    let store = FeedbackStore::load(&settings.feedback)?;
    let mut reports = ReportLibrary::new(&settings.reports_dir);
    let entry = &entries[index];
    let report = reports.lookup(entry.report.as_deref());
    let page = match format {
        OutputFormat::Text => render::render_entry(
            entry,
            entries.len(),
            &report,
            &store,
            settings.highlight,
            &text_marker(args),
        ),
        OutputFormat::Html => {
            render::render_entry_html(entry, entries.len(), &report, &store, settings.highlight)
        }
    };
    println!("{}", page);
    Ok(())
}

fn run_vote(
    settings: &Settings,
    number: usize,
    field: SummaryField,
    approved: bool,
) -> ReviewResult<()> {
    let entries = load_entries(settings)?;
    let index = entry_index(number, entries.len())?;
    let mut store = FeedbackStore::load(&settings.feedback)?;
    store.vote(index, field, approved)?;
    println!(
        "{}: {} marked as {}",
        entries[index].display_name,
        field,
        if approved { "correct" } else { "incorrect" }
    );
    Ok(())
}

fn run_comment(
    settings: &Settings,
    number: usize,
    field: SummaryField,
    text: &str,
) -> ReviewResult<()> {
    let entries = load_entries(settings)?;
    let index = entry_index(number, entries.len())?;
    let mut store = FeedbackStore::load(&settings.feedback)?;
    store.comment(index, field, text)?;
    println!("{}: comment on {} saved", entries[index].display_name, field);
    Ok(())
}

fn run_progress(settings: &Settings) -> ReviewResult<()> {
    let entries = load_entries(settings)?;
    let store = FeedbackStore::load(&settings.feedback)?;
    println!("{}", render::render_progress(store.annotated_rows(), entries.len()));
    Ok(())
}

fn run_highlight(
    args: &Args,
    settings: &Settings,
    speaker: &str,
    text: &Option<String>,
    file: &Option<String>,
    format: OutputFormat,
) -> ReviewResult<()> {
    let content = match (text, file) {
        (Some(t), None) => t.clone(),
        (None, Some(path)) => {
            fs::read_to_string(path).context(OpeningFileSnafu { path: path.clone() })?
        }
        _ => whatever!("Exactly one of --text or --file must be given"),
    };
    let marker = match format {
        OutputFormat::Text => text_marker(args),
        OutputFormat::Html => Marker::HTML,
    };
    let out = highlight_with(&content, speaker, settings.highlight.threshold, &marker);
    println!("{}", out);
    Ok(())
}

/// The file name proposed for exports, e.g. `feedback_annotations_20240131_174502.json`.
pub fn export_file_name(now: chrono::NaiveDateTime) -> String {
    format!("feedback_annotations_{}.json", now.format("%Y%m%d_%H%M%S"))
}

fn run_export(settings: &Settings, out: &Option<String>) -> ReviewResult<()> {
    let store = FeedbackStore::load(&settings.feedback)?;
    let dest: PathBuf = match out {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(export_file_name(chrono::Local::now().naive_local())),
    };
    let contents = store.to_pretty_json()?;
    let dest_s = dest.display().to_string();
    fs::write(&dest, contents).context(WritingFileSnafu { path: dest_s.clone() })?;
    info!("Exported {} annotated rows to {:?}", store.annotated_rows(), dest_s);
    println!("Annotations saved to {}", dest_s);
    Ok(())
}

fn run_import(settings: &Settings, file: &str, preview: bool) -> ReviewResult<()> {
    let contents = fs::read_to_string(file).context(OpeningFileSnafu { path: file })?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu { path: file })?;
    let rows = feedback::rows_from_json(&js)?;

    let mut store = FeedbackStore::load(&settings.feedback)?;
    if preview {
        let incoming = FeedbackStore::with_rows(&settings.feedback, rows);
        let current_js = store.to_pretty_json()?;
        let incoming_js = incoming.to_pretty_json()?;
        if current_js == incoming_js {
            println!("No difference with the current annotations");
        } else {
            print_diff(current_js.as_str(), incoming_js.as_str(), "\n");
        }
        return Ok(());
    }
    store.replace(rows)?;
    println!(
        "Annotations loaded successfully! ({} annotated rows)",
        store.annotated_rows()
    );
    Ok(())
}

fn run_codebook(settings: &Settings, out: &str) -> ReviewResult<()> {
    let source = &settings.codebook;
    if !source.exists() {
        warn!("Codebook not found at {:?}", source);
        println!("Codebook not found");
        return Ok(());
    }
    fs::copy(source, out).context(WritingFileSnafu { path: out })?;
    println!("Codebook saved to {}", out);
    Ok(())
}
