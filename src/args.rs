use clap::{Parser, Subcommand};

/// This is an annotation tool to review extracted debate positions against their source reports.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the locations of the data files and the default
    /// matching sensitivity. The options below override the values it contains.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default reconstructed_positions.csv) The table of extracted positions, one
    /// speaker intervention per row.
    #[clap(long, value_parser)]
    pub positions: Option<String>,

    /// (csv or xlsx, default inferred from the file extension) The format of the positions table.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When the positions table is an Excel file, the name of the
    /// worksheet to read.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (directory, default reports) The directory containing the <report>.json files.
    #[clap(long, value_parser)]
    pub reports_dir: Option<String>,

    /// (file path, default feedback_data.json) Where the annotations are read from and saved to.
    #[clap(long, value_parser)]
    pub feedback: Option<String>,

    /// (file path, default codebook.pdf) The annotation codebook.
    #[clap(long, value_parser)]
    pub codebook: Option<String>,

    /// (60 to 100, default 80) Name matching sensitivity. Lower values will match more
    /// variations of the name but may have false positives.
    #[clap(short, long, value_parser)]
    pub threshold: Option<u32>,

    /// If passed as an argument, the highlighted names are shown between brackets instead of
    /// using terminal colors.
    #[clap(long, takes_value = false)]
    pub no_color: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Starts an interactive review session. Type 'help' in the session for the list of commands.
    Review {
        /// (entry number, default 1) The entry to start from.
        #[clap(long, value_parser)]
        start: Option<usize>,
    },
    /// Prints one entry with its summaries, annotations and highlighted report.
    Show {
        /// (entry number, starting at 1) The entry to print.
        #[clap(short, long, value_parser)]
        index: usize,
        /// (text or html, default text) The output format.
        #[clap(long, value_parser)]
        format: Option<String>,
    },
    /// Approves or rejects one extracted summary.
    Vote {
        /// (entry number, starting at 1) The entry to annotate.
        #[clap(short, long, value_parser)]
        index: usize,
        /// (issue, position, argument or proposal) The summary to annotate.
        #[clap(short, long, value_parser)]
        field: String,
        /// Marks the summary as correct.
        #[clap(long, takes_value = false)]
        up: bool,
        /// Marks the summary as incorrect.
        #[clap(long, takes_value = false)]
        down: bool,
    },
    /// Attaches a comment to one extracted summary. An empty text removes the comment.
    Comment {
        /// (entry number, starting at 1) The entry to annotate.
        #[clap(short, long, value_parser)]
        index: usize,
        /// (issue, position, argument or proposal) The summary to annotate.
        #[clap(short, long, value_parser)]
        field: String,
        /// The comment.
        #[clap(long, value_parser)]
        text: String,
    },
    /// Prints how many entries have been annotated so far.
    Progress,
    /// Highlights the occurrences of a name in a text.
    Highlight {
        /// The name to look for.
        #[clap(short, long, value_parser)]
        speaker: String,
        /// The text to scan. Either this option or --file must be given.
        #[clap(long, value_parser)]
        text: Option<String>,
        /// (file path) A file containing the text to scan.
        #[clap(long, value_parser)]
        file: Option<String>,
        /// (text or html, default text) The output format.
        #[clap(long, value_parser)]
        format: Option<String>,
    },
    /// Saves a copy of the annotations, to be submitted or to continue later.
    Export {
        /// (file path, default feedback_annotations_<date>_<time>.json) The destination.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },
    /// Replaces the current annotations with a previously exported file.
    Import {
        /// (file path) The annotations to load.
        #[clap(long, value_parser)]
        file: String,
        /// If passed as an argument, prints the differences with the current annotations
        /// without changing them.
        #[clap(long, takes_value = false)]
        preview: bool,
    },
    /// Copies the annotation codebook (PDF) to the given location.
    Codebook {
        /// (file path) The destination.
        #[clap(short, long, value_parser)]
        out: String,
    },
}
