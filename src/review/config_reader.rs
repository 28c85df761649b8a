use crate::args::Args;
use crate::review::*;

use name_highlight::HighlightSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The optional JSON configuration file.
///
/// Relative paths are resolved against the directory of the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(rename = "positionsFile")]
    pub positions_file: Option<String>,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "reportsDirectory")]
    pub reports_directory: Option<String>,
    #[serde(rename = "feedbackFile")]
    pub feedback_file: Option<String>,
    #[serde(rename = "codebookFile")]
    pub codebook_file: Option<String>,
    pub threshold: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

/// Everything the commands need to know, once the command line and the
/// configuration file have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub positions: PathBuf,
    pub input_type: InputType,
    pub excel_worksheet_name: Option<String>,
    pub reports_dir: PathBuf,
    pub feedback: PathBuf,
    pub codebook: PathBuf,
    pub highlight: HighlightSettings,
}

const DEFAULT_POSITIONS: &str = "reconstructed_positions.csv";
const DEFAULT_REPORTS_DIR: &str = "reports";
const DEFAULT_FEEDBACK: &str = "feedback_data.json";
const DEFAULT_CODEBOOK: &str = "codebook.pdf";

pub fn read_config(path: &str) -> ReviewResult<ReviewConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: ReviewConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_settings(args: &Args) -> ReviewResult<Settings> {
    let (config, config_dir) = match &args.config {
        Some(p) => {
            info!("Reading configuration from {:?}", p);
            let dir = Path::new(p).parent().map(|d| d.to_path_buf());
            (read_config(p)?, dir)
        }
        None => (ReviewConfig::default(), None),
    };
    merge_settings(args, &config, config_dir.as_deref())
}

fn merge_settings(
    args: &Args,
    config: &ReviewConfig,
    config_dir: Option<&Path>,
) -> ReviewResult<Settings> {
    // Command line first, then the configuration file, then the defaults.
    let pick = |cli: &Option<String>, cfg: &Option<String>, default: &str| -> PathBuf {
        match (cli, cfg) {
            (Some(p), _) => PathBuf::from(p),
            (None, Some(p)) => resolve_path(config_dir, p),
            (None, None) => PathBuf::from(default),
        }
    };

    let positions = pick(&args.positions, &config.positions_file, DEFAULT_POSITIONS);
    let input_type = match args.input_type.as_ref().or(config.input_type.as_ref()) {
        Some(t) => parse_input_type(t)?,
        None => infer_input_type(&positions),
    };

    let threshold = args
        .threshold
        .or(config.threshold)
        .unwrap_or(HighlightSettings::DEFAULT_SETTINGS.threshold);
    let highlight = HighlightSettings::with_threshold(threshold);
    if highlight.threshold != threshold {
        warn!(
            "Matching sensitivity {} adjusted to {} (allowed: {} to {} by steps of {})",
            threshold,
            highlight.threshold,
            HighlightSettings::MIN_THRESHOLD,
            HighlightSettings::MAX_THRESHOLD,
            HighlightSettings::STEP
        );
    }

    Ok(Settings {
        positions,
        input_type,
        excel_worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.excel_worksheet_name.clone()),
        reports_dir: pick(
            &args.reports_dir,
            &config.reports_directory,
            DEFAULT_REPORTS_DIR,
        ),
        feedback: pick(&args.feedback, &config.feedback_file, DEFAULT_FEEDBACK),
        codebook: pick(&args.codebook, &config.codebook_file, DEFAULT_CODEBOOK),
        highlight,
    })
}

fn parse_input_type(s: &str) -> ReviewResult<InputType> {
    match s.to_lowercase().as_str() {
        "csv" => Ok(InputType::Csv),
        "xlsx" | "excel" => Ok(InputType::Xlsx),
        x => whatever!("Unknown input type {:?} (expected csv or xlsx)", x),
    }
}

fn infer_input_type(path: &Path) -> InputType {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => InputType::Xlsx,
        _ => InputType::Csv,
    }
}

fn resolve_path(base: Option<&Path>, p: &str) -> PathBuf {
    match base {
        Some(dir) if Path::new(p).is_relative() => dir.join(p),
        _ => PathBuf::from(p),
    }
}
