use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::review::*;

/// The part of a report file used by the review.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct ReportFile {
    summary: String,
}

/// The outcome of looking up the report of an entry.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReportLookup {
    /// The entry does not name any report.
    NoReport,
    /// The report file is missing or could not be read.
    NotFound(String),
    Loaded { name: String, text: String },
}

/// Reads `<dir>/<name>.json` files and keeps what it has read.
#[derive(Debug, Clone)]
pub struct ReportLibrary {
    dir: PathBuf,
    cache: HashMap<String, Option<String>>,
}

impl ReportLibrary {
    pub fn new(dir: &Path) -> ReportLibrary {
        ReportLibrary {
            dir: dir.to_path_buf(),
            cache: HashMap::new(),
        }
    }

    pub fn lookup(&mut self, name: Option<&str>) -> ReportLookup {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n,
            _ => return ReportLookup::NoReport,
        };
        if !self.cache.contains_key(name) {
            let path = self.dir.join(format!("{}.json", name));
            let loaded = match read_report(&path) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Report {:?} could not be loaded: {}", name, e);
                    None
                }
            };
            self.cache.insert(name.to_string(), loaded);
        }
        match self.cache.get(name).cloned().flatten() {
            Some(text) => ReportLookup::Loaded {
                name: name.to_string(),
                text,
            },
            None => ReportLookup::NotFound(name.to_string()),
        }
    }
}

fn read_report(path: &Path) -> ReviewResult<String> {
    let path_s = path.display().to_string();
    info!("Attempting to read report {:?}", path_s);
    let contents = fs::read_to_string(path).context(OpeningFileSnafu {
        path: path_s.clone(),
    })?;
    let report: ReportFile =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
            path: path_s.clone(),
        })?;
    if report.summary.is_empty() {
        whatever!("The summary of {} is empty", path_s);
    }
    Ok(report.summary)
}
