use std::collections::HashMap;

use crate::review::*;

pub const SPEAKER_COLUMN: &str = "speaker";
pub const REPORT_COLUMN: &str = "report";

// Cell values that spreadsheet exports use for missing data.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A row of the positions table, as parsed by the readers.
/// This is before dropping the rows without speaker.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ParsedRow {
    pub speaker: Option<String>,
    pub report: Option<String>,
    pub issue: Option<String>,
    pub position: Option<String>,
    pub argument: Option<String>,
    pub proposal: Option<String>,
}

/// Where each known column sits in the table. Only the speaker column is mandatory.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndexes {
    pub speaker: usize,
    pub report: Option<usize>,
    pub summaries: Vec<(SummaryField, usize)>,
}

impl ColumnIndexes {
    pub fn from_header(header: &[String], path: &str) -> ReviewResult<ColumnIndexes> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        let speaker = find(SPEAKER_COLUMN).context(MissingColumnSnafu {
            path,
            column: SPEAKER_COLUMN,
        })?;
        let report = find(REPORT_COLUMN);
        let mut summaries: Vec<(SummaryField, usize)> = Vec::new();
        for field in SummaryField::ALL {
            match find(field.column()) {
                Some(idx) => summaries.push((field, idx)),
                None => warn!("{}: no column {:?}, treated as empty", path, field.column()),
            }
        }
        Ok(ColumnIndexes {
            speaker,
            report,
            summaries,
        })
    }

    /// Builds a row from a cell accessor. Missing cells are treated as empty.
    pub fn parse_row<F>(&self, cell: F) -> ParsedRow
    where
        F: Fn(usize) -> Option<String>,
    {
        let get = |idx: usize| cell(idx).and_then(|s| clean_cell(&s));
        let mut row = ParsedRow {
            speaker: get(self.speaker),
            report: self.report.and_then(&get),
            ..Default::default()
        };
        for (field, idx) in self.summaries.iter() {
            let value = get(*idx);
            match field {
                SummaryField::Issue => row.issue = value,
                SummaryField::Position => row.position = value,
                SummaryField::Argument => row.argument = value,
                SummaryField::Proposal => row.proposal = value,
            }
        }
        row
    }
}

/// Returns None for empty cells and missing-data markers.
pub fn clean_cell(s: &str) -> Option<String> {
    if MISSING_MARKERS.contains(&s.trim()) {
        None
    } else {
        Some(s.to_string())
    }
}

/// Drops the rows without speaker, numbers the remaining ones and names
/// the interventions of the speakers that talk more than once.
pub fn assemble_entries(rows: Vec<ParsedRow>) -> Vec<ReviewEntry> {
    let with_speaker: Vec<(String, ParsedRow)> = rows
        .into_iter()
        .filter_map(|r| r.speaker.clone().map(|s| (s, r)))
        .collect();

    let mut totals: HashMap<String, usize> = HashMap::new();
    for (speaker, _) in with_speaker.iter() {
        *totals.entry(speaker.clone()).or_insert(0) += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<ReviewEntry> = Vec::new();
    for (index, (speaker, row)) in with_speaker.into_iter().enumerate() {
        let count = seen.entry(speaker.clone()).or_insert(0);
        *count += 1;
        let display_name = if totals.get(&speaker).cloned().unwrap_or(0) > 1 {
            format!("{} (Intervention {})", speaker, count)
        } else {
            speaker.clone()
        };
        res.push(ReviewEntry {
            index,
            speaker,
            display_name,
            report: row.report,
            issue: row.issue,
            position: row.position,
            argument: row.argument,
            proposal: row.proposal,
        });
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(speaker: Option<&str>) -> ParsedRow {
        ParsedRow {
            speaker: speaker.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_markers_are_empty() {
        assert_eq!(clean_cell(""), None);
        assert_eq!(clean_cell("  "), None);
        assert_eq!(clean_cell("nan"), None);
        assert_eq!(clean_cell("NaN"), None);
        assert_eq!(clean_cell("Nancy"), Some("Nancy".to_string()));
    }

    #[test]
    fn repeated_speakers_get_intervention_numbers() {
        let rows = vec![
            row(Some("Ann")),
            row(None),
            row(Some("Bob")),
            row(Some("Ann")),
        ];
        let entries = assemble_entries(rows);
        let names: Vec<(usize, &str)> = entries
            .iter()
            .map(|e| (e.index, e.display_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "Ann (Intervention 1)"),
                (1, "Bob"),
                (2, "Ann (Intervention 2)")
            ]
        );
        assert_eq!(entries[2].speaker, "Ann");
    }

    #[test]
    fn header_lookup() {
        let header: Vec<String> = ["report", " speaker ", "argSum", "issueSum"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cols = ColumnIndexes::from_header(&header, "t.csv").unwrap();
        assert_eq!(cols.speaker, 1);
        assert_eq!(cols.report, Some(0));
        assert_eq!(
            cols.summaries,
            vec![(SummaryField::Issue, 3), (SummaryField::Argument, 2)]
        );

        let cells = ["r7", "Ann", "", "Housing"];
        let parsed = cols.parse_row(|i| cells.get(i).map(|s| s.to_string()));
        assert_eq!(parsed.speaker.as_deref(), Some("Ann"));
        assert_eq!(parsed.report.as_deref(), Some("r7"));
        assert_eq!(parsed.issue.as_deref(), Some("Housing"));
        assert_eq!(parsed.argument, None);
        assert_eq!(parsed.position, None);

        let no_speaker: Vec<String> = vec!["report".to_string()];
        assert!(matches!(
            ColumnIndexes::from_header(&no_speaker, "t.csv"),
            Err(ReviewError::MissingColumn { .. })
        ));
    }
}
