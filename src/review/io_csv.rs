// Primitives for reading CSV files.

use crate::review::{
    io_common::{ColumnIndexes, ParsedRow},
    *,
};

pub fn read_csv_positions(path: &str) -> ReviewResult<Vec<ParsedRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_positions: header: {:?}", header);
    let cols = ColumnIndexes::from_header(&header, path)?;

    let mut res: Vec<ParsedRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let row = cols.parse_row(|i| line.get(i).map(|s| s.to_string()));
        debug!("read_csv_positions: lineno: {:?} row: {:?}", lineno, row);
        res.push(row);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.csv");
        fs::write(
            &path,
            "id,speaker,report,issueSum,positionSum,argSum,propSum\n\
             1,Jane Doe,plenary_01,\"Taxes, mostly\",Against,nan,\n\
             2,,plenary_01,x,y,z,w\n\
             3,John Smith\n",
        )
        .unwrap();
        let rows = read_csv_positions(path.to_str().unwrap()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].speaker.as_deref(), Some("Jane Doe"));
        assert_eq!(rows[0].report.as_deref(), Some("plenary_01"));
        assert_eq!(rows[0].issue.as_deref(), Some("Taxes, mostly"));
        assert_eq!(rows[0].position.as_deref(), Some("Against"));
        assert_eq!(rows[0].argument, None);
        assert_eq!(rows[0].proposal, None);
        assert_eq!(rows[1].speaker, None);
        // Short rows are accepted, the missing cells are empty.
        assert_eq!(rows[2].speaker.as_deref(), Some("John Smith"));
        assert_eq!(rows[2].report, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let res = read_csv_positions("/nonexistent/positions.csv");
        assert!(matches!(res, Err(ReviewError::OpeningCsv { .. })));
    }
}
