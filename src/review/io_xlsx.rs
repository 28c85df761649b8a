use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::review::{
    io_common::{ColumnIndexes, ParsedRow},
    *,
};

pub fn read_xlsx_positions(path: &str, worksheet: Option<&str>) -> ReviewResult<Vec<ParsedRow>> {
    let wrange = get_range(path, worksheet)?;

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(cell_to_string)
        .collect();
    debug!("read_xlsx_positions: header: {:?}", header);
    let cols = ColumnIndexes::from_header(&header, path)?;

    let mut res: Vec<ParsedRow> = Vec::new();
    for (idx, cells) in iter.enumerate() {
        let row = cols.parse_row(|i| cells.get(i).map(cell_to_string));
        debug!("read_xlsx_positions: idx: {:?} row: {:?}", idx, row);
        res.push(row);
    }
    Ok(res)
}

fn get_range(path: &str, worksheet: Option<&str>) -> ReviewResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        // A worksheet name was provided, use it.
        Some(sheet) => workbook
            .worksheet_range(sheet)
            .context(MissingWorksheetSnafu { path, sheet })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    Ok(wrange)
}

// Numbers are written without a trailing ".0" when they are whole, so that
// report names made of digits survive the round trip through Excel.
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => String::new(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        x => {
            warn!("cell_to_string: unexpected cell {:?}, treated as empty", x);
            String::new()
        }
    }
}
