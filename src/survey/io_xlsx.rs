use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::survey::{config_reader::FileSource, io_common::RawTable, *};

pub fn read_xlsx_table(path: &str, cfs: &FileSource) -> SurveyResult<RawTable> {
    let wrange = get_range(path, cfs)?;

    let mut iter = wrange.rows();
    let header: Vec<String> = match iter.next() {
        Some(row) => row
            .iter()
            .enumerate()
            .map(|(col, c)| read_cell(path, 1, col, c))
            .collect(),
        None => return EmptyExcelSnafu { path }.fail(),
    };
    debug!("read_xlsx_table: {}: header: {:?}", path, header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, c)| read_cell(path, lineno, col, c))
            .collect();
        rows.push(cells);
    }
    info!("read_xlsx_table: {}: {} rows", path, rows.len());
    Ok(RawTable {
        path: path.to_string(),
        header,
        rows,
    })
}

/// The text of a cell. Whether the text is a valid value is decided by the column parsers.
fn read_cell(path: &str, lineno: usize, col: usize, cell: &DataType) -> String {
    match cell {
        DataType::Empty => "".to_string(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => f.to_string(),
        other => {
            debug!(
                "read_cell: {}:{}: column #{}: non-numeric cell {:?}",
                path,
                lineno,
                col + 1,
                other
            );
            other.to_string()
        }
    }
}

fn get_range(path: &str, cfs: &FileSource) -> SurveyResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &cfs.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = cfs.excel_worksheet_name.as_deref() {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu {
                path,
                names: all_worksheets
                    .iter()
                    .map(|(n, _)| n.clone())
                    .collect::<Vec<String>>(),
            }
            .fail(),
        }
    }
}
