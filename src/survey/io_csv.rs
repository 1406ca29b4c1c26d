// Primitives for reading CSV files.

use crate::survey::{io_common::RawTable, *};

pub fn read_csv_table(path: &str) -> SurveyResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<String> = rdr
        .headers()
        .context(CsvOpenSnafu { path })?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            // Files saved by spreadsheet programs may start with a byte order mark.
            if idx == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    debug!("read_csv_table: {}: header: {:?}", path, header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is on the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    info!("read_csv_table: {}: {} rows", path, rows.len());
    Ok(RawTable {
        path: path.to_string(),
        header,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_with_bom_and_short_lines() {
        let dir = std::env::temp_dir().join(format!("areatally_io_csv_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join("points.csv");
        fs::write(&p, "\u{feff}name,x,y\na,0,0\nb,1\n").unwrap();

        let t = read_csv_table(p.to_str().unwrap()).unwrap();
        assert_eq!(t.header, vec!["name", "x", "y"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1], vec!["b", "1"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_table("/nonexistent/areatally/points.csv"),
            Err(SurveyError::CsvOpen { .. })
        ));
    }
}
