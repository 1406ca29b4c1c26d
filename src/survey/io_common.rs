// Primitives shared by the readers: the layout of the input tables and the parsing of cells.

use std::path::Path;

use crate::survey::*;

pub const DEFAULT_ID_COLUMN: &str = "Respondent ID";

/// The columns of the like marks, as (x, y) per slot.
pub const LIKE_COLUMNS: [(&str, &str); SLOTS_PER_ROLE] =
    [("like1_x", "like1_y"), ("like2_x", "like2_y")];
/// The columns of the dislike marks, as (x, y) per slot.
pub const DISLIKE_COLUMNS: [(&str, &str); SLOTS_PER_ROLE] =
    [("Dislike1_x", "Dislike1_y"), ("Dislike2_x", "Dislike2_y")];

/// The contents of a file, with all the cells read as text.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub path: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    fn required_column(&self, name: &str) -> SurveyResult<usize> {
        self.column(name).context(MissingColumnSnafu {
            column: name,
            path: self.path.clone(),
        })
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

// The header is on the first line.
fn lineno(idx: usize) -> usize {
    idx + 2
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
}

/// Reads a coordinate. Empty and unreadable cells are missing values.
fn parse_coordinate(path: &str, lineno: usize, column: &str, s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() => Some(x),
        _ => {
            warn!(
                "parse_coordinate: {}:{}: column {}: {:?} is not a number, treated as missing",
                path, lineno, column, s
            );
            None
        }
    }
}

fn parse_id(path: &str, lineno: usize, column: &str, s: &str) -> SurveyResult<Option<u64>> {
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(id) = s.parse::<u64>() {
        return Ok(Some(id));
    }
    // Spreadsheets often store integers as floats.
    match s.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
        _ => WrongValueSnafu {
            path,
            lineno,
            column,
            content: s,
        }
        .fail(),
    }
}

pub fn parse_boundary(table: &RawTable) -> SurveyResult<Vec<BoundaryPoint>> {
    let name_idx = table.required_column("name")?;
    let x_idx = table.required_column("x")?;
    let y_idx = table.required_column("y")?;

    let mut res: Vec<BoundaryPoint> = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let lineno = lineno(idx);
        let name = cell(row, Some(name_idx));
        if name.is_empty() && row.iter().all(|c| c.trim().is_empty()) {
            debug!("parse_boundary: {}:{}: skipping empty line", table.path, lineno);
            continue;
        }
        if name.is_empty() {
            return WrongValueSnafu {
                path: table.path.clone(),
                lineno,
                column: "name",
                content: name,
            }
            .fail();
        }
        let coord = |col_idx: usize, column: &str| -> SurveyResult<f64> {
            let s = cell(row, Some(col_idx));
            s.parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .context(WrongValueSnafu {
                    path: table.path.clone(),
                    lineno,
                    column,
                    content: s,
                })
        };
        let x = coord(x_idx, "x")?;
        let y = coord(y_idx, "y")?;
        res.push(BoundaryPoint {
            region: name.to_string(),
            x,
            y,
        });
    }
    debug!(
        "parse_boundary: {}: {} boundary points",
        table.path,
        res.len()
    );
    Ok(res)
}

/// Where the fields of a respondent are found in a table.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RespondentColumns {
    id: Option<usize>,
    likes: [(Option<usize>, Option<usize>); SLOTS_PER_ROLE],
    dislikes: [(Option<usize>, Option<usize>); SLOTS_PER_ROLE],
}

impl RespondentColumns {
    fn from_table(table: &RawTable, id_column: &str) -> RespondentColumns {
        let find = |name: &str| {
            let idx = table.column(name);
            if idx.is_none() {
                warn!(
                    "{}: no column {:?}, the corresponding values are treated as missing",
                    table.path, name
                );
            }
            idx
        };
        let id = table.column(id_column);
        if id.is_none() {
            info!(
                "{}: no column {:?}, respondents are identified by their row position",
                table.path, id_column
            );
        }
        let mut likes = [(None, None); SLOTS_PER_ROLE];
        let mut dislikes = [(None, None); SLOTS_PER_ROLE];
        for slot in 0..SLOTS_PER_ROLE {
            likes[slot] = (find(LIKE_COLUMNS[slot].0), find(LIKE_COLUMNS[slot].1));
            dislikes[slot] = (find(DISLIKE_COLUMNS[slot].0), find(DISLIKE_COLUMNS[slot].1));
        }
        RespondentColumns {
            id,
            likes,
            dislikes,
        }
    }
}

pub fn parse_respondents(table: &RawTable, id_column: &str) -> SurveyResult<Vec<Respondent>> {
    let cols = RespondentColumns::from_table(table, id_column);
    debug!("parse_respondents: {}: columns: {:?}", table.path, cols);

    let mut res: Vec<Respondent> = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let lineno = lineno(idx);
        let id = parse_id(&table.path, lineno, id_column, cell(row, cols.id))?;

        let read_slots = |slots: &[(Option<usize>, Option<usize>); SLOTS_PER_ROLE],
                          names: &[(&str, &str); SLOTS_PER_ROLE]| {
            let mut points = [None; SLOTS_PER_ROLE];
            for slot in 0..SLOTS_PER_ROLE {
                let (x_idx, y_idx) = slots[slot];
                let (x_name, y_name) = names[slot];
                let x = parse_coordinate(&table.path, lineno, x_name, cell(row, x_idx));
                let y = parse_coordinate(&table.path, lineno, y_name, cell(row, y_idx));
                points[slot] = Point::from_pair(x, y);
            }
            points
        };

        let r = Respondent {
            id,
            likes: read_slots(&cols.likes, &LIKE_COLUMNS),
            dislikes: read_slots(&cols.dislikes, &DISLIKE_COLUMNS),
        };
        debug!("parse_respondents: {}:{}: {:?}", table.path, lineno, r);
        res.push(r);
    }
    Ok(res)
}
