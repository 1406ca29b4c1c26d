// Writers for the output tables.

use std::path::Path;

use crate::survey::{io_common::*, *};

pub const SUMMARY_FILE: &str = "area_summary.csv";
pub const COUNT_FILE: &str = "area_count.csv";
pub const COUNT_AFTER_FILE: &str = "area_count_after.csv";
pub const DIFF_FILE: &str = "area_count_diff.csv";
pub const SURVIVING_FILE: &str = "surviving_points.csv";

fn writer(path: &Path) -> SurveyResult<csv::Writer<fs::File>> {
    let p = path.display().to_string();
    debug!("writer: opening {}", p);
    csv::Writer::from_path(path).context(CsvWriteSnafu { path: p })
}

fn write_record<I, S>(wtr: &mut csv::Writer<fs::File>, path: &Path, record: I) -> SurveyResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    wtr.write_record(record).context(CsvWriteSnafu {
        path: path.display().to_string(),
    })
}

fn flush(wtr: &mut csv::Writer<fs::File>, path: &Path) -> SurveyResult<()> {
    wtr.flush().context(OpeningFileSnafu {
        path: path.display().to_string(),
    })
}

pub fn write_region_totals(path: &Path, totals: &[RegionTotals]) -> SurveyResult<()> {
    let mut wtr = writer(path)?;
    write_record(
        &mut wtr,
        path,
        [
            "",
            "like",
            "dislike",
            "none",
            "total",
            "like_ratio",
            "dislike_ratio",
            "none_ratio",
        ],
    )?;
    for t in totals.iter() {
        write_record(
            &mut wtr,
            path,
            [
                t.name.clone(),
                t.like.to_string(),
                t.dislike.to_string(),
                t.none.to_string(),
                t.total.to_string(),
                t.like_ratio.to_string(),
                t.dislike_ratio.to_string(),
                t.none_ratio.to_string(),
            ],
        )?;
    }
    flush(&mut wtr, path)
}

/// Writes a per-respondent table with a Like and a Dislike column per region.
///
/// order: the display order of the regions, as indexes into `table.regions`.
pub fn write_respondent_table<C, F>(
    path: &Path,
    table: &RespondentTable<C>,
    order: &[usize],
    values: F,
) -> SurveyResult<()>
where
    F: Fn(&C) -> (String, String),
{
    let mut wtr = writer(path)?;
    let mut header: Vec<String> = vec![DEFAULT_ID_COLUMN.to_string()];
    for idx in order.iter() {
        header.push(format!("{}_Like", table.regions[*idx]));
        header.push(format!("{}_Dislike", table.regions[*idx]));
    }
    write_record(&mut wtr, path, &header)?;

    for row in table.rows.iter() {
        let mut record: Vec<String> = vec![row.respondent.to_string()];
        for idx in order.iter() {
            let (like, dislike) = values(&row.cells[*idx]);
            record.push(like);
            record.push(dislike);
        }
        write_record(&mut wtr, path, &record)?;
    }
    flush(&mut wtr, path)
}

pub fn write_counts(path: &Path, table: &RespondentTable<RoleCounts>, order: &[usize]) -> SurveyResult<()> {
    write_respondent_table(path, table, order, |c| (c.like.to_string(), c.dislike.to_string()))
}

pub fn write_diff(path: &Path, table: &RespondentTable<RoleDelta>, order: &[usize]) -> SurveyResult<()> {
    write_respondent_table(path, table, order, |c| (c.like.to_string(), c.dislike.to_string()))
}

pub fn write_surviving_points(path: &Path, points: &[SurvivingPoints]) -> SurveyResult<()> {
    let mut wtr = writer(path)?;
    let mut header: Vec<&str> = vec![DEFAULT_ID_COLUMN];
    for (x, y) in LIKE_COLUMNS.iter().chain(DISLIKE_COLUMNS.iter()) {
        header.push(x);
        header.push(y);
    }
    write_record(&mut wtr, path, &header)?;

    for sp in points.iter() {
        let mut record: Vec<String> = vec![sp.respondent.to_string()];
        for p in sp.likes.iter().chain(sp.dislikes.iter()) {
            match p {
                Some(p) => {
                    record.push(p.x.to_string());
                    record.push(p.y.to_string());
                }
                None => {
                    record.push("".to_string());
                    record.push("".to_string());
                }
            }
        }
        write_record(&mut wtr, path, &record)?;
    }
    flush(&mut wtr, path)
}

/// Writes all the tables to the given directory.
pub fn write_all(dir: &Path, res: &AreaResult, order: &[usize]) -> SurveyResult<()> {
    fs::create_dir_all(dir).context(OpeningFileSnafu {
        path: dir.display().to_string(),
    })?;
    write_region_totals(&dir.join(SUMMARY_FILE), &res.region_totals)?;
    write_counts(&dir.join(COUNT_FILE), &res.raw_counts, order)?;
    write_counts(&dir.join(COUNT_AFTER_FILE), &res.adjusted_counts, order)?;
    write_diff(&dir.join(DIFF_FILE), &res.diff, order)?;
    write_surviving_points(&dir.join(SURVIVING_FILE), &res.surviving_points)?;
    info!("write_all: tables written to {}", dir.display());
    Ok(())
}
