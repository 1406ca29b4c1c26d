use log::{debug, info, warn};

use area_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod columns;
pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_output;
pub mod io_xlsx;

use crate::survey::columns::*;
use crate::survey::config_reader::*;
use crate::survey::io_common::*;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet with data found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display(
        "Several worksheets found in {path}: {names:?}, use excelWorksheetName to pick one"
    ))]
    AmbiguousWorksheet { path: String, names: Vec<String> },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading {path} at line {lineno}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Missing column {column:?} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("{path}:{lineno}: column {column}: cannot understand value {content:?}"))]
    WrongValue {
        path: String,
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Invalid column group pattern {pattern:?}"))]
    GroupPattern {
        source: regex::Error,
        pattern: String,
    },
    #[snafu(display("Tally failed: {source}"))]
    Tally { source: AreaErrors },
    #[snafu(display("Difference detected between the calculated summary and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

const STDOUT: &str = "stdout";
const SUMMARY_JSON: &str = "summary.json";

fn provider_for(path: &str, explicit: Option<&str>) -> String {
    match explicit {
        Some(p) => p.to_string(),
        None => match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("xlsx") => "xlsx".to_string(),
            _ => "csv".to_string(),
        },
    }
}

fn resolve(root: &Path, file_path: &str) -> String {
    root.join(file_path).display().to_string()
}

/// Loads the configuration file, if any, and applies the command line on top of it.
///
/// The paths of the configuration file are relative to its directory. The paths
/// of the command line are used as given.
fn effective_config(args: &Args) -> SurveyResult<SurveyConfig> {
    let mut config = match args.config.as_deref() {
        Some(config_path) => {
            let mut config = read_config(config_path)?;
            let root: PathBuf = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            debug!("effective_config: root directory: {:?}", root);
            if let Some(b) = config.boundary_source.as_mut() {
                b.file_path = resolve(&root, &b.file_path);
            }
            for cfs in config.respondent_sources.iter_mut() {
                cfs.file_path = resolve(&root, &cfs.file_path);
            }
            let os = &mut config.output_settings;
            os.output_directory = os.output_directory.as_deref().map(|d| resolve(&root, d));
            os.summary_file = match os.summary_file.as_deref() {
                Some(STDOUT) => Some(STDOUT.to_string()),
                Some(p) => Some(resolve(&root, p)),
                None => None,
            };
            config
        }
        None => SurveyConfig::default(),
    };

    if let Some(b) = args.boundary.as_deref() {
        config.boundary_source = Some(FileSource::new(&provider_for(b, None), b));
    }
    if let Some(i) = args.input.as_deref() {
        let provider = provider_for(i, args.input_type.as_deref());
        config.respondent_sources = vec![FileSource::new(&provider, i)];
    }
    for cfs in config.respondent_sources.iter_mut() {
        if args.id_column.is_some() {
            cfs.id_column = args.id_column.clone();
        }
        if args.excel_worksheet_name.is_some() {
            cfs.excel_worksheet_name = args.excel_worksheet_name.clone();
        }
    }

    let os = &mut config.output_settings;
    if args.out.is_some() {
        os.output_directory = args.out.clone();
    }
    if args.summary.is_some() {
        os.summary_file = args.summary.clone();
    }
    if args.group_pattern.is_some() {
        os.column_group_pattern = args.group_pattern.clone();
    }
    if args.no_cancellation {
        config.rules.cancellation = Some("disabled".to_string());
    }
    if args.fail_on_negative_none {
        config.rules.negative_none = Some("fail".to_string());
    }
    Ok(config)
}

fn validate_rules(rules: &SurveyRules) -> SurveyResult<TallyRules> {
    Ok(TallyRules {
        cancellation: rules.cancellation_mode()?,
        negative_none: rules.negative_none_policy()?,
    })
}

fn read_table(cfs: &FileSource) -> SurveyResult<RawTable> {
    info!("Attempting to read file {:?}", cfs.file_path);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_table(&cfs.file_path),
        "xlsx" => io_xlsx::read_xlsx_table(&cfs.file_path, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn survey_name(config: &SurveyConfig) -> String {
    match config.output_settings.survey_name.as_ref() {
        Some(n) => n.clone(),
        None => config
            .respondent_sources
            .first()
            .map(|cfs| simplify_file_name(&cfs.file_path))
            .unwrap_or_default(),
    }
}

fn build_summary_js(config: &OutputConfig, res: &AreaResult) -> JSValue {
    let regions: Vec<JSValue> = res
        .region_totals
        .iter()
        .map(|t| {
            json!({
                "region": t.name,
                "like": t.like,
                "dislike": t.dislike,
                "none": t.none,
                "total": t.total,
                "likeRatio": t.like_ratio,
                "dislikeRatio": t.dislike_ratio,
                "noneRatio": t.none_ratio,
            })
        })
        .collect();
    json!({
        "config": config,
        "results": regions })
}

fn log_region_totals(res: &AreaResult) {
    for t in res.region_totals.iter() {
        info!(
            "Region {}: like {} ({:.1}%), dislike {} ({:.1}%), none {} ({:.1}%)",
            t.name,
            t.like,
            100.0 * t.like_ratio,
            t.dislike,
            100.0 * t.dislike_ratio,
            t.none,
            100.0 * t.none_ratio
        );
    }
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> SurveyResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The summary matches the reference {}", reference_path);
    Ok(())
}

pub fn run_survey(args: &Args) -> SurveyResult<AreaResult> {
    let config = effective_config(args)?;
    info!("config: {:?}", config);

    let rules = validate_rules(&config.rules)?;
    let pattern = group_pattern(config.output_settings.column_group_pattern.as_deref())?;

    let boundary_source = match config.boundary_source.as_ref() {
        Some(b) => b,
        None => whatever!("No boundary file: use --boundary or boundarySource in the configuration"),
    };
    if config.respondent_sources.is_empty() {
        whatever!("No respondent file: use --input or respondentSources in the configuration")
    }

    let boundary = parse_boundary(&read_table(boundary_source)?)?;
    let mut respondents: Vec<Respondent> = Vec::new();
    for cfs in config.respondent_sources.iter() {
        let mut file_data = parse_respondents(&read_table(cfs)?, cfs.id_column())?;
        respondents.append(&mut file_data);
    }
    info!(
        "run_survey: {} boundary points, {} respondents",
        boundary.len(),
        respondents.len()
    );

    let result = run_area_stats(&boundary, &respondents, &rules).context(TallySnafu {})?;
    log_region_totals(&result);

    let output_directory = config.output_settings.output_directory.as_deref();
    if let Some(dir) = output_directory {
        let order = column_order(&result.raw_counts.regions, &pattern);
        debug!("run_survey: column order: {:?}", order);
        io_output::write_all(Path::new(dir), &result, &order)?;
    }

    let c = OutputConfig {
        survey: survey_name(&config),
        respondents: result.total_respondents,
        regions: result.region_totals.len(),
        cancellation: config
            .rules
            .cancellation
            .clone()
            .unwrap_or_else(|| "offsetBoth".to_string()),
    };
    let result_js = build_summary_js(&c, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let summary_path: Option<String> = match config.output_settings.summary_file.as_deref() {
        Some(STDOUT) | Some("") => None,
        Some(p) => Some(p.to_string()),
        None => output_directory.map(|d| resolve(Path::new(d), SUMMARY_JSON)),
    };
    match summary_path {
        Some(p) => {
            info!("Writing summary to {}", p);
            if let Some(parent) = Path::new(&p).parent() {
                fs::create_dir_all(parent).context(OpeningFileSnafu {
                    path: parent.display().to_string(),
                })?;
            }
            fs::write(&p, pretty_js_stats.as_bytes()).context(OpeningFileSnafu { path: &p })?;
        }
        None => println!("{}", pretty_js_stats),
    }

    if let Some(reference_path) = args.reference.as_deref() {
        check_reference(reference_path, &pretty_js_stats)?;
    }

    Ok(result)
}
