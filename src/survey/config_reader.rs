use crate::survey::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "summaryFile")]
    pub summary_file: Option<String>,
    #[serde(rename = "columnGroupPattern")]
    pub column_group_pattern: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub survey: String,
    pub respondents: u64,
    pub regions: usize,
    pub cancellation: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "idColumn")]
    pub id_column: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            id_column: None,
            excel_worksheet_name: None,
        }
    }

    pub fn id_column(&self) -> &str {
        self.id_column.as_deref().unwrap_or(DEFAULT_ID_COLUMN)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyRules {
    pub cancellation: Option<String>,
    #[serde(rename = "negativeNone")]
    pub negative_none: Option<String>,
}

impl SurveyRules {
    pub fn cancellation_mode(&self) -> SurveyResult<CancellationMode> {
        match self.cancellation.as_deref() {
            None | Some("offsetBoth") => Ok(CancellationMode::OffsetBoth),
            Some("disabled") => Ok(CancellationMode::Disabled),
            Some(x) => whatever!("unknown cancellation rule: {}", x),
        }
    }

    pub fn negative_none_policy(&self) -> SurveyResult<NegativeNonePolicy> {
        match self.negative_none.as_deref() {
            None | Some("warn") => Ok(NegativeNonePolicy::Warn),
            Some("fail") => Ok(NegativeNonePolicy::Fail),
            Some(x) => whatever!("unknown negativeNone rule: {}", x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "boundarySource")]
    pub boundary_source: Option<FileSource>,
    #[serde(rename = "respondentSources", default)]
    pub respondent_sources: Vec<FileSource>,
    #[serde(default)]
    pub rules: SurveyRules,
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js["results"]);
    Ok(js)
}
