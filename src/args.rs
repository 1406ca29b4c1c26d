use clap::Parser;

/// This is a tabulation program for map surveys with like and dislike marks.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the survey: sources, rules and outputs.
    /// For more information about the file format, read the manual of the area_tally crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The file containing the boundary points of the regions (columns name, x, y).
    /// Setting this option overrides the boundary source that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub boundary: Option<String>,

    /// (file path) The file containing the answers of the respondents.
    /// Setting this option overrides the respondent sources that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input files: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default "Respondent ID") The name of the column holding the respondent identifier.
    #[clap(long, value_parser)]
    pub id_column: Option<String>,

    /// When using an Excel file with several worksheets, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (directory, optional) If specified, the output tables are written in CSV format to this directory.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey will be written in JSON format
    /// to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference file containing the summary of a survey in JSON format. If provided, areatally will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (regular expression) The pattern extracting the group number used to order the region columns.
    /// The first capture group must match digits.
    #[clap(long, value_parser)]
    pub group_pattern: Option<String>,

    /// If passed as an argument, likes and dislikes in the same region are both counted.
    #[clap(long, takes_value = false)]
    pub no_cancellation: bool,

    /// If passed as an argument, the run fails when a region has more likes and dislikes than respondents.
    #[clap(long, takes_value = false)]
    pub fail_on_negative_none: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
