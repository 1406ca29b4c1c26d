// Display order of the region columns in the per-respondent tables.

use regex::Regex;

use crate::survey::*;

pub const DEFAULT_GROUP_PATTERN: &str = r"group_(\d+)";

pub fn group_pattern(pattern: Option<&str>) -> SurveyResult<Regex> {
    let pattern = pattern.unwrap_or(DEFAULT_GROUP_PATTERN);
    Regex::new(pattern).context(GroupPatternSnafu { pattern })
}

/// The number captured by the first group of the pattern, if any.
pub fn group_number(pattern: &Regex, region: &str) -> Option<u64> {
    pattern
        .captures(region)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

/// Returns the indexes of the regions sorted by group number.
///
/// Regions without a group number come last. Ties keep their catalog order.
pub fn column_order(regions: &[String], pattern: &Regex) -> Vec<usize> {
    let mut order: Vec<usize> = (0..regions.len()).collect();
    order.sort_by_key(|idx| match group_number(pattern, &regions[*idx]) {
        Some(n) => (0, n),
        None => (1, 0),
    });
    order
}
