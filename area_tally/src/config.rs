// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Number of coordinate slots per role on a questionnaire.
pub const SLOTS_PER_ROLE: usize = 2;

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    /// Assembles a point out of two cells that may be empty.
    ///
    /// A pair with a missing (or NaN) component is treated as absent.
    pub fn from_pair(x: Option<f64>, y: Option<f64>) -> Option<Point> {
        match (x, y) {
            (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some(Point { x, y }),
            _ => None,
        }
    }
}

/// One vertex of a region boundary, in the order of the boundary file.
#[derive(PartialEq, Debug, Clone)]
pub struct BoundaryPoint {
    pub region: String,
    pub x: f64,
    pub y: f64,
}

/// The two kinds of marks a respondent can place on the map.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Role {
    Like,
    Dislike,
}

/// The marks placed by one respondent.
///
/// The identifier is optional. Respondents without one are identified by
/// their position in the input.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Respondent {
    pub id: Option<u64>,
    pub likes: [Option<Point>; SLOTS_PER_ROLE],
    pub dislikes: [Option<Point>; SLOTS_PER_ROLE],
}

impl Respondent {
    pub fn slots(&self, role: Role) -> &[Option<Point>; SLOTS_PER_ROLE] {
        match role {
            Role::Like => &self.likes,
            Role::Dislike => &self.dislikes,
        }
    }
}

// ******** Output data structures *********

/// Like and dislike counts of one respondent (or all respondents) in one region.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct RoleCounts {
    pub like: u64,
    pub dislike: u64,
}

impl RoleCounts {
    pub const EMPTY: RoleCounts = RoleCounts {
        like: 0,
        dislike: 0,
    };

    pub fn get(&self, role: Role) -> u64 {
        match role {
            Role::Like => self.like,
            Role::Dislike => self.dislike,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.like == 0 && self.dislike == 0
    }
}

/// Adjusted minus raw counts. Both fields are never positive.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct RoleDelta {
    pub like: i64,
    pub dislike: i64,
}

impl RoleDelta {
    pub fn between(raw: RoleCounts, adjusted: RoleCounts) -> RoleDelta {
        RoleDelta {
            like: adjusted.like as i64 - raw.like as i64,
            dislike: adjusted.dislike as i64 - raw.dislike as i64,
        }
    }
}

/// Statistics for one region, after cancellation.
#[derive(PartialEq, Debug, Clone)]
pub struct RegionTotals {
    pub name: String,
    pub like: u64,
    pub dislike: u64,
    /// Respondents that did not count towards this region. Signed: two likes of
    /// the same respondent in one region can push it below zero.
    pub none: i64,
    /// The number of respondents in the survey, the same for all the regions.
    pub total: u64,
    pub like_ratio: f64,
    pub dislike_ratio: f64,
    pub none_ratio: f64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RespondentRow<C> {
    pub respondent: u64,
    /// One cell per region, aligned with `RespondentTable::regions`.
    pub cells: Vec<C>,
}

/// A wide table with one row per respondent and one cell per region.
///
/// Rows are sorted by respondent id, then by input position. Regions follow the order of the catalog.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RespondentTable<C> {
    pub regions: Vec<String>,
    pub rows: Vec<RespondentRow<C>>,
}

impl<C: Copy> RespondentTable<C> {
    pub fn cell(&self, respondent: u64, region: &str) -> Option<C> {
        let col = self.regions.iter().position(|r| r == region)?;
        self.rows
            .iter()
            .find(|row| row.respondent == respondent)
            .and_then(|row| row.cells.get(col).copied())
    }
}

/// The coordinates of one respondent that survive cancellation.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SurvivingPoints {
    pub respondent: u64,
    pub likes: [Option<Point>; SLOTS_PER_ROLE],
    pub dislikes: [Option<Point>; SLOTS_PER_ROLE],
}

#[derive(PartialEq, Debug, Clone)]
pub struct AreaResult {
    pub total_respondents: u64,
    /// In catalog order.
    pub region_totals: Vec<RegionTotals>,
    pub raw_counts: RespondentTable<RoleCounts>,
    pub adjusted_counts: RespondentTable<RoleCounts>,
    pub diff: RespondentTable<RoleDelta>,
    /// Sorted by respondent id.
    pub surviving_points: Vec<SurvivingPoints>,
}

/// Errors that prevent the tally from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AreaErrors {
    /// A region is described by fewer than 3 boundary points.
    InvalidRegion { name: String, num_points: usize },
    /// A respondent has no identifier. Recovered by using the row position.
    MissingField { row: usize },
    /// More marks than slots were given for one role.
    TooManyMarks { role: Role, count: usize },
    /// The like and dislike totals of a region exceed the number of respondents.
    NegativeNone { region: String, none: i64 },
}

impl Error for AreaErrors {}

impl Display for AreaErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AreaErrors::InvalidRegion { name, num_points } => write!(
                f,
                "region {:?} has {} boundary points, at least 3 are required",
                name, num_points
            ),
            AreaErrors::MissingField { row } => {
                write!(f, "respondent at row {} has no identifier", row)
            }
            AreaErrors::TooManyMarks { role, count } => write!(
                f,
                "{} {:?} marks given, at most {} are allowed",
                count, role, SLOTS_PER_ROLE
            ),
            AreaErrors::NegativeNone { region, none } => write!(
                f,
                "region {:?}: likes and dislikes exceed the number of respondents (none = {})",
                region, none
            ),
        }
    }
}

// ********* Configuration **********

/// What happens to a respondent who both likes and dislikes the same region.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CancellationMode {
    /// The like and the dislike marks offset each other: neither is counted.
    OffsetBoth,
    /// No cancellation. The adjusted tables are identical to the raw ones.
    Disabled,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum NegativeNonePolicy {
    Warn,
    Fail,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub cancellation: CancellationMode,
    pub negative_none: NegativeNonePolicy,
}

impl TallyRules {
    pub const DEFAULT_RULES: TallyRules = TallyRules {
        cancellation: CancellationMode::OffsetBoth,
        negative_none: NegativeNonePolicy::Warn,
    };
}

impl Default for TallyRules {
    fn default() -> Self {
        TallyRules::DEFAULT_RULES
    }
}
