mod config;
mod regions;

pub mod builder;
pub mod manual;

use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashSet};

pub use crate::config::*;
pub use crate::regions::*;

// **** Private structures ****

type RespondentId = u64;
/// Position of a respondent in the input. Repeated identifiers stay distinct rows.
type RowIndex = usize;

/// The region each slot of one respondent was classified into.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
struct Membership {
    likes: [Option<RegionId>; SLOTS_PER_ROLE],
    dislikes: [Option<RegionId>; SLOTS_PER_ROLE],
}

impl Membership {
    fn slots(&self, role: Role) -> &[Option<RegionId>; SLOTS_PER_ROLE] {
        match role {
            Role::Like => &self.likes,
            Role::Dislike => &self.dislikes,
        }
    }

    fn regions(&self, role: Role) -> BTreeSet<RegionId> {
        self.slots(role).iter().flatten().cloned().collect()
    }
}

#[derive(PartialEq, Debug, Clone)]
struct ScannedRespondent {
    id: RespondentId,
    membership: Membership,
}

/// Sparse like/dislike counts keyed by (respondent row, region).
///
/// Cells that are absent count as zero. Empty cells are never stored.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
struct Tally {
    cells: BTreeMap<(RowIndex, RegionId), RoleCounts>,
}

impl Tally {
    fn increment(&mut self, respondent: RowIndex, region: RegionId, role: Role) {
        let c = self
            .cells
            .entry((respondent, region))
            .or_insert(RoleCounts::EMPTY);
        match role {
            Role::Like => c.like += 1,
            Role::Dislike => c.dislike += 1,
        }
    }

    fn insert(&mut self, respondent: RowIndex, region: RegionId, counts: RoleCounts) {
        if !counts.is_empty() {
            self.cells.insert((respondent, region), counts);
        }
    }

    fn get(&self, respondent: RowIndex, region: RegionId) -> RoleCounts {
        self.cells
            .get(&(respondent, region))
            .cloned()
            .unwrap_or(RoleCounts::EMPTY)
    }

    fn iter(&self) -> impl Iterator<Item = (RowIndex, RegionId, RoleCounts)> + '_ {
        self.cells.iter().map(|((row, reg), c)| (*row, *reg, *c))
    }

    /// All the regions that have at least one non-empty cell.
    fn regions(&self) -> BTreeSet<RegionId> {
        self.cells.keys().map(|(_, reg)| *reg).collect()
    }
}

/// Runs the classification and the tally for the given boundary and respondents.
///
/// Arguments:
/// * `boundary` the vertices of all the regions, grouped by region name
/// * `respondents` the survey answers, in input order
/// * `rules` the rules that govern cancellation
pub fn run_area_stats(
    boundary: &[BoundaryPoint],
    respondents: &[Respondent],
    rules: &TallyRules,
) -> Result<AreaResult, AreaErrors> {
    let catalog = RegionCatalog::from_boundary_points(boundary)?;
    run_area_stats_with_catalog(&catalog, respondents, rules)
}

/// Same as [run_area_stats], with regions that were already built.
pub fn run_area_stats_with_catalog(
    catalog: &RegionCatalog,
    respondents: &[Respondent],
    rules: &TallyRules,
) -> Result<AreaResult, AreaErrors> {
    info!(
        "Processing {:?} respondents, {:?} regions, rules: {:?}",
        respondents.len(),
        catalog.len(),
        rules
    );
    for (rid, region) in catalog.iter() {
        info!("Region: {}: {}", rid.index() + 1, region.name());
    }

    let ids = resolve_ids(respondents);
    let (scanned, raw) = scan_respondents(catalog, respondents, &ids);
    debug!("run_area_stats: raw tally: {:?}", raw);

    let adjusted = adjust_tally(&raw, rules.cancellation);
    debug!("run_area_stats: adjusted tally: {:?}", adjusted);

    // Indexed by row.
    let cancelled: Vec<BTreeSet<RegionId>> = scanned
        .iter()
        .map(|sr| cancelled_regions(&sr.membership, rules.cancellation))
        .collect();
    for (row, reg, c) in raw.iter() {
        // Both granularities of the cancellation rule agree.
        debug_assert_eq!(
            cancelled[row].contains(&reg),
            cancel_cell(c, rules.cancellation).is_none(),
            "row {} region {:?}",
            row,
            reg
        );
    }

    let total_respondents = respondents.len() as u64;
    let region_totals = region_totals(catalog, &adjusted, total_respondents, rules)?;

    // Rows are presented by identifier, then by input position.
    let mut order: Vec<RowIndex> = (0..scanned.len()).collect();
    order.sort_by_key(|row| (ids[*row], *row));
    // The detail tables show every region that received at least one mark.
    let regions: Vec<RegionId> = raw.regions().into_iter().collect();
    let raw_counts = respondent_table(catalog, &order, &ids, &regions, &raw);
    let adjusted_counts = respondent_table(catalog, &order, &ids, &regions, &adjusted);
    let diff = diff_table(&raw_counts, &adjusted_counts);

    let surviving: Vec<SurvivingPoints> = order
        .iter()
        .map(|row| surviving_points(&scanned[*row], &respondents[*row], &cancelled[*row]))
        .collect();

    Ok(AreaResult {
        total_respondents,
        region_totals,
        raw_counts,
        adjusted_counts,
        diff,
        surviving_points: surviving,
    })
}

// ********* Respondent scanner **********

/// The identifier of each respondent, falling back to the row position.
///
/// Identifiers are only displayed. Repeated values are reported and both rows are counted.
fn resolve_ids(respondents: &[Respondent]) -> Vec<RespondentId> {
    let mut seen: HashSet<RespondentId> = HashSet::new();
    let mut ids: Vec<RespondentId> = Vec::new();
    let mut num_missing = 0;
    let mut num_repeated = 0;
    for (row, r) in respondents.iter().enumerate() {
        let id = match r.id {
            Some(id) => id,
            None => {
                debug!("resolve_ids: {}, using the row position", AreaErrors::MissingField { row });
                num_missing += 1;
                row as RespondentId
            }
        };
        if !seen.insert(id) {
            debug!("resolve_ids: row {}: identifier {} already seen", row, id);
            num_repeated += 1;
        }
        ids.push(id);
    }
    if num_missing > 0 {
        warn!(
            "resolve_ids: {} respondents out of {} have no identifier, using their row position",
            num_missing,
            respondents.len()
        );
    }
    if num_repeated > 0 {
        warn!(
            "resolve_ids: {} respondents share an identifier with an earlier row, all of them are counted",
            num_repeated
        );
    }
    ids
}

fn classify_slots(
    catalog: &RegionCatalog,
    slots: &[Option<Point>; SLOTS_PER_ROLE],
) -> [Option<RegionId>; SLOTS_PER_ROLE] {
    let mut res = [None; SLOTS_PER_ROLE];
    for (slot, p) in slots.iter().enumerate() {
        res[slot] = p.and_then(|p| catalog.classify(p));
    }
    res
}

fn scan_respondents(
    catalog: &RegionCatalog,
    respondents: &[Respondent],
    ids: &[RespondentId],
) -> (Vec<ScannedRespondent>, Tally) {
    let mut tally = Tally::default();
    let mut scanned: Vec<ScannedRespondent> = Vec::new();
    for (row, (r, id)) in respondents.iter().zip(ids.iter()).enumerate() {
        let membership = Membership {
            likes: classify_slots(catalog, &r.likes),
            dislikes: classify_slots(catalog, &r.dislikes),
        };
        debug!("scan_respondents: row {} respondent {}: {:?}", row, id, membership);
        for role in [Role::Like, Role::Dislike] {
            for region in membership.slots(role).iter().flatten() {
                tally.increment(row, *region, role);
            }
        }
        scanned.push(ScannedRespondent {
            id: *id,
            membership,
        });
    }
    (scanned, tally)
}

// ********* Cancellation **********

/// The count-level rule for one (respondent, region) cell.
///
/// Returns the counts that are kept, or None if nothing is left.
fn cancel_cell(raw: RoleCounts, mode: CancellationMode) -> Option<RoleCounts> {
    match mode {
        CancellationMode::Disabled if raw.is_empty() => None,
        CancellationMode::Disabled => Some(raw),
        CancellationMode::OffsetBoth => {
            if raw.like > 0 && raw.dislike > 0 {
                None
            } else if raw.like > 0 {
                Some(RoleCounts {
                    like: raw.like,
                    dislike: 0,
                })
            } else if raw.dislike > 0 {
                Some(RoleCounts {
                    like: 0,
                    dislike: raw.dislike,
                })
            } else {
                None
            }
        }
    }
}

fn adjust_tally(raw: &Tally, mode: CancellationMode) -> Tally {
    let mut adjusted = Tally::default();
    for (row, reg, c) in raw.iter() {
        match cancel_cell(c, mode) {
            Some(kept) => adjusted.insert(row, reg, kept),
            None => debug!("adjust_tally: row {} region {:?}: cancelled {:?}", row, reg, c),
        }
    }
    adjusted
}

/// The set-level rule: regions where the respondent placed both a like and a dislike.
fn cancelled_regions(membership: &Membership, mode: CancellationMode) -> BTreeSet<RegionId> {
    match mode {
        CancellationMode::Disabled => BTreeSet::new(),
        CancellationMode::OffsetBoth => {
            let liked = membership.regions(Role::Like);
            let disliked = membership.regions(Role::Dislike);
            liked.intersection(&disliked).cloned().collect()
        }
    }
}

/// Keeps the coordinates of the slots that landed in a region and were not cancelled.
fn surviving_points(
    scanned: &ScannedRespondent,
    respondent: &Respondent,
    cancelled: &BTreeSet<RegionId>,
) -> SurvivingPoints {
    let keep = |points: &[Option<Point>; SLOTS_PER_ROLE], regions: &[Option<RegionId>; SLOTS_PER_ROLE]| {
        let mut res = [None; SLOTS_PER_ROLE];
        for slot in 0..SLOTS_PER_ROLE {
            if let Some(reg) = regions[slot] {
                if !cancelled.contains(&reg) {
                    res[slot] = points[slot];
                }
            }
        }
        res
    };
    SurvivingPoints {
        respondent: scanned.id,
        likes: keep(&respondent.likes, &scanned.membership.likes),
        dislikes: keep(&respondent.dislikes, &scanned.membership.dislikes),
    }
}

// ********* Aggregation **********

fn ratio(count: f64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count / (total as f64)
    }
}

fn region_totals(
    catalog: &RegionCatalog,
    adjusted: &Tally,
    total_respondents: u64,
    rules: &TallyRules,
) -> Result<Vec<RegionTotals>, AreaErrors> {
    let mut sums: Vec<RoleCounts> = vec![RoleCounts::EMPTY; catalog.len()];
    for (_, reg, c) in adjusted.iter() {
        let s = &mut sums[reg.index()];
        s.like += c.like;
        s.dislike += c.dislike;
    }

    let mut res: Vec<RegionTotals> = Vec::new();
    for ((_, region), s) in catalog.iter().zip(sums.iter()) {
        let none = total_respondents as i64 - s.like as i64 - s.dislike as i64;
        if none < 0 {
            let err = AreaErrors::NegativeNone {
                region: region.name().to_string(),
                none,
            };
            match rules.negative_none {
                NegativeNonePolicy::Fail => return Err(err),
                NegativeNonePolicy::Warn => warn!("region_totals: {}", err),
            }
        }
        res.push(RegionTotals {
            name: region.name().to_string(),
            like: s.like,
            dislike: s.dislike,
            none,
            total: total_respondents,
            like_ratio: ratio(s.like as f64, total_respondents),
            dislike_ratio: ratio(s.dislike as f64, total_respondents),
            none_ratio: ratio(none as f64, total_respondents),
        });
    }
    Ok(res)
}

fn respondent_table(
    catalog: &RegionCatalog,
    order: &[RowIndex],
    ids: &[RespondentId],
    regions: &[RegionId],
    tally: &Tally,
) -> RespondentTable<RoleCounts> {
    let rows = order
        .iter()
        .map(|row| RespondentRow {
            respondent: ids[*row],
            cells: regions.iter().map(|reg| tally.get(*row, *reg)).collect(),
        })
        .collect();
    RespondentTable {
        regions: regions
            .iter()
            .filter_map(|reg| catalog.name(*reg).map(|n| n.to_string()))
            .collect(),
        rows,
    }
}

fn diff_table(
    raw: &RespondentTable<RoleCounts>,
    adjusted: &RespondentTable<RoleCounts>,
) -> RespondentTable<RoleDelta> {
    let rows = raw
        .rows
        .iter()
        .zip(adjusted.rows.iter())
        .map(|(r, a)| RespondentRow {
            respondent: r.respondent,
            cells: r
                .cells
                .iter()
                .zip(a.cells.iter())
                .map(|(rc, ac)| RoleDelta::between(*rc, *ac))
                .collect(),
        })
        .collect();
    RespondentTable {
        regions: raw.regions.clone(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn square(name: &str, x0: f64, y0: f64, side: f64) -> Vec<BoundaryPoint> {
        [(x0, y0), (x0, y0 + side), (x0 + side, y0 + side), (x0 + side, y0)]
            .iter()
            .map(|(x, y)| BoundaryPoint {
                region: name.to_string(),
                x: *x,
                y: *y,
            })
            .collect()
    }

    fn respondent(id: u64, likes: &[(f64, f64)], dislikes: &[(f64, f64)]) -> Respondent {
        let mut r = Respondent {
            id: Some(id),
            ..Default::default()
        };
        for (slot, (x, y)) in likes.iter().enumerate() {
            r.likes[slot] = Some(Point::new(*x, *y));
        }
        for (slot, (x, y)) in dislikes.iter().enumerate() {
            r.dislikes[slot] = Some(Point::new(*x, *y));
        }
        r
    }

    // north: [0,10]x[0,10], south: [0,10]x[-10,0)
    fn map() -> Vec<BoundaryPoint> {
        let mut b = square("north", 0.0, 0.0, 10.0);
        b.extend(square("south", 0.0, -10.0, 10.0));
        b
    }

    fn totals<'a>(res: &'a AreaResult, name: &str) -> &'a RegionTotals {
        res.region_totals.iter().find(|t| t.name == name).unwrap()
    }

    #[test]
    fn like_and_dislike_in_same_region_cancel() {
        init();
        let res = run_area_stats(
            &map(),
            &[respondent(1, &[(5.0, 5.0)], &[(6.0, 6.0)])],
            &TallyRules::DEFAULT_RULES,
        )
        .unwrap();

        assert_eq!(
            res.raw_counts.cell(1, "north"),
            Some(RoleCounts {
                like: 1,
                dislike: 1
            })
        );
        assert_eq!(res.adjusted_counts.cell(1, "north"), Some(RoleCounts::EMPTY));
        assert_eq!(
            res.diff.cell(1, "north"),
            Some(RoleDelta {
                like: -1,
                dislike: -1
            })
        );
        let north = totals(&res, "north");
        assert_eq!((north.like, north.dislike, north.none), (0, 0, 1));
        assert_eq!(
            res.surviving_points,
            vec![SurvivingPoints {
                respondent: 1,
                ..Default::default()
            }]
        );
    }

    #[test]
    fn single_like_is_counted() {
        init();
        let res = run_area_stats(
            &map(),
            &[
                respondent(1, &[(5.0, 5.0)], &[(6.0, 6.0)]),
                respondent(2, &[(5.0, 5.0)], &[]),
            ],
            &TallyRules::DEFAULT_RULES,
        )
        .unwrap();
        let north = totals(&res, "north");
        assert_eq!((north.like, north.dislike, north.none, north.total), (1, 0, 1, 2));
        assert_eq!(
            res.surviving_points[1].likes,
            [Some(Point::new(5.0, 5.0)), None]
        );
        assert_eq!(res.surviving_points[1].dislikes, [None, None]);
    }

    #[test]
    fn ratios() {
        init();
        // 10 respondents. south ends with 3 likes and 2 dislikes.
        let mut rs: Vec<Respondent> = Vec::new();
        for id in 0..3 {
            rs.push(respondent(id, &[(5.0, -5.0)], &[]));
        }
        for id in 3..5 {
            rs.push(respondent(id, &[], &[(5.0, -5.0)]));
        }
        // Cancelled: does not count.
        rs.push(respondent(5, &[(1.0, -1.0)], &[(2.0, -2.0)]));
        for id in 6..10 {
            rs.push(respondent(id, &[], &[]));
        }
        let res = run_area_stats(&map(), &rs, &TallyRules::DEFAULT_RULES).unwrap();
        let south = totals(&res, "south");
        assert_eq!((south.like, south.dislike, south.none, south.total), (3, 2, 5, 10));
        assert_relative_eq!(south.like_ratio, 0.3);
        assert_relative_eq!(south.dislike_ratio, 0.2);
        assert_relative_eq!(south.none_ratio, 0.5);

        for t in res.region_totals.iter() {
            assert_eq!(t.like as i64 + t.dislike as i64 + t.none, t.total as i64);
            assert_relative_eq!(t.like_ratio + t.dislike_ratio + t.none_ratio, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_respondents() {
        init();
        let res = run_area_stats(&map(), &[], &TallyRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.total_respondents, 0);
        assert_eq!(res.region_totals.len(), 2);
        for t in res.region_totals.iter() {
            assert_eq!(t.none, 0);
            assert_eq!(t.like_ratio, 0.0);
            assert_eq!(t.none_ratio, 0.0);
        }
        assert!(res.raw_counts.rows.is_empty());
        assert!(res.raw_counts.regions.is_empty());
    }

    #[test]
    fn overlapping_regions_first_match() {
        init();
        let mut b = square("first", 0.0, 0.0, 10.0);
        b.extend(square("second", 5.0, 5.0, 10.0));
        // The like is inside both regions and goes to "first". The dislike only
        // touches "second": nothing is cancelled.
        let res = run_area_stats(
            &b,
            &[respondent(1, &[(7.0, 7.0)], &[(12.0, 12.0)])],
            &TallyRules::DEFAULT_RULES,
        )
        .unwrap();
        assert_eq!(totals(&res, "first").like, 1);
        assert_eq!(totals(&res, "second").like, 0);
        assert_eq!(totals(&res, "second").dislike, 1);
        assert_eq!(res.raw_counts.regions, vec!["first", "second"]);
    }

    #[test]
    fn cancellation_in_one_region_only() {
        init();
        // like1 and dislike1 in north, like2 in south.
        let rs = [respondent(7, &[(1.0, 1.0), (1.0, -1.0)], &[(2.0, 2.0)])];
        let res = run_area_stats(&map(), &rs, &TallyRules::DEFAULT_RULES).unwrap();
        assert_eq!(res.adjusted_counts.cell(7, "north"), Some(RoleCounts::EMPTY));
        assert_eq!(
            res.adjusted_counts.cell(7, "south"),
            Some(RoleCounts {
                like: 1,
                dislike: 0
            })
        );
        let sp = &res.surviving_points[0];
        assert_eq!(sp.likes, [None, Some(Point::new(1.0, -1.0))]);
        assert_eq!(sp.dislikes, [None, None]);
    }

    #[test]
    fn two_likes_against_one_dislike_cancel_entirely() {
        init();
        let rs = [respondent(1, &[(1.0, 1.0), (3.0, 3.0)], &[(2.0, 2.0)])];
        let res = run_area_stats(&map(), &rs, &TallyRules::DEFAULT_RULES).unwrap();
        assert_eq!(
            res.raw_counts.cell(1, "north"),
            Some(RoleCounts {
                like: 2,
                dislike: 1
            })
        );
        assert_eq!(
            res.diff.cell(1, "north"),
            Some(RoleDelta {
                like: -2,
                dislike: -1
            })
        );
        assert_eq!(totals(&res, "north").like, 0);
    }

    #[test]
    fn negative_none_policy() {
        init();
        let rs = [respondent(1, &[(1.0, 1.0), (3.0, 3.0)], &[])];
        let res = run_area_stats(&map(), &rs, &TallyRules::DEFAULT_RULES).unwrap();
        let north = totals(&res, "north");
        assert_eq!((north.like, north.none), (2, -1));
        assert_relative_eq!(north.like_ratio + north.none_ratio, 1.0);

        let strict = TallyRules {
            negative_none: NegativeNonePolicy::Fail,
            ..TallyRules::DEFAULT_RULES
        };
        assert_eq!(
            run_area_stats(&map(), &rs, &strict),
            Err(AreaErrors::NegativeNone {
                region: "north".to_string(),
                none: -1
            })
        );
    }

    #[test]
    fn disabled_cancellation_keeps_raw_counts() {
        init();
        let rules = TallyRules {
            cancellation: CancellationMode::Disabled,
            ..TallyRules::DEFAULT_RULES
        };
        let rs = [respondent(1, &[(5.0, 5.0)], &[(6.0, 6.0)])];
        let res = run_area_stats(&map(), &rs, &rules).unwrap();
        assert_eq!(res.adjusted_counts, res.raw_counts);
        let north = totals(&res, "north");
        assert_eq!((north.like, north.dislike, north.none), (1, 1, -1));
        assert_eq!(res.surviving_points[0].likes[0], Some(Point::new(5.0, 5.0)));
        assert_eq!(res.surviving_points[0].dislikes[0], Some(Point::new(6.0, 6.0)));
    }

    #[test]
    fn rows_sorted_and_ids_resolved() {
        init();
        let mut anonymous = respondent(0, &[(5.0, 5.0)], &[]);
        anonymous.id = None;
        // Row position 1 becomes the identifier.
        let rs = [respondent(30, &[], &[(5.0, -5.0)]), anonymous, respondent(4, &[], &[])];
        let res = run_area_stats(&map(), &rs, &TallyRules::DEFAULT_RULES).unwrap();
        let ids: Vec<u64> = res.raw_counts.rows.iter().map(|r| r.respondent).collect();
        assert_eq!(ids, vec![1, 4, 30]);
        let ids: Vec<u64> = res.surviving_points.iter().map(|r| r.respondent).collect();
        assert_eq!(ids, vec![1, 4, 30]);
        assert_eq!(
            res.raw_counts.cell(4, "south"),
            Some(RoleCounts::EMPTY)
        );
        assert_eq!(
            res.raw_counts.cell(1, "north"),
            Some(RoleCounts {
                like: 1,
                dislike: 0
            })
        );
    }

    #[test]
    fn missing_id_falls_back_on_a_taken_id() {
        init();
        let mut anonymous = respondent(0, &[(5.0, 5.0)], &[]);
        anonymous.id = None;
        // The second row falls back to id 1, already taken: both rows are counted.
        let rs = [respondent(1, &[(5.0, 5.0)], &[]), anonymous];
        let res = run_area_stats(&map(), &rs, &TallyRules::DEFAULT_RULES).unwrap();
        let north = totals(&res, "north");
        assert_eq!((north.like, north.none, north.total), (2, 0, 2));
        let ids: Vec<u64> = res.raw_counts.rows.iter().map(|r| r.respondent).collect();
        assert_eq!(ids, vec![1, 1]);
        assert_eq!(res.surviving_points.len(), 2);
    }

    #[test]
    fn repeated_ids_stay_separate_rows() {
        init();
        // Same id, opposite marks: no cancellation across rows.
        let rs = [
            respondent(3, &[], &[(5.0, 5.0)]),
            respondent(1, &[], &[]),
            respondent(3, &[(6.0, 6.0)], &[]),
        ];
        let res = run_area_stats(&map(), &rs, &TallyRules::DEFAULT_RULES).unwrap();
        let north = totals(&res, "north");
        assert_eq!((north.like, north.dislike, north.none), (1, 1, 1));

        // Sorted by id, then by input position.
        let rows: Vec<(u64, Vec<RoleCounts>)> = res
            .adjusted_counts
            .rows
            .iter()
            .map(|r| (r.respondent, r.cells.clone()))
            .collect();
        let like = RoleCounts { like: 1, dislike: 0 };
        let dislike = RoleCounts { like: 0, dislike: 1 };
        assert_eq!(
            rows,
            vec![
                (1, vec![RoleCounts::EMPTY]),
                (3, vec![dislike]),
                (3, vec![like]),
            ]
        );
        assert_eq!(res.surviving_points[1].dislikes[0], Some(Point::new(5.0, 5.0)));
        assert_eq!(res.surviving_points[2].likes[0], Some(Point::new(6.0, 6.0)));
    }

    #[test]
    fn unclassified_and_missing_slots() {
        init();
        let mut r = respondent(1, &[(50.0, 50.0)], &[]);
        r.dislikes[1] = Point::from_pair(Some(5.0), None);
        let res = run_area_stats(&map(), &[r], &TallyRules::DEFAULT_RULES).unwrap();
        assert!(res.raw_counts.regions.is_empty());
        assert_eq!(res.raw_counts.rows.len(), 1);
        assert_eq!(res.surviving_points[0].likes, [None, None]);
        for t in res.region_totals.iter() {
            assert_eq!(t.none, 1);
        }
    }

    #[test]
    fn invalid_region_aborts() {
        init();
        let mut b = map();
        b.push(BoundaryPoint {
            region: "tiny".to_string(),
            x: 0.0,
            y: 0.0,
        });
        let res = run_area_stats(&b, &[respondent(1, &[(5.0, 5.0)], &[])], &TallyRules::DEFAULT_RULES);
        assert_eq!(
            res,
            Err(AreaErrors::InvalidRegion {
                name: "tiny".to_string(),
                num_points: 1
            })
        );
    }

    // A small deterministic generator so the property checks cover many layouts.
    fn lcg(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((*state >> 33) % 2000) as f64 / 100.0 - 5.0
    }

    #[test]
    fn cancellation_properties() {
        init();
        let mut b = map();
        b.extend(square("east", 10.0, -10.0, 10.0));
        let mut state = 42u64;
        let mut rs: Vec<Respondent> = Vec::new();
        for id in 0..200 {
            let mut r = Respondent {
                id: Some(id),
                ..Default::default()
            };
            for slot in 0..SLOTS_PER_ROLE {
                if id % 7 != slot as u64 {
                    r.likes[slot] = Some(Point::new(lcg(&mut state) + 5.0, lcg(&mut state)));
                }
                if id % 5 != slot as u64 {
                    r.dislikes[slot] = Some(Point::new(lcg(&mut state) + 5.0, lcg(&mut state)));
                }
            }
            rs.push(r);
        }
        let catalog = RegionCatalog::from_boundary_points(&b).unwrap();
        let res = run_area_stats(&b, &rs, &TallyRules::DEFAULT_RULES).unwrap();
        let again = run_area_stats(&b, &rs, &TallyRules::DEFAULT_RULES).unwrap();
        assert_eq!(res, again);

        for ((raw, adj), diff) in res
            .raw_counts
            .rows
            .iter()
            .zip(res.adjusted_counts.rows.iter())
            .zip(res.diff.rows.iter())
        {
            let sp = res
                .surviving_points
                .iter()
                .find(|sp| sp.respondent == raw.respondent)
                .unwrap();
            let input = rs.iter().find(|r| r.id == Some(raw.respondent)).unwrap();
            for (col, region) in res.raw_counts.regions.iter().enumerate() {
                let (rc, ac, dc) = (raw.cells[col], adj.cells[col], diff.cells[col]);
                assert!(ac.like <= rc.like && ac.dislike <= rc.dislike);
                assert!(dc.like <= 0 && dc.dislike <= 0);
                let both = rc.like > 0 && rc.dislike > 0;
                if both {
                    assert_eq!(ac, RoleCounts::EMPTY);
                } else {
                    assert_eq!(ac, rc);
                }
                // A slot classified into this region survives iff the cell was not cancelled.
                let rid = catalog.find(region).unwrap();
                for slot in 0..SLOTS_PER_ROLE {
                    if let Some(p) = input.likes[slot] {
                        if catalog.classify(p) == Some(rid) {
                            assert_eq!(sp.likes[slot].is_some(), !both);
                        }
                    }
                    if let Some(p) = input.dislikes[slot] {
                        if catalog.classify(p) == Some(rid) {
                            assert_eq!(sp.dislikes[slot].is_some(), !both);
                        }
                    }
                }
            }
        }
        for t in res.region_totals.iter() {
            assert_eq!(t.like as i64 + t.dislike as i64 + t.none, t.total as i64);
            assert_relative_eq!(t.like_ratio + t.dislike_ratio + t.none_ratio, 1.0, epsilon = 1e-12);
        }
    }
}
