pub use crate::config::*;

/// A builder for assembling a map and the survey answers.
///
/// ```
/// pub use area_tally::builder::Builder;
/// pub use area_tally::TallyRules;
/// # use area_tally::AreaErrors;
///
/// let mut builder = Builder::new(&TallyRules::DEFAULT_RULES)?
///     .region("north", &[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)])?;
///
/// builder.add_respondent_simple(&[(5.0, 5.0)], &[])?;
/// builder.add_respondent_simple(&[(5.0, 5.0)], &[(6.0, 6.0)])?;
///
/// let res = builder.build()?;
/// assert_eq!(res.region_totals[0].like, 1);
/// assert_eq!(res.region_totals[0].none, 1);
///
/// # Ok::<(), AreaErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: TallyRules,
    pub(crate) _boundary: Vec<BoundaryPoint>,
    pub(crate) _respondents: Vec<Respondent>,
}

impl Builder {
    pub fn new(rules: &TallyRules) -> Result<Builder, AreaErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _boundary: Vec::new(),
            _respondents: Vec::new(),
        })
    }

    /// Adds a region to the map. Regions are tested in the order they are added.
    pub fn region(self, name: &str, vertices: &[(f64, f64)]) -> Result<Builder, AreaErrors> {
        if vertices.len() < 3 {
            return Err(AreaErrors::InvalidRegion {
                name: name.to_string(),
                num_points: vertices.len(),
            });
        }
        let mut boundary = self._boundary;
        boundary.extend(vertices.iter().map(|(x, y)| BoundaryPoint {
            region: name.to_string(),
            x: *x,
            y: *y,
        }));
        Ok(Builder {
            _rules: self._rules,
            _boundary: boundary,
            _respondents: self._respondents,
        })
    }

    /// Adds a respondent identified by their position.
    ///
    /// likes, dislikes: at most two marks each, in slot order.
    pub fn add_respondent_simple(
        &mut self,
        likes: &[(f64, f64)],
        dislikes: &[(f64, f64)],
    ) -> Result<(), AreaErrors> {
        let r = Respondent {
            id: None,
            likes: to_slots(Role::Like, likes)?,
            dislikes: to_slots(Role::Dislike, dislikes)?,
        };
        self.add_respondent(&r)
    }

    pub fn add_respondent(&mut self, respondent: &Respondent) -> Result<(), AreaErrors> {
        self._respondents.push(respondent.clone());
        Ok(())
    }

    /// Runs the tally over everything added so far.
    pub fn build(&self) -> Result<AreaResult, AreaErrors> {
        crate::run_area_stats(&self._boundary, &self._respondents, &self._rules)
    }
}

fn to_slots(role: Role, marks: &[(f64, f64)]) -> Result<[Option<Point>; SLOTS_PER_ROLE], AreaErrors> {
    if marks.len() > SLOTS_PER_ROLE {
        return Err(AreaErrors::TooManyMarks {
            role,
            count: marks.len(),
        });
    }
    let mut slots = [None; SLOTS_PER_ROLE];
    for (slot, (x, y)) in marks.iter().enumerate() {
        slots[slot] = Some(Point::new(*x, *y));
    }
    Ok(slots)
}
