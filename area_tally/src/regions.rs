use log::debug;

use std::collections::HashMap;

use crate::config::*;

/// Position of a region in the catalog.
///
/// Ordering region ids is ordering regions by their first appearance in the
/// boundary file.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct RegionId(u32);

impl RegionId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A named simple polygon. The closing edge is implicit.
#[derive(PartialEq, Debug, Clone)]
pub struct Region {
    name: String,
    vertices: Vec<Point>,
}

impl Region {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Even-odd containment test.
    ///
    /// A ray is cast from the point towards +x. An edge is crossed when its
    /// end points lie on both sides of the horizontal line through the point
    /// (the lower end inclusive) and the crossing is strictly right of the
    /// point. A point on an edge shared by two adjacent regions is therefore
    /// inside exactly one of them.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > p.y) != (vj.y > p.y) {
                let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

/// The regions of the map, in the order they first appear in the boundary file.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Groups the boundary points by region name.
    ///
    /// Regions keep the order in which their name first appears, and vertices
    /// keep the order of the rows. Fails if a region has fewer than 3 points.
    pub fn from_boundary_points(points: &[BoundaryPoint]) -> Result<RegionCatalog, AreaErrors> {
        let mut index_by_name: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<Point>)> = Vec::new();
        for bp in points.iter() {
            let idx = *index_by_name.entry(bp.region.as_str()).or_insert_with(|| {
                groups.push((bp.region.clone(), Vec::new()));
                groups.len() - 1
            });
            groups[idx].1.push(Point::new(bp.x, bp.y));
        }

        let mut regions: Vec<Region> = Vec::new();
        for (name, vertices) in groups {
            if vertices.len() < 3 {
                return Err(AreaErrors::InvalidRegion {
                    name,
                    num_points: vertices.len(),
                });
            }
            debug!(
                "from_boundary_points: region {:?} with {} vertices",
                name,
                vertices.len()
            );
            regions.push(Region { name, vertices });
        }
        Ok(RegionCatalog { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions
            .iter()
            .enumerate()
            .map(|(idx, r)| (RegionId(idx as u32), r))
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn name(&self, id: RegionId) -> Option<&str> {
        self.get(id).map(|r| r.name())
    }

    pub fn find(&self, name: &str) -> Option<RegionId> {
        self.iter().find(|(_, r)| r.name == name).map(|(id, _)| id)
    }

    /// Returns the first region, in catalog order, that contains the point.
    ///
    /// Overlapping regions are not flagged: the earlier region wins.
    pub fn classify(&self, p: Point) -> Option<RegionId> {
        self.iter().find(|(_, r)| r.contains(p)).map(|(id, _)| id)
    }
}
