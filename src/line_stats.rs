//! # Line statistics
//!
//! Size and count summaries of decoded line data, exposed as the [`LineStats`]
//! extension trait on [`TrajectorySet`] and [`PrincipalStressCollection`].
//!
//! ## Overview
//! -----------------
//! | Method                 | Meaning                                             |
//! |------------------------|-----------------------------------------------------|
//! | `num_lines`            | Number of trajectories                              |
//! | `num_line_points`      | Σ points over all trajectories                      |
//! | `num_line_segments`    | Σ `max(len - 1, 0)` over all trajectories           |
//! | `num_attributes`       | Attribute channels of the first trajectory          |
//! | `geometry_byte_size`   | Bytes of the decoded geometry held in memory        |
//!
//! For a collection, every count is summed across the principal stress directions and
//! the geometry size includes the stress samples and hierarchy levels.
//!
//! [`DirectionFilter`] is a caller-owned selection of principal stress directions, used
//! with [`PrincipalStressCollection::filtered`] to restrict downstream consumers to the
//! directions they display.
use std::mem::size_of;

use itertools::Itertools;

use crate::{
    constants::{TrajectorySet, Vec3},
    trajectory::{PrincipalStressCollection, PrincipalStressDirection, PrincipalStressLines},
};

/// Bytes stored per stress sample: three principal stresses and three directions.
const STRESS_SAMPLE_BYTES: usize = 3 * size_of::<f32>() + 3 * size_of::<Vec3>();

pub trait LineStats {
    fn num_lines(&self) -> usize;

    fn num_line_points(&self) -> usize;

    fn num_line_segments(&self) -> usize;

    /// Attribute channels per point, taken from the first trajectory (0 without lines).
    fn num_attributes(&self) -> usize;

    /// In-memory size of the line geometry: positions, attribute values and, for stress
    /// data, the stress samples and per-line hierarchy levels.
    fn geometry_byte_size(&self) -> usize;
}

impl LineStats for TrajectorySet {
    fn num_lines(&self) -> usize {
        self.len()
    }

    fn num_line_points(&self) -> usize {
        self.iter().map(|t| t.len()).sum()
    }

    fn num_line_segments(&self) -> usize {
        self.iter().map(|t| t.num_segments()).sum()
    }

    fn num_attributes(&self) -> usize {
        self.first().map_or(0, |t| t.num_attributes())
    }

    fn geometry_byte_size(&self) -> usize {
        self.iter()
            .map(|t| t.len() * (size_of::<Vec3>() + t.num_attributes() * size_of::<f32>()))
            .sum()
    }
}

fn direction_byte_size(direction: &PrincipalStressLines) -> usize {
    let stress_bytes: usize = direction
        .stress
        .iter()
        .map(|line| {
            line.len() * STRESS_SAMPLE_BYTES
                + line.hierarchy_level.map_or(0, |_| size_of::<f32>())
        })
        .sum();
    direction.trajectories.geometry_byte_size() + stress_bytes
}

impl LineStats for PrincipalStressCollection {
    fn num_lines(&self) -> usize {
        self.trajectory_sets().map(|t| t.num_lines()).sum()
    }

    fn num_line_points(&self) -> usize {
        self.trajectory_sets().map(|t| t.num_line_points()).sum()
    }

    fn num_line_segments(&self) -> usize {
        self.trajectory_sets().map(|t| t.num_line_segments()).sum()
    }

    fn num_attributes(&self) -> usize {
        self.trajectory_sets()
            .find_map(|t| t.first())
            .map_or(0, |t| t.num_attributes())
    }

    fn geometry_byte_size(&self) -> usize {
        self.iter().map(direction_byte_size).sum()
    }
}

/// Selection of principal stress directions, indexed by [`PrincipalStressDirection::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionFilter {
    pub enabled: [bool; 3],
}

impl Default for DirectionFilter {
    fn default() -> Self {
        DirectionFilter::all()
    }
}

impl DirectionFilter {
    pub fn all() -> Self {
        DirectionFilter {
            enabled: [true; 3],
        }
    }

    pub fn none() -> Self {
        DirectionFilter {
            enabled: [false; 3],
        }
    }

    pub fn only(directions: &[PrincipalStressDirection]) -> Self {
        let mut filter = DirectionFilter::none();
        for dir in directions {
            filter.enabled[dir.index()] = true;
        }
        filter
    }

    pub fn with(mut self, direction: PrincipalStressDirection, enabled: bool) -> Self {
        self.enabled[direction.index()] = enabled;
        self
    }

    pub fn is_enabled(&self, direction: PrincipalStressDirection) -> bool {
        self.enabled[direction.index()]
    }

    /// Enabled directions in major, medium, minor order.
    pub fn directions(&self) -> Vec<PrincipalStressDirection> {
        PrincipalStressDirection::ALL
            .into_iter()
            .filter(|d| self.is_enabled(*d))
            .collect_vec()
    }
}

impl PrincipalStressCollection {
    /// Number of principal stress directions held by the collection.
    pub fn num_stress_directions(&self) -> usize {
        self.len()
    }

    /// Direction entries enabled in `filter`, paired with their direction.
    ///
    /// Entry `i` of the collection is taken as [`PrincipalStressDirection::from_index`]`(i)`;
    /// entries past the third have no direction and are never returned.
    pub fn filtered(
        &self,
        filter: &DirectionFilter,
    ) -> Vec<(PrincipalStressDirection, &PrincipalStressLines)> {
        self.iter()
            .enumerate()
            .filter_map(|(i, lines)| PrincipalStressDirection::from_index(i).map(|d| (d, lines)))
            .filter(|(d, _)| filter.is_enabled(*d))
            .collect_vec()
    }
}

#[cfg(test)]
mod line_stats_test {
    use super::*;
    use crate::trajectory::{StressLine, StressSample, Trajectory};

    fn line(n: usize) -> Trajectory {
        Trajectory::new(vec![Vec3::zeros(); n], vec![vec![0.0; n]])
    }

    fn stress_lines(lengths: &[usize], level: Option<f32>) -> PrincipalStressLines {
        PrincipalStressLines::new(
            lengths.iter().map(|&n| line(n)).collect(),
            lengths
                .iter()
                .map(|&n| StressLine {
                    samples: vec![StressSample::default(); n],
                    hierarchy_level: level,
                })
                .collect(),
        )
    }

    #[test]
    fn test_trajectory_set_stats() {
        let set: TrajectorySet = vec![line(3), line(1), line(0)];
        assert_eq!(set.num_lines(), 3);
        assert_eq!(set.num_line_points(), 4);
        assert_eq!(set.num_line_segments(), 2);
        assert_eq!(set.num_attributes(), 1);
        assert_eq!(set.geometry_byte_size(), 4 * 16);
        assert_eq!(TrajectorySet::new().num_attributes(), 0);
    }

    #[test]
    fn test_collection_stats() {
        let collection = PrincipalStressCollection::new(vec![
            stress_lines(&[2, 3], None),
            stress_lines(&[4], Some(0.5)),
        ]);
        assert_eq!(collection.num_stress_directions(), 2);
        assert_eq!(collection.num_lines(), 3);
        assert_eq!(collection.num_line_points(), 9);
        assert_eq!(collection.num_line_segments(), 6);
        assert_eq!(collection.num_attributes(), 1);
        assert_eq!(
            collection.geometry_byte_size(),
            9 * (16 + STRESS_SAMPLE_BYTES) + 4
        );
    }

    #[test]
    fn test_direction_filter() {
        let collection = PrincipalStressCollection::new(vec![
            stress_lines(&[1], None),
            stress_lines(&[2], None),
            stress_lines(&[3], None),
        ]);

        let filter = DirectionFilter::all().with(PrincipalStressDirection::Medium, false);
        let selected = collection.filtered(&filter);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].0, PrincipalStressDirection::Major);
        assert_eq!(selected[1].0, PrincipalStressDirection::Minor);
        assert_eq!(selected[1].1.trajectories[0].len(), 3);

        assert!(collection.filtered(&DirectionFilter::none()).is_empty());
        assert_eq!(
            DirectionFilter::only(&[PrincipalStressDirection::Minor]).directions(),
            vec![PrincipalStressDirection::Minor]
        );
    }
}
