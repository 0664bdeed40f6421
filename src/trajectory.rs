//! # Unified trajectory data model
//!
//! Every loader of the crate produces the types defined here, whatever the file
//! format on disk. The normalization pipeline and the statistics helpers operate
//! on them, and downstream consumers (rendering, filtering, statistics) receive
//! them read-only.
//!
//! ## Data Model
//! -----------------
//! * [`Trajectory`] – one polyline: ordered positions plus attribute channels,
//!   one value per position per channel.
//! * [`TrajectorySet`] – ordered `Vec<Trajectory>`; the index is the line index.
//! * [`StressSample`] – principal stresses and eigenvector directions at one point.
//! * [`StressLine`] – stress samples of one trajectory plus its hierarchy level.
//! * [`StressSampleSet`] – `Vec<StressLine>`, index-aligned with a [`TrajectorySet`].
//! * [`PrincipalStressCollection`] – one `(TrajectorySet, StressSampleSet)` pair per
//!   principal stress direction, always normalized jointly.
//!
//! ## Invariants
//! -----------------
//! * `attribute.len() == positions.len()` for every attribute channel of a trajectory.
//! * `stress_line.samples.len() == trajectory.positions.len()` for aligned pairs.
//!
//! Decoders never emit an instance violating these invariants; violations are
//! programming errors and are caught with `debug_assert!`.
use serde::{Deserialize, Serialize};

use crate::constants::{StressSampleSet, TrajectorySet, Vec3, STRESS_VALUES_PER_POINT};

/// One polyline with per-point scalar attribute channels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    pub positions: Vec<Vec3>,
    /// `attributes[channel][point]`
    pub attributes: Vec<Vec<f32>>,
}

impl Trajectory {
    /// Build a trajectory from already decoded positions and attribute channels.
    ///
    /// Arguments
    /// -----------------
    /// * `positions` – Ordered line points.
    /// * `attributes` – Attribute channels, each one as long as `positions`.
    ///
    /// Panics
    /// ----------
    /// * **Debug builds only**: a channel whose length differs from `positions.len()`.
    pub fn new(positions: Vec<Vec3>, attributes: Vec<Vec<f32>>) -> Self {
        debug_assert!(
            attributes.iter().all(|a| a.len() == positions.len()),
            "attribute channel length differs from the number of positions"
        );
        Trajectory {
            positions,
            attributes,
        }
    }

    /// Empty trajectory with room for `num_points` points in each of `num_attributes` channels.
    pub fn with_capacity(num_points: usize, num_attributes: usize) -> Self {
        Trajectory {
            positions: Vec::with_capacity(num_points),
            attributes: (0..num_attributes)
                .map(|_| Vec::with_capacity(num_points))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Number of segments of the polyline (`len - 1`, or 0 for fewer than two points).
    pub fn num_segments(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    /// Check the length invariant between positions and attribute channels.
    pub fn is_consistent(&self) -> bool {
        self.attributes
            .iter()
            .all(|channel| channel.len() == self.positions.len())
    }
}

/// The three principal stress directions of a stress tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrincipalStressDirection {
    Major,
    Medium,
    Minor,
}

impl PrincipalStressDirection {
    pub const ALL: [PrincipalStressDirection; 3] = [
        PrincipalStressDirection::Major,
        PrincipalStressDirection::Medium,
        PrincipalStressDirection::Minor,
    ];

    /// Position of the direction in the conventional major/medium/minor order.
    pub fn index(self) -> usize {
        match self {
            PrincipalStressDirection::Major => 0,
            PrincipalStressDirection::Medium => 1,
            PrincipalStressDirection::Minor => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Identifier used by the external stress line tracer (1 = major, 2 = medium, 3 = minor).
    pub fn field_id(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Principal stresses and eigenvector directions sampled at one line point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StressSample {
    pub major_ps: f32,
    pub medium_ps: f32,
    pub minor_ps: f32,
    pub major_ps_dir: Vec3,
    pub medium_ps_dir: Vec3,
    pub minor_ps_dir: Vec3,
}

impl StressSample {
    /// Decode the 12 values stored per point in the stress text format:
    /// `[major, major_dir x/y/z, medium, medium_dir x/y/z, minor, minor_dir x/y/z]`.
    ///
    /// Panics
    /// ----------
    /// * If `record` holds fewer than 12 values; callers slice exact records.
    pub fn from_record(record: &[f32]) -> Self {
        debug_assert_eq!(record.len(), STRESS_VALUES_PER_POINT);
        StressSample {
            major_ps: record[0],
            major_ps_dir: Vec3::new(record[1], record[2], record[3]),
            medium_ps: record[4],
            medium_ps_dir: Vec3::new(record[5], record[6], record[7]),
            minor_ps: record[8],
            minor_ps_dir: Vec3::new(record[9], record[10], record[11]),
        }
    }

    pub fn principal_stress(&self, direction: PrincipalStressDirection) -> f32 {
        match direction {
            PrincipalStressDirection::Major => self.major_ps,
            PrincipalStressDirection::Medium => self.medium_ps,
            PrincipalStressDirection::Minor => self.minor_ps,
        }
    }

    pub fn principal_direction(&self, direction: PrincipalStressDirection) -> Vec3 {
        match direction {
            PrincipalStressDirection::Major => self.major_ps_dir,
            PrincipalStressDirection::Medium => self.medium_ps_dir,
            PrincipalStressDirection::Minor => self.minor_ps_dir,
        }
    }
}

/// Stress samples of one trajectory.
///
/// The hierarchy level is stored once per line: hierarchy files carry one level per
/// line, and every sample of the line shares it. It stays `None` until a hierarchy
/// file has been applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StressLine {
    pub samples: Vec<StressSample>,
    pub hierarchy_level: Option<f32>,
}

impl StressLine {
    pub fn with_capacity(num_points: usize) -> Self {
        StressLine {
            samples: Vec::with_capacity(num_points),
            hierarchy_level: None,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Line set of one principal stress direction with its aligned stress samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrincipalStressLines {
    pub trajectories: TrajectorySet,
    pub stress: StressSampleSet,
}

impl PrincipalStressLines {
    pub fn new(trajectories: TrajectorySet, stress: StressSampleSet) -> Self {
        debug_assert_eq!(trajectories.len(), stress.len());
        debug_assert!(trajectories
            .iter()
            .zip(stress.iter())
            .all(|(t, s)| t.len() == s.len()));
        PrincipalStressLines {
            trajectories,
            stress,
        }
    }
}

/// Ordered `(TrajectorySet, StressSampleSet)` pairs, one per principal stress direction.
///
/// The order is the block order of the decoded files; conventionally major, medium, minor.
/// All member line sets share one bounding box and one attribute range once normalized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrincipalStressCollection {
    pub directions: Vec<PrincipalStressLines>,
}

impl PrincipalStressCollection {
    pub fn new(directions: Vec<PrincipalStressLines>) -> Self {
        PrincipalStressCollection { directions }
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PrincipalStressLines> {
        self.directions.iter()
    }

    /// Line set of the `index`-th direction.
    pub fn trajectories(&self, index: usize) -> Option<&TrajectorySet> {
        self.directions.get(index).map(|d| &d.trajectories)
    }

    /// Stress samples of the `index`-th direction.
    pub fn stress(&self, index: usize) -> Option<&StressSampleSet> {
        self.directions.get(index).map(|d| &d.stress)
    }

    pub fn trajectory_sets(&self) -> impl Iterator<Item = &TrajectorySet> {
        self.directions.iter().map(|d| &d.trajectories)
    }

    pub(crate) fn trajectory_sets_mut(&mut self) -> impl Iterator<Item = &mut TrajectorySet> {
        self.directions.iter_mut().map(|d| &mut d.trajectories)
    }
}

#[cfg(test)]
mod trajectory_test {
    use super::*;

    #[test]
    fn test_stress_sample_from_record() {
        let record: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let sample = StressSample::from_record(&record);

        assert_eq!(sample.major_ps, 0.0);
        assert_eq!(sample.major_ps_dir, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(sample.medium_ps, 4.0);
        assert_eq!(sample.medium_ps_dir, Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(sample.minor_ps, 8.0);
        assert_eq!(sample.minor_ps_dir, Vec3::new(9.0, 10.0, 11.0));
        assert_eq!(sample.principal_stress(PrincipalStressDirection::Medium), 4.0);
        assert_eq!(
            sample.principal_direction(PrincipalStressDirection::Minor),
            Vec3::new(9.0, 10.0, 11.0)
        );
    }

    #[test]
    fn test_direction_ids() {
        assert_eq!(PrincipalStressDirection::Major.field_id(), 1);
        assert_eq!(PrincipalStressDirection::Minor.field_id(), 3);
        assert_eq!(
            PrincipalStressDirection::from_index(1),
            Some(PrincipalStressDirection::Medium)
        );
        assert_eq!(PrincipalStressDirection::from_index(3), None);
    }

    #[test]
    fn test_trajectory_segments() {
        let traj = Trajectory::new(
            vec![Vec3::zeros(), Vec3::x(), Vec3::y()],
            vec![vec![0.0, 1.0, 2.0]],
        );
        assert_eq!(traj.num_segments(), 2);
        assert!(traj.is_consistent());
        assert_eq!(Trajectory::default().num_segments(), 0);
    }
}
