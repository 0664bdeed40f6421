//! # Line set normalization
//!
//! Bounding-volume and attribute-range reductions over one or several line sets, and
//! the rescale passes that bring decoded lines into a common frame:
//!
//! * **positions**: `p' = (p + translation) * scale`, with `translation = -center(aabb)`
//!   and a uniform `scale` fitting the longest bounding box axis into `[-0.5, 0.5]`,
//!   followed by the optional affine transform of [`LoadParams::transform`] (`w = 1`);
//! * **attributes**: per channel `v' = (v - min) / (max - min)`.
//!
//! ## Single-set and joint normalization
//! -----------------
//! [`normalize_set`] and [`normalize_collection`] share one core working on the flat
//! list of trajectories of every set involved. A collection is therefore always
//! normalized with **one** bounding box and **one** range per attribute channel, and a
//! collection holding a single set yields exactly the statistics of the single-set path.
//!
//! ## Ownership
//! -----------------
//! Both entry points consume the decoded value and return a [`Normalized`] wrapper that
//! only hands out shared references. Data that went through a normalization pass cannot
//! be fed to a second one without first calling [`Normalized::into_inner`].
//!
//! ## Parallelism
//! -----------------
//! Reductions and rescale passes run with `rayon`, one task per trajectory. The reduction
//! completes before the rescale starts. With [`LoadParams::num_threads`] set, both run
//! inside a dedicated pool.
//!
//! ## Degenerate inputs
//! -----------------
//! * Points with a non-finite component do not contribute to the bounding box.
//! * A zero-extent axis is ignored when choosing the scale; if every axis has zero
//!   extent (a single point) the scale is 1.0. An empty box gives translation 0, scale 1.
//! * A constant attribute channel (`max == min`) is **not** guarded: its values become
//!   NaN, as produced by the division.
use std::borrow::Borrow;
use std::ops::Deref;

use nalgebra::Matrix4;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    aabb::Aabb3,
    constants::{TrajectorySet, Vec3},
    line_errors::LineDataError,
    load_params::LoadParams,
    trajectory::{PrincipalStressCollection, Trajectory},
};

/// Translation and uniform scale of the position pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionNormalization {
    pub translation: Vec3,
    pub scale: f32,
}

impl Default for PositionNormalization {
    fn default() -> Self {
        PositionNormalization {
            translation: Vec3::zeros(),
            scale: 1.0,
        }
    }
}

impl PositionNormalization {
    /// Center `aabb` on the origin and fit its longest axis into `[-0.5, 0.5]`.
    pub fn from_aabb(aabb: &Aabb3) -> Self {
        if aabb.is_empty() {
            return Self::default();
        }

        let half_extents = aabb.dimensions() * 0.5;
        let scale = half_extents
            .iter()
            .map(|h| 0.5 / h)
            .filter(|s| s.is_finite())
            .fold(f32::INFINITY, f32::min);

        PositionNormalization {
            translation: -aabb.center(),
            scale: if scale.is_finite() { scale } else { 1.0 },
        }
    }

    pub fn apply(&self, pt: &Vec3) -> Vec3 {
        (pt + self.translation) * self.scale
    }
}

/// Value range of one attribute channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeRange {
    pub min: f32,
    pub max: f32,
}

impl Default for AttributeRange {
    fn default() -> Self {
        AttributeRange {
            min: f32::MAX,
            max: -f32::MAX,
        }
    }
}

impl AttributeRange {
    pub fn new(min: f32, max: f32) -> Self {
        AttributeRange { min, max }
    }

    fn add(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn combine(self, other: AttributeRange) -> AttributeRange {
        AttributeRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn rescale(&self, value: f32) -> f32 {
        (value - self.min) / (self.max - self.min)
    }
}

/// Statistics used by a normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationReport {
    /// Bounding box of the decoded positions, before any rescale.
    pub aabb: Aabb3,
    /// Set when the position pass ran.
    pub positions: Option<PositionNormalization>,
    /// One range per attribute channel; empty when the attribute pass did not run.
    pub attribute_ranges: Vec<AttributeRange>,
}

/// Line data that went through exactly one normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    lines: T,
    report: NormalizationReport,
}

impl<T> Normalized<T> {
    pub fn lines(&self) -> &T {
        &self.lines
    }

    pub fn report(&self) -> &NormalizationReport {
        &self.report
    }

    pub fn into_inner(self) -> T {
        self.lines
    }

    pub fn into_parts(self) -> (T, NormalizationReport) {
        (self.lines, self.report)
    }
}

impl<T> Deref for Normalized<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.lines
    }
}

// -------------------------------------------------------------------------------------------------
// Reductions
// -------------------------------------------------------------------------------------------------

fn lines_aabb<L: Borrow<Trajectory> + Sync>(lines: &[L]) -> Aabb3 {
    lines
        .par_iter()
        .map(|t| Aabb3::from_points(&t.borrow().positions))
        .reduce(Aabb3::empty, Aabb3::combine)
}

fn lines_attribute_ranges<L: Borrow<Trajectory> + Sync>(
    lines: &[L],
    num_attributes: usize,
) -> Vec<AttributeRange> {
    lines
        .par_iter()
        .map(|t| {
            let mut ranges = vec![AttributeRange::default(); num_attributes];
            for (range, channel) in ranges.iter_mut().zip(&t.borrow().attributes) {
                channel.iter().for_each(|v| range.add(*v));
            }
            ranges
        })
        .reduce(
            || vec![AttributeRange::default(); num_attributes],
            |a, b| a.into_iter().zip(b).map(|(x, y)| x.combine(y)).collect(),
        )
}

fn first_num_attributes<L: Borrow<Trajectory>>(lines: &[L]) -> usize {
    lines.first().map_or(0, |t| t.borrow().num_attributes())
}

/// Bounding box of the finite positions of `set`.
pub fn bounding_box(set: &TrajectorySet) -> Aabb3 {
    joint_bounding_box(&[set])
}

/// One bounding box over every position of every set.
pub fn joint_bounding_box(sets: &[&TrajectorySet]) -> Aabb3 {
    let lines: Vec<&Trajectory> = sets.iter().flat_map(|s| s.iter()).collect();
    lines_aabb(&lines)
}

/// Per-channel value ranges of `set`; the channel count is the one of its first trajectory.
pub fn attribute_ranges(set: &TrajectorySet) -> Vec<AttributeRange> {
    joint_attribute_ranges(&[set])
}

/// Per-channel value ranges shared by every set; the channel count is the one of the
/// first trajectory found.
pub fn joint_attribute_ranges(sets: &[&TrajectorySet]) -> Vec<AttributeRange> {
    let lines: Vec<&Trajectory> = sets.iter().flat_map(|s| s.iter()).collect();
    lines_attribute_ranges(&lines, first_num_attributes(&lines))
}

// -------------------------------------------------------------------------------------------------
// Rescale passes
// -------------------------------------------------------------------------------------------------

fn transform_point(m: &Matrix4<f32>, pt: &Vec3) -> Vec3 {
    (m * pt.push(1.0)).xyz()
}

fn normalize_lines(lines: &mut [&mut Trajectory], params: &LoadParams) -> NormalizationReport {
    let aabb = lines_aabb(lines);

    let positions = params.normalize_positions.then(|| {
        let normalization = PositionNormalization::from_aabb(&aabb);
        let transform = params.transform.as_ref();
        lines.par_iter_mut().for_each(|t| {
            for pt in t.positions.iter_mut() {
                let scaled = normalization.apply(pt);
                *pt = match transform {
                    Some(m) => transform_point(m, &scaled),
                    None => scaled,
                };
            }
        });
        normalization
    });

    let attribute_ranges = if params.normalize_attributes {
        let ranges = lines_attribute_ranges(lines, first_num_attributes(lines));
        lines.par_iter_mut().for_each(|t| {
            for (channel, range) in t.attributes.iter_mut().zip(&ranges) {
                channel.iter_mut().for_each(|v| *v = range.rescale(*v));
            }
        });
        ranges
    } else {
        Vec::new()
    };

    debug!(
        lines = lines.len(),
        ?positions,
        attributes = attribute_ranges.len(),
        "normalized line data"
    );

    NormalizationReport {
        aabb,
        positions,
        attribute_ranges,
    }
}

fn run_normalization(
    lines: &mut [&mut Trajectory],
    params: &LoadParams,
) -> Result<NormalizationReport, LineDataError> {
    Ok(match params.thread_pool()? {
        Some(pool) => pool.install(|| normalize_lines(lines, params)),
        None => normalize_lines(lines, params),
    })
}

/// Normalize one line set as requested by `params`.
///
/// Arguments
/// -----------------
/// * `set` – Decoded line set, consumed.
/// * `params` – Which passes run, optional transform and worker pool size.
///
/// Return
/// ----------
/// * The normalized set with the statistics that were used.
/// * `Err(LineDataError::ThreadPoolError)` if the dedicated worker pool cannot be built.
pub fn normalize_set(
    mut set: TrajectorySet,
    params: &LoadParams,
) -> Result<Normalized<TrajectorySet>, LineDataError> {
    let mut lines: Vec<&mut Trajectory> = set.iter_mut().collect();
    let report = run_normalization(&mut lines, params)?;
    Ok(Normalized { lines: set, report })
}

/// Normalize every direction of a principal stress collection with shared statistics.
///
/// Stress samples are not modified; only positions and attribute channels are.
///
/// See also
/// ------------
/// * [`normalize_set`] – Same passes on one line set.
pub fn normalize_collection(
    mut collection: PrincipalStressCollection,
    params: &LoadParams,
) -> Result<Normalized<PrincipalStressCollection>, LineDataError> {
    let mut lines: Vec<&mut Trajectory> = collection
        .trajectory_sets_mut()
        .flat_map(|s| s.iter_mut())
        .collect();
    let report = run_normalization(&mut lines, params)?;
    Ok(Normalized {
        lines: collection,
        report,
    })
}
