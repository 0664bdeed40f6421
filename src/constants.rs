//! # Constants and type definitions for stresslines
//!
//! This module centralizes the **file-format constants** and the **common type
//! definitions** used throughout the crate.
//!
//! ## Overview
//!
//! - Binary line format version tag
//! - Sentinel threshold used by producers to flag broken line points
//! - Core type aliases (`Vec3`, `TrajectorySet`, `StressSampleSet`)
//!
//! These definitions are shared by the loaders, the normalization pipeline and the
//! statistics helpers.

use nalgebra::Vector3;

use crate::trajectory::{StressLine, Trajectory};

// -------------------------------------------------------------------------------------------------
// File-format constants
// -------------------------------------------------------------------------------------------------

/// Only supported version tag of the `.binlines` binary format.
pub const LINE_FILE_FORMAT_VERSION: u32 = 1;

/// Any position component whose magnitude exceeds this value marks a broken point.
pub const SENTINEL_MAX_VALUE: f32 = 1e10;

/// Number of stress values stored per point in the `.dat` format
/// (`major, dir×3, medium, dir×3, minor, dir×3`).
pub const STRESS_VALUES_PER_POINT: usize = 12;

/// Default Parquet record batch size used by the columnar reader.
pub const DEFAULT_COLUMNAR_BATCH_SIZE: usize = 8192;

/// Sub-directory of the data directory holding line data sets.
pub const LINE_DATA_SETS_DIRECTORY: &str = "LineDataSets";

/// Standard transform applied to data sets produced by the stress line tracer.
pub const STRESS_LINE_TRANSFORM: &str = "rotate(270°, 1, 0, 0)";

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Single precision 3D vector, the storage type of every position and eigenvector.
pub type Vec3 = Vector3<f32>;

/// Ordered set of trajectories (insertion order = line index).
pub type TrajectorySet = Vec<Trajectory>;

/// Stress samples of a [`TrajectorySet`], index-aligned 1:1 with its trajectories.
pub type StressSampleSet = Vec<StressLine>;
