pub mod aabb;
pub mod constants;
pub mod line_errors;
pub mod line_stats;
pub mod load_params;
pub mod loaders;
pub mod normalization;
pub mod stress_tracing;
pub mod trajectory;
pub mod transform_string;

pub use constants::{StressSampleSet, TrajectorySet, Vec3};
pub use line_errors::{FormatError, LineDataError};
pub use line_stats::{DirectionFilter, LineStats};
pub use load_params::{LineDataSettings, LoadParams};
pub use loaders::line_file::{load_lines, load_principal_stress_lines, LineFile, LineFormat};
pub use normalization::{NormalizationReport, Normalized};
pub use trajectory::{
    PrincipalStressCollection, PrincipalStressDirection, PrincipalStressLines, StressLine,
    StressSample, Trajectory,
};
