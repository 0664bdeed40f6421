//! # Loading and normalization parameters
//!
//! [`LoadParams`] gathers every knob of the load pipeline: which normalization
//! passes run after decoding, the optional affine transform applied to the
//! normalized positions, the size of the worker pool used by the normalization
//! passes and the record batch size of the columnar reader.
//!
//! Use [`LoadParams::builder`] for a validated configuration:
//!
//! ```rust
//! use nalgebra::Matrix4;
//! use stresslines::load_params::LoadParams;
//!
//! let params = LoadParams::builder()
//!     .normalize_positions(true)
//!     .normalize_attributes(true)
//!     .transform(Matrix4::identity())
//!     .num_threads(4)
//!     .build()
//!     .unwrap();
//! assert_eq!(params.num_threads, Some(4));
//! ```
use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Matrix4;
use rayon::ThreadPool;

use crate::{constants::LINE_DATA_SETS_DIRECTORY, line_errors::LineDataError};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadParams {
    /// Center the line sets on the origin and fit them in a unit cube.
    pub normalize_positions: bool,
    /// Rescale every attribute channel to `[0, 1]`.
    pub normalize_attributes: bool,
    /// Applied to the positions after centering and scaling (`w = 1`).
    /// Only used when `normalize_positions` is set.
    pub transform: Option<Matrix4<f32>>,
    /// Size of a dedicated worker pool for the normalization passes.
    /// `None` runs them on the global rayon pool.
    pub num_threads: Option<usize>,
    /// Record batch size of the columnar reader.
    pub columnar_batch_size: Option<usize>,
}

impl Default for LoadParams {
    fn default() -> Self {
        LoadParams {
            normalize_positions: true,
            normalize_attributes: true,
            transform: None,
            num_threads: None,
            columnar_batch_size: None,
        }
    }
}

impl LoadParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters that leave the decoded data untouched.
    pub fn raw() -> Self {
        LoadParams {
            normalize_positions: false,
            normalize_attributes: false,
            ..Self::default()
        }
    }

    pub fn builder() -> LoadParamsBuilder {
        LoadParamsBuilder::new()
    }

    /// Build the dedicated worker pool requested by `num_threads`, if any.
    pub(crate) fn thread_pool(&self) -> Result<Option<ThreadPool>, LineDataError> {
        self.num_threads
            .map(|n| rayon::ThreadPoolBuilder::new().num_threads(n).build())
            .transpose()
            .map_err(LineDataError::from)
    }
}

/// Builder for [`LoadParams`], with validation.
#[derive(Debug, Clone)]
pub struct LoadParamsBuilder {
    params: LoadParams,
}

impl Default for LoadParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: LoadParams::default(),
        }
    }

    pub fn normalize_positions(mut self, v: bool) -> Self {
        self.params.normalize_positions = v;
        self
    }
    pub fn normalize_attributes(mut self, v: bool) -> Self {
        self.params.normalize_attributes = v;
        self
    }
    pub fn transform(mut self, v: Matrix4<f32>) -> Self {
        self.params.transform = Some(v);
        self
    }
    pub fn num_threads(mut self, v: usize) -> Self {
        self.params.num_threads = Some(v);
        self
    }
    pub fn columnar_batch_size(mut self, v: usize) -> Self {
        self.params.columnar_batch_size = Some(v);
        self
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ----------
    /// * `Err(LineDataError::InvalidLoadParameter)` when the worker pool or the batch size
    ///   is zero, or when the transform holds a NaN/infinite entry.
    pub fn build(self) -> Result<LoadParams, LineDataError> {
        let p = &self.params;

        if p.num_threads == Some(0) {
            return Err(LineDataError::InvalidLoadParameter(
                "num_threads must be >= 1".into(),
            ));
        }
        if p.columnar_batch_size == Some(0) {
            return Err(LineDataError::InvalidLoadParameter(
                "columnar_batch_size must be >= 1".into(),
            ));
        }
        if let Some(m) = &p.transform {
            if !m.iter().all(|v| v.is_finite()) {
                return Err(LineDataError::InvalidLoadParameter(
                    "transform entries must be finite".into(),
                ));
            }
        }

        Ok(self.params)
    }
}

/// Location of the application data on disk.
///
/// Passed explicitly to the components that resolve data set files (mesh list,
/// tracer replies); there is no process-wide settings instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDataSettings {
    pub data_directory: Utf8PathBuf,
}

impl LineDataSettings {
    pub fn new(data_directory: impl Into<Utf8PathBuf>) -> Self {
        LineDataSettings {
            data_directory: data_directory.into(),
        }
    }

    /// `<data directory>/LineDataSets`, where line data sets and `meshes.json` live.
    pub fn line_data_sets_directory(&self) -> Utf8PathBuf {
        self.data_directory.join(LINE_DATA_SETS_DIRECTORY)
    }

    /// Resolve a data set file name relative to [`Self::line_data_sets_directory`].
    /// Absolute names are returned unchanged.
    pub fn resolve(&self, filename: impl AsRef<Utf8Path>) -> Utf8PathBuf {
        self.line_data_sets_directory().join(filename)
    }
}
