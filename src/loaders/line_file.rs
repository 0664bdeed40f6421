//! # Line file dispatch
//!
//! Entry points loading line data from file names, choosing the decoder by the
//! case-insensitive file suffix and running the requested normalization passes.
//!
//! ## Overview
//! -----------------
//! | Suffix               | Format                    | Decoder                                        |
//! |----------------------|---------------------------|------------------------------------------------|
//! | `.obj`               | [`LineFormat::TextMesh`]    | [`read_obj`]                                 |
//! | `.nc`, `.parquet`    | [`LineFormat::Columnar`]    | [`ColumnarReader`] (Parquet by default)      |
//! | `.binlines`          | [`LineFormat::BinaryLines`] | [`read_binlines`]                            |
//! | `.dat`               | [`LineFormat::StressText`]  | [`read_stress_dat`] (multi-set entry only)   |
//!
//! * [`load_lines`] – one file, one [`TrajectorySet`], single-set normalization.
//! * [`load_principal_stress_lines`] – several `.dat` files plus optional hierarchy files,
//!   one [`PrincipalStressCollection`], joint normalization. Dispatch looks at the first
//!   file name only.
//!
//! The [`LineFile`] trait exposes the raw decoders as constructors on [`TrajectorySet`].
//!
//! ## Example
//! -----------------
//! ```no_run
//! use camino::Utf8Path;
//! use stresslines::load_params::LoadParams;
//! use stresslines::loaders::line_file::{load_lines, load_principal_stress_lines};
//!
//! # fn demo() -> Result<(), stresslines::line_errors::LineDataError> {
//! let lines = load_lines(Utf8Path::new("flow.binlines"), &LoadParams::new())?;
//! println!("{} lines", lines.len());
//!
//! let stress = load_principal_stress_lines(
//!     &["major.dat", "medium.dat", "minor.dat"].map(Utf8Path::new),
//!     &[],
//!     &LoadParams::new(),
//! )?;
//! println!("{} directions", stress.num_stress_directions());
//! # Ok(())
//! # }
//! ```
use camino::Utf8Path;
use tracing::debug;

use crate::{
    constants::TrajectorySet,
    line_errors::{FormatError, LineDataError},
    load_params::LoadParams,
    loaders::{
        binlines_reader::{read_binlines, write_binlines},
        obj_reader::read_obj,
        parquet_reader::{ColumnarReader, ParquetColumnarReader},
        stress_dat_reader::read_stress_dat,
    },
    normalization::{normalize_collection, normalize_set, Normalized},
    trajectory::PrincipalStressCollection,
};

/// Closed set of supported line file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineFormat {
    TextMesh,
    Columnar,
    BinaryLines,
    StressText,
}

impl LineFormat {
    /// Format of `path` from its suffix, ignoring case.
    pub fn from_path(path: &Utf8Path) -> Option<LineFormat> {
        let extension = path.extension()?.to_ascii_lowercase();
        match extension.as_str() {
            "obj" => Some(LineFormat::TextMesh),
            "nc" | "parquet" => Some(LineFormat::Columnar),
            "binlines" => Some(LineFormat::BinaryLines),
            "dat" => Some(LineFormat::StressText),
            _ => None,
        }
    }
}

fn unknown_extension(path: &Utf8Path) -> LineDataError {
    LineDataError::format(
        path,
        FormatError::UnknownExtension(path.extension().unwrap_or_default().to_string()),
    )
}

/// Decode a single line file without normalizing it.
///
/// Return
/// ----------
/// * `Err(LineDataError::FormatError)` with [`FormatError::UnknownExtension`] for a suffix
///   other than `.obj`, `.nc`, `.parquet` and `.binlines` (`.dat` included, stress files
///   go through [`load_principal_stress_lines`]).
pub fn read_lines(
    path: &Utf8Path,
    columnar: &dyn ColumnarReader,
) -> Result<TrajectorySet, LineDataError> {
    let format = LineFormat::from_path(path);
    debug!(%path, ?format, "dispatching line file");

    match format {
        Some(LineFormat::TextMesh) => read_obj(path),
        Some(LineFormat::Columnar) => columnar.read(path),
        Some(LineFormat::BinaryLines) => read_binlines(path),
        Some(LineFormat::StressText) | None => Err(unknown_extension(path)),
    }
}

/// Load and normalize one line set, with the Parquet backend for columnar files.
///
/// Arguments
/// -----------------
/// * `path` – Line file; its suffix selects the decoder.
/// * `params` – Normalization passes, transform, worker pool and columnar batch size.
///
/// Return
/// ----------
/// * `Ok(Normalized<TrajectorySet>)` holding the normalized lines and their statistics.
/// * `Err(LineDataError)` naming the file on I/O or decode failure.
///
/// See also
/// ------------
/// * [`load_lines_with`] – Same with a caller-supplied [`ColumnarReader`].
pub fn load_lines(
    path: &Utf8Path,
    params: &LoadParams,
) -> Result<Normalized<TrajectorySet>, LineDataError> {
    load_lines_with(
        path,
        params,
        &ParquetColumnarReader::new(params.columnar_batch_size),
    )
}

pub fn load_lines_with(
    path: &Utf8Path,
    params: &LoadParams,
    columnar: &dyn ColumnarReader,
) -> Result<Normalized<TrajectorySet>, LineDataError> {
    let trajectories = read_lines(path, columnar)?;
    normalize_set(trajectories, params)
}

/// Load and jointly normalize principal stress lines.
///
/// Arguments
/// -----------------
/// * `filenames` – One trajectory file per principal stress direction (at least one).
/// * `hierarchy_filenames` – Empty, or the companion hierarchy files.
/// * `params` – Normalization passes and transform, applied to all directions at once.
///
/// Return
/// ----------
/// * `Err(LineDataError::NoInputFiles)` when `filenames` is empty.
/// * `Err(LineDataError::FormatError)` with [`FormatError::UnknownExtension`] when the first
///   file name is not a `.dat` file.
/// * Any decode error of any file; the batch then fails as a whole.
pub fn load_principal_stress_lines<P: AsRef<Utf8Path>>(
    filenames: &[P],
    hierarchy_filenames: &[P],
    params: &LoadParams,
) -> Result<Normalized<PrincipalStressCollection>, LineDataError> {
    let first = filenames
        .first()
        .map(AsRef::as_ref)
        .ok_or(LineDataError::NoInputFiles)?;

    match LineFormat::from_path(first) {
        Some(LineFormat::StressText) => {
            let collection = read_stress_dat(filenames, hierarchy_filenames)?;
            normalize_collection(collection, params)
        }
        _ => Err(unknown_extension(first)),
    }
}

/// Raw decoders of the single-set formats as constructors on [`TrajectorySet`].
pub trait LineFile {
    fn new_from_obj(path: &Utf8Path) -> Result<Self, LineDataError>
    where
        Self: Sized;

    fn new_from_binlines(path: &Utf8Path) -> Result<Self, LineDataError>
    where
        Self: Sized;

    fn new_from_parquet(path: &Utf8Path, batch_size: Option<usize>) -> Result<Self, LineDataError>
    where
        Self: Sized;

    /// Write the set in the `.binlines` format.
    fn write_binlines(&self, path: &Utf8Path) -> Result<(), LineDataError>;
}

impl LineFile for TrajectorySet {
    fn new_from_obj(path: &Utf8Path) -> Result<Self, LineDataError> {
        read_obj(path)
    }

    fn new_from_binlines(path: &Utf8Path) -> Result<Self, LineDataError> {
        read_binlines(path)
    }

    fn new_from_parquet(path: &Utf8Path, batch_size: Option<usize>) -> Result<Self, LineDataError> {
        ParquetColumnarReader::new(batch_size).read(path)
    }

    fn write_binlines(&self, path: &Utf8Path) -> Result<(), LineDataError> {
        write_binlines(path, self)
    }
}
