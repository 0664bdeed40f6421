//! Replies of the stress line tracer and the data set description built from them.
use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use crate::{
    constants::TrajectorySet,
    line_errors::LineDataError,
    load_params::{LineDataSettings, LoadParams},
    loaders::line_file::{load_lines, load_principal_stress_lines},
    normalization::Normalized,
    trajectory::PrincipalStressCollection,
};

/// Attribute display names of tracer output when the reply does not list any.
pub const DEFAULT_STRESS_ATTRIBUTE_NAMES: [&str; 8] = [
    "Principal Stress",
    "von Mises Stress",
    "Normal Stress (xx)",
    "Normal Stress (yy)",
    "Normal Stress (zz)",
    "Shear Stress (yz)",
    "Shear Stress (zx)",
    "Shear Stress (xy)",
];

/// Version tag of data sets produced by the tracer.
pub const TRACED_DATA_SET_VERSION: u32 = 3;

/// A JSON value that is either a single item or an array of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTracingReply {
    #[serde(rename = "fileName")]
    pub file_name: OneOrMany<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<OneOrMany<String>>,
    #[serde(
        default,
        rename = "degeneratePoints",
        alias = "degenerate_points",
        skip_serializing_if = "Option::is_none"
    )]
    pub degenerate_points: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSetType {
    /// One line file read by the single-set loader.
    Flow,
    /// Principal stress `.dat` files read by the multi-set loader.
    StressLines,
}

/// Lines of a loaded data set, by [`DataSetType`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedLines {
    Flow(Normalized<TrajectorySet>),
    StressLines(Normalized<PrincipalStressCollection>),
}

/// Everything needed to load one data set.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSetInformation {
    pub name: String,
    pub kind: DataSetType,
    pub version: u32,
    /// Trajectory files, one per principal stress direction for stress line data.
    pub filenames: Vec<Utf8PathBuf>,
    pub hierarchy_filenames: Vec<Utf8PathBuf>,
    pub attribute_names: Vec<String>,
    pub degenerate_points_filename: Option<Utf8PathBuf>,
    /// Mesh the lines were traced in, relative to the `LineDataSets` directory.
    pub mesh_filename: Option<String>,
    /// Applied to the positions after normalization.
    pub transform: Option<Matrix4<f32>>,
}

impl DataSetInformation {
    /// Data set description of a tracer reply.
    ///
    /// Arguments
    /// -----------------
    /// * `reply` – Decoded tracer reply.
    /// * `name` – Display name of the data set.
    /// * `mesh_filename` – Mesh the request was made for.
    /// * `settings` – Resolves the degenerate points file under `LineDataSets`.
    /// * `transform` – Custom transform of the data set.
    pub fn from_reply(
        reply: StressTracingReply,
        name: String,
        mesh_filename: Option<String>,
        settings: &LineDataSettings,
        transform: Option<Matrix4<f32>>,
    ) -> Self {
        let attribute_names = match reply.attributes {
            Some(names) => names.into_vec(),
            None => DEFAULT_STRESS_ATTRIBUTE_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        DataSetInformation {
            name,
            kind: DataSetType::StressLines,
            version: TRACED_DATA_SET_VERSION,
            filenames: reply
                .file_name
                .into_vec()
                .into_iter()
                .map(Utf8PathBuf::from)
                .collect(),
            hierarchy_filenames: Vec::new(),
            attribute_names,
            degenerate_points_filename: reply.degenerate_points.map(|f| settings.resolve(f)),
            mesh_filename,
            transform,
        }
    }

    /// Description of a flow line data set stored in one file.
    pub fn flow(name: impl Into<String>, filename: impl Into<Utf8PathBuf>) -> Self {
        DataSetInformation {
            name: name.into(),
            kind: DataSetType::Flow,
            version: 1,
            filenames: vec![filename.into()],
            hierarchy_filenames: Vec::new(),
            attribute_names: Vec::new(),
            degenerate_points_filename: None,
            mesh_filename: None,
            transform: None,
        }
    }

    /// Load the lines of the data set.
    ///
    /// Flow data sets go through [`load_lines`] with their first file, stress line data
    /// sets through [`load_principal_stress_lines`] with all files. The data set
    /// transform, when present, replaces the one of `params`.
    pub fn load(&self, params: &LoadParams) -> Result<LoadedLines, LineDataError> {
        let mut params = params.clone();
        if self.transform.is_some() {
            params.transform = self.transform;
        }

        match self.kind {
            DataSetType::Flow => {
                let path = self.filenames.first().ok_or(LineDataError::NoInputFiles)?;
                load_lines(path, &params).map(LoadedLines::Flow)
            }
            DataSetType::StressLines => {
                let filenames: Vec<&Utf8Path> =
                    self.filenames.iter().map(|p| p.as_path()).collect();
                let hierarchy: Vec<&Utf8Path> = self
                    .hierarchy_filenames
                    .iter()
                    .map(|p| p.as_path())
                    .collect();
                load_principal_stress_lines(&filenames, &hierarchy, &params)
                    .map(LoadedLines::StressLines)
            }
        }
    }
}
