//! Requests sent to the external stress line tracer.
//!
//! The tracer reads one JSON object per request. Numeric density and level controls
//! are either a number or the keyword `"default"`, which lets the tracer pick its own
//! value:
//!
//! ```json
//! {
//!   "fileName": "/data/LineDataSets/bracket.vtk",
//!   "lineDensCtrl": 12.0,
//!   "seedDensCtrl": "default",
//!   "numLevels": 3,
//!   "seedStrategy": "Volume",
//!   "selectedPrincipalStressField": [1, 3],
//!   "mergingOpt": true,
//!   "snappingOpt": false,
//!   "maxAngleDevi": 6,
//!   "multiMergingThresholds": [1.0, 1.0, 1.0],
//!   "traceAlgorithm": "RK2"
//! }
//! ```
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::{line_stats::DirectionFilter, load_params::LineDataSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultKeyword {
    #[serde(rename = "default")]
    Default,
}

/// A tracer control that is either set by the caller or left to the tracer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue<T> {
    Custom(T),
    Default(DefaultKeyword),
}

impl<T> ControlValue<T> {
    pub fn default_value() -> Self {
        ControlValue::Default(DefaultKeyword::Default)
    }

    /// `Custom(v)` for `Some(v)`, the `"default"` keyword otherwise.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or_else(Self::default_value, ControlValue::Custom)
    }

    pub fn custom(&self) -> Option<&T> {
        match self {
            ControlValue::Custom(v) => Some(v),
            ControlValue::Default(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeedStrategy {
    #[default]
    Volume,
    Surface,
    LoadingArea,
    ApproxTopology,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TracingAlgorithm {
    Euler,
    #[serde(rename = "RK2")]
    #[default]
    RungeKutta2,
    #[serde(rename = "RK4")]
    RungeKutta4,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressTracingRequest {
    pub file_name: Utf8PathBuf,
    pub line_dens_ctrl: ControlValue<f32>,
    pub seed_dens_ctrl: ControlValue<f32>,
    pub num_levels: ControlValue<u32>,
    pub seed_strategy: SeedStrategy,
    /// Tracer field ids: 1 = major, 2 = medium, 3 = minor.
    pub selected_principal_stress_field: Vec<u8>,
    pub merging_opt: bool,
    pub snapping_opt: bool,
    pub max_angle_devi: u32,
    pub multi_merging_thresholds: [f32; 3],
    pub trace_algorithm: TracingAlgorithm,
}

/// Caller-owned tracing options, turned into a [`StressTracingRequest`] per request.
#[derive(Debug, Clone, PartialEq)]
pub struct TracingSettings {
    /// Mesh file, relative to the `LineDataSets` directory.
    pub mesh_filename: String,
    /// Display name of the mesh when it was picked from the mesh list.
    pub mesh_name: Option<String>,
    /// `None` leaves the value to the tracer.
    pub line_density: Option<f32>,
    pub seed_density: Option<f32>,
    pub num_levels: Option<u32>,
    pub directions: DirectionFilter,
    pub seed_strategy: SeedStrategy,
    pub tracing_algorithm: TracingAlgorithm,
    pub max_angle_deviation: u32,
    pub merging: bool,
    pub snapping: bool,
    pub merging_thresholds: [f32; 3],
}

impl Default for TracingSettings {
    fn default() -> Self {
        TracingSettings {
            mesh_filename: String::new(),
            mesh_name: None,
            line_density: None,
            seed_density: None,
            num_levels: None,
            directions: DirectionFilter::all(),
            seed_strategy: SeedStrategy::default(),
            tracing_algorithm: TracingAlgorithm::default(),
            max_angle_deviation: 6,
            merging: false,
            snapping: false,
            merging_thresholds: [1.0; 3],
        }
    }
}

impl TracingSettings {
    /// Request for the current settings, or `None` while no mesh is selected.
    ///
    /// Non-positive densities and level counts are sent as `"default"`.
    pub fn to_request(&self, settings: &LineDataSettings) -> Option<StressTracingRequest> {
        if self.mesh_filename.is_empty() {
            return None;
        }

        Some(StressTracingRequest {
            file_name: settings.resolve(&self.mesh_filename),
            line_dens_ctrl: ControlValue::from_option(self.line_density.filter(|v| *v > 0.0)),
            seed_dens_ctrl: ControlValue::from_option(self.seed_density.filter(|v| *v > 0.0)),
            num_levels: ControlValue::from_option(self.num_levels.filter(|v| *v > 0)),
            seed_strategy: self.seed_strategy,
            selected_principal_stress_field: self
                .directions
                .directions()
                .into_iter()
                .map(|d| d.field_id())
                .collect(),
            merging_opt: self.merging,
            snapping_opt: self.snapping,
            max_angle_devi: self.max_angle_deviation,
            multi_merging_thresholds: self.merging_thresholds,
            trace_algorithm: self.tracing_algorithm,
        })
    }
}
