//! Request/reply loop with the external stress line tracer, and the mesh list.
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    constants::STRESS_LINE_TRANSFORM,
    line_errors::LineDataError,
    load_params::LineDataSettings,
    stress_tracing::{
        data_set::{DataSetInformation, StressTracingReply},
        request::TracingSettings,
    },
    transform_string::parse_transform_string,
};

/// First entry of the mesh list, standing for a mesh file typed in by the user.
pub const LOCAL_FILE_ENTRY: &str = "Local file...";

/// Transport to a tracer process exchanging JSON messages.
///
/// Implementations own the process or channel; requests are queued without blocking and
/// replies are polled.
pub trait StressTracingWorker {
    fn queue_request_json(&mut self, request: Value) -> Result<(), LineDataError>;

    /// Next available reply, if any.
    fn reply_json(&mut self) -> Option<Value>;
}

/// Turns [`TracingSettings`] into tracer requests and tracer replies into
/// [`DataSetInformation`].
pub struct StressLineTracingRequester<W> {
    worker: W,
    settings: LineDataSettings,
    /// Settings of the last queued request, used to describe its reply.
    pending: Option<TracingSettings>,
}

impl<W: StressTracingWorker> StressLineTracingRequester<W> {
    pub fn new(worker: W, settings: LineDataSettings) -> Self {
        StressLineTracingRequester {
            worker,
            settings,
            pending: None,
        }
    }

    pub fn worker(&self) -> &W {
        &self.worker
    }

    /// Queue a request for `tracing`.
    ///
    /// Return
    /// ----------
    /// * `Ok(false)` if no mesh is selected, nothing is sent.
    /// * `Ok(true)` once the request is queued.
    pub fn request_new_data(&mut self, tracing: &TracingSettings) -> Result<bool, LineDataError> {
        let Some(request) = tracing.to_request(&self.settings) else {
            return Ok(false);
        };

        let json = serde_json::to_value(&request)?;
        debug!(request = %json, "queueing stress line tracing request");
        self.worker.queue_request_json(json)?;
        self.pending = Some(tracing.clone());
        Ok(true)
    }

    /// Poll the worker for a reply.
    ///
    /// Return
    /// ----------
    /// * `Ok(None)` while no reply is available.
    /// * `Ok(Some(DataSetInformation))` describing the traced lines, with the standard
    ///   stress line transform.
    /// * `Err(LineDataError::JsonError)` if the reply is not a valid tracer reply.
    pub fn poll_new_data(&mut self) -> Result<Option<DataSetInformation>, LineDataError> {
        let Some(json) = self.worker.reply_json() else {
            return Ok(None);
        };
        let reply: StressTracingReply = serde_json::from_value(json)?;

        let requested = self.pending.clone().unwrap_or_default();
        let name = requested.mesh_name.clone().unwrap_or_else(|| {
            Utf8Path::new(&requested.mesh_filename)
                .file_stem()
                .unwrap_or_default()
                .to_string()
        });
        let mesh_filename =
            (!requested.mesh_filename.is_empty()).then_some(requested.mesh_filename);
        let transform = parse_transform_string(STRESS_LINE_TRANSFORM)?;

        let info = DataSetInformation::from_reply(
            reply,
            name,
            mesh_filename,
            &self.settings,
            Some(transform),
        );
        info!(
            data_set = %info.name,
            files = info.filenames.len(),
            "received traced stress line data set"
        );
        Ok(Some(info))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshEntry {
    pub name: String,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
struct MeshListFile {
    #[serde(default)]
    meshes: Vec<MeshEntry>,
}

/// Meshes available for tracing, from `LineDataSets/meshes.json`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshList {
    pub entries: Vec<MeshEntry>,
}

impl MeshList {
    /// Read the mesh list; a missing `meshes.json` gives an empty list.
    pub fn load(settings: &LineDataSettings) -> Result<Self, LineDataError> {
        let path: Utf8PathBuf = settings.resolve("meshes.json");
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MeshList::default()),
            Err(e) => return Err(LineDataError::io(path, e)),
        };
        let file: MeshListFile = serde_json::from_str(&content)?;
        debug!(%path, meshes = file.meshes.len(), "loaded mesh list");
        Ok(MeshList {
            entries: file.meshes,
        })
    }

    /// Display names, starting with [`LOCAL_FILE_ENTRY`].
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(LOCAL_FILE_ENTRY)
            .chain(self.entries.iter().map(|e| e.name.as_str()))
            .collect()
    }

    /// Tracing settings for the entry at `index` of [`Self::names`];
    /// `None` for the local file entry or an out-of-range index.
    pub fn select(&self, index: usize, base: &TracingSettings) -> Option<TracingSettings> {
        let entry = self.entries.get(index.checked_sub(1)?)?;
        Some(TracingSettings {
            mesh_filename: entry.filename.clone(),
            mesh_name: Some(entry.name.clone()),
            ..base.clone()
        })
    }
}
