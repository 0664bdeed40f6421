//! # Stress line tracing boundary
//!
//! New principal stress line data sets are produced on demand by an external tracer
//! process. This module holds the messages exchanged with it and the glue turning its
//! output into loadable data sets; the tracer itself and its transport stay outside
//! the crate, behind [`StressTracingWorker`].
//!
//! Modules
//! -----------------
//! * [`request`] – [`StressTracingRequest`] (JSON request) and the caller-owned
//!   [`TracingSettings`] it is built from.
//! * [`data_set`] – [`StressTracingReply`] (JSON reply) and [`DataSetInformation`],
//!   whose [`load`](DataSetInformation::load) runs the multi-set loader.
//! * [`requester`] – [`StressLineTracingRequester`] and the [`MeshList`] of
//!   `LineDataSets/meshes.json`.
//!
//! Flow
//! -----------------
//! ```text
//! TracingSettings ──to_request──▶ StressTracingRequest ──JSON──▶ worker
//! worker ──JSON──▶ StressTracingReply ──▶ DataSetInformation ──load──▶ LoadedLines
//! ```
pub mod data_set;
pub mod request;
pub mod requester;

pub use data_set::{DataSetInformation, DataSetType, LoadedLines, StressTracingReply};
pub use request::{ControlValue, SeedStrategy, StressTracingRequest, TracingAlgorithm, TracingSettings};
pub use requester::{MeshEntry, MeshList, StressLineTracingRequester, StressTracingWorker};
