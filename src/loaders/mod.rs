//! # Line data loaders
//!
//! Decoders turning line data files into the unified model of
//! [`trajectory`](crate::trajectory), and the dispatcher choosing one of them from the
//! file name.
//!
//! Modules
//! -----------------
//! * [`binlines_reader`](crate::loaders::binlines_reader) – Fixed-layout little-endian
//!   binary format (`.binlines`), decoder and encoder.
//! * [`obj_reader`](crate::loaders::obj_reader) – Text mesh polylines (`.obj`) with
//!   sentinel point filtering.
//! * [`stress_dat_reader`](crate::loaders::stress_dat_reader) – Principal stress line text
//!   format (`.dat`) and its companion hierarchy files.
//! * [`parquet_reader`](crate::loaders::parquet_reader) – Columnar adapter
//!   ([`ColumnarReader`](crate::loaders::parquet_reader::ColumnarReader)) with an Apache
//!   Parquet backend (`.nc`, `.parquet`).
//! * [`line_file`](crate::loaders::line_file) – Suffix-based dispatch, single-set and
//!   multi-set entry points, followed by normalization.
//! * *(crate-private)* `line_reader` – Line-by-line tokenizer of the `.dat` formats.
//!
//! Error Semantics
//! -----------------
//! Decoders work on in-memory buffers and return
//! [`FormatError`](crate::line_errors::FormatError); the file-level functions read the whole
//! file first and wrap failures into
//! [`LineDataError`](crate::line_errors::LineDataError) with the file name. No partial
//! result is returned on error.
pub mod binlines_reader;
pub mod line_file;
mod line_reader;
pub mod obj_reader;
pub mod parquet_reader;
pub mod stress_dat_reader;
