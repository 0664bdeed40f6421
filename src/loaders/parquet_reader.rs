//! # Columnar line reader (Apache Parquet)
//!
//! Columnar scientific arrays are read through the [`ColumnarReader`] trait, so the
//! load pipeline only depends on its output contract: one [`TrajectorySet`] whose
//! trajectories all carry the same attribute channels. [`ParquetColumnarReader`] is
//! the default backend.
//!
//! ## Expected Parquet Schema
//! -----------------
//! - `line_id: UInt32`: grouping key; lines appear in first-appearance order.
//! - `x`, `y`, `z: Float32 | Float64`: point position.
//! - every other `Float32 | Float64` leaf column: one attribute channel, in schema order.
//!
//! Columns of any other type are not projected. Points keep their row order within a line.
//!
//! ## Null Handling Policy
//! -----------------
//! Rows with a null in `line_id`, a coordinate or an attribute column are **skipped**.
//!
//! ## Error Handling
//! -----------------
//! - The file cannot be opened → [`LineDataError::IoError`].
//! - The payload is not Parquet, or lacks the required columns →
//!   [`FormatError::Unsupported`]. A NetCDF file routed here therefore fails cleanly.
use std::{collections::HashMap, fs::File};

use ahash::RandomState;
use arrow_array::{Array, Float32Array, Float64Array, RecordBatch, UInt32Array};
use camino::Utf8Path;
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ProjectionMask},
    basic::Type as PhysicalType,
};
use tracing::debug;

use crate::{
    constants::{TrajectorySet, Vec3, DEFAULT_COLUMNAR_BATCH_SIZE},
    line_errors::{FormatError, LineDataError},
    trajectory::Trajectory,
};

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

const LINE_ID_COLUMN: &str = "line_id";
const POSITION_COLUMNS: [&str; 3] = ["x", "y", "z"];

/// Adapter to an external columnar array reader.
///
/// Implementations return a [`TrajectorySet`] with a consistent number of attribute
/// channels, or [`FormatError::Unsupported`] when the payload is not line geometry.
pub trait ColumnarReader: Send + Sync {
    fn read(&self, path: &Utf8Path) -> Result<TrajectorySet, LineDataError>;
}

/// Parquet backend of [`ColumnarReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParquetColumnarReader {
    pub batch_size: usize,
}

impl Default for ParquetColumnarReader {
    fn default() -> Self {
        ParquetColumnarReader {
            batch_size: DEFAULT_COLUMNAR_BATCH_SIZE,
        }
    }
}

impl ParquetColumnarReader {
    pub fn new(batch_size: Option<usize>) -> Self {
        ParquetColumnarReader {
            batch_size: batch_size.unwrap_or(DEFAULT_COLUMNAR_BATCH_SIZE),
        }
    }
}

fn unsupported(msg: impl Into<String>) -> FormatError {
    FormatError::Unsupported(msg.into())
}

/// Typed view over a float column, downcast once per batch.
enum FloatColumn<'a> {
    F32(&'a Float32Array),
    F64(&'a Float64Array),
}

impl<'a> FloatColumn<'a> {
    fn from_array(array: &'a dyn Array) -> Option<Self> {
        let any = array.as_any();
        any.downcast_ref::<Float32Array>()
            .map(FloatColumn::F32)
            .or_else(|| any.downcast_ref::<Float64Array>().map(FloatColumn::F64))
    }

    fn is_null(&self, i: usize) -> bool {
        match self {
            FloatColumn::F32(a) => a.is_null(i),
            FloatColumn::F64(a) => a.is_null(i),
        }
    }

    fn value(&self, i: usize) -> f32 {
        match self {
            FloatColumn::F32(a) => a.value(i),
            FloatColumn::F64(a) => a.value(i) as f32,
        }
    }
}

/// Accumulates rows into trajectories keyed by line id.
struct LineAccumulator {
    line_index: FastHashMap<u32, usize>,
    trajectories: TrajectorySet,
    attribute_names: Option<Vec<String>>,
}

impl LineAccumulator {
    fn new() -> Self {
        LineAccumulator {
            line_index: FastHashMap::default(),
            trajectories: TrajectorySet::new(),
            attribute_names: None,
        }
    }

    fn push_batch(&mut self, batch: &RecordBatch) -> Result<(), FormatError> {
        let schema = batch.schema();

        let line_ids = batch
            .column_by_name(LINE_ID_COLUMN)
            .ok_or_else(|| unsupported(format!("column '{LINE_ID_COLUMN}' not found")))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| unsupported(format!("{LINE_ID_COLUMN} must be UInt32Array")))?;

        let mut position_columns = Vec::with_capacity(3);
        for name in POSITION_COLUMNS {
            let array = batch
                .column_by_name(name)
                .ok_or_else(|| unsupported(format!("column '{name}' not found")))?;
            let column = FloatColumn::from_array(array.as_ref())
                .ok_or_else(|| unsupported(format!("{name} must be a float column")))?;
            position_columns.push(column);
        }

        let mut attribute_names = Vec::new();
        let mut attribute_columns = Vec::new();
        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            if field.name() == LINE_ID_COLUMN || POSITION_COLUMNS.contains(&field.name().as_str())
            {
                continue;
            }
            if let Some(column) = FloatColumn::from_array(array.as_ref()) {
                attribute_names.push(field.name().clone());
                attribute_columns.push(column);
            }
        }

        match &self.attribute_names {
            None => self.attribute_names = Some(attribute_names),
            Some(names) if *names != attribute_names => {
                return Err(unsupported("attribute columns differ between record batches"));
            }
            Some(_) => {}
        }

        for row in 0..batch.num_rows() {
            if line_ids.is_null(row)
                || position_columns.iter().any(|c| c.is_null(row))
                || attribute_columns.iter().any(|c| c.is_null(row))
            {
                continue;
            }

            let num_attributes = attribute_columns.len();
            let trajectories = &mut self.trajectories;
            let idx = *self
                .line_index
                .entry(line_ids.value(row))
                .or_insert_with(|| {
                    trajectories.push(Trajectory::with_capacity(32, num_attributes));
                    trajectories.len() - 1
                });

            let trajectory = &mut self.trajectories[idx];
            trajectory.positions.push(Vec3::new(
                position_columns[0].value(row),
                position_columns[1].value(row),
                position_columns[2].value(row),
            ));
            for (channel, column) in trajectory.attributes.iter_mut().zip(&attribute_columns) {
                channel.push(column.value(row));
            }
        }

        Ok(())
    }
}

impl ParquetColumnarReader {
    fn read_parquet(&self, path: &Utf8Path, file: File) -> Result<TrajectorySet, FormatError> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| unsupported(format!("not a Parquet file: {e}")))?;

        // Project the line id and every float leaf; the rest is never materialized.
        let schema_descr = builder.parquet_schema();
        let projection_indices: Vec<usize> = schema_descr
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, col)| {
                col.name() == LINE_ID_COLUMN
                    || matches!(
                        col.physical_type(),
                        PhysicalType::FLOAT | PhysicalType::DOUBLE
                    )
            })
            .map(|(idx, _)| idx)
            .collect();
        let mask = ProjectionMask::leaves(schema_descr, projection_indices);
        let column_names: Vec<String> = schema_descr
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let reader = builder
            .with_projection(mask)
            .with_batch_size(self.batch_size)
            .build()
            .map_err(|e| unsupported(e.to_string()))?;

        let mut accumulator = LineAccumulator::new();
        let mut num_batches = 0usize;
        for maybe_batch in reader {
            let batch = maybe_batch.map_err(|e| unsupported(e.to_string()))?;
            accumulator.push_batch(&batch)?;
            num_batches += 1;
        }

        if num_batches == 0 {
            // No rows: the schema alone tells whether this is line geometry.
            for name in std::iter::once(LINE_ID_COLUMN).chain(POSITION_COLUMNS) {
                if !column_names.iter().any(|c| c == name) {
                    return Err(unsupported(format!("column '{name}' not found")));
                }
            }
        }

        debug!(
            %path,
            batches = num_batches,
            lines = accumulator.trajectories.len(),
            attributes = ?accumulator.attribute_names,
            "decoded columnar line file"
        );
        Ok(accumulator.trajectories)
    }
}

impl ColumnarReader for ParquetColumnarReader {
    fn read(&self, path: &Utf8Path) -> Result<TrajectorySet, LineDataError> {
        let file = File::open(path).map_err(|e| LineDataError::io(path, e))?;
        self.read_parquet(path, file)
            .map_err(|e| LineDataError::format(path, e))
    }
}

#[cfg(test)]
mod parquet_reader_test {
    use std::sync::Arc;

    use arrow_array::{ArrayRef, StringArray};
    use camino::Utf8PathBuf;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_parquet(dir: &tempfile::TempDir, name: &str, batch: &RecordBatch) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        path
    }

    #[test]
    fn test_read_lines_grouped_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let batch = RecordBatch::try_from_iter(vec![
            (
                "line_id",
                Arc::new(UInt32Array::from(vec![7, 3, 7, 3, 7])) as ArrayRef,
            ),
            (
                "x",
                Arc::new(Float32Array::from(vec![0.0, 10.0, 1.0, 11.0, 2.0])) as ArrayRef,
            ),
            (
                "y",
                Arc::new(Float64Array::from(vec![0.0, 0.0, 0.0, 0.0, 0.0])) as ArrayRef,
            ),
            (
                "z",
                Arc::new(Float32Array::from(vec![1.0, 1.0, 1.0, 1.0, 1.0])) as ArrayRef,
            ),
            (
                "label",
                Arc::new(StringArray::from(vec!["a", "b", "c", "d", "e"])) as ArrayRef,
            ),
            (
                "speed",
                Arc::new(Float32Array::from(vec![0.5, 1.5, 0.6, 1.6, 0.7])) as ArrayRef,
            ),
        ])
        .unwrap();
        let path = write_parquet(&dir, "lines.parquet", &batch);

        let trajs = ParquetColumnarReader::new(Some(2)).read(&path).unwrap();
        assert_eq!(trajs.len(), 2);
        assert_eq!(
            trajs[0].positions,
            vec![
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(2.0, 0.0, 1.0)
            ]
        );
        assert_eq!(trajs[0].attributes, vec![vec![0.5, 0.6, 0.7]]);
        assert_eq!(trajs[1].attributes, vec![vec![1.5, 1.6]]);
    }

    #[test]
    fn test_null_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let batch = RecordBatch::try_from_iter(vec![
            (
                "line_id",
                Arc::new(UInt32Array::from(vec![Some(0), Some(0), None])) as ArrayRef,
            ),
            (
                "x",
                Arc::new(Float32Array::from(vec![Some(0.0), None, Some(2.0)])) as ArrayRef,
            ),
            ("y", Arc::new(Float32Array::from(vec![0.0, 1.0, 2.0])) as ArrayRef),
            ("z", Arc::new(Float32Array::from(vec![0.0, 1.0, 2.0])) as ArrayRef),
        ])
        .unwrap();
        let path = write_parquet(&dir, "nulls.parquet", &batch);

        let trajs = ParquetColumnarReader::default().read(&path).unwrap();
        assert_eq!(trajs.len(), 1);
        assert_eq!(trajs[0].positions, vec![Vec3::zeros()]);
        assert_eq!(trajs[0].num_attributes(), 0);
    }

    #[test]
    fn test_missing_column_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let batch = RecordBatch::try_from_iter(vec![
            ("line_id", Arc::new(UInt32Array::from(vec![0])) as ArrayRef),
            ("x", Arc::new(Float32Array::from(vec![0.0])) as ArrayRef),
        ])
        .unwrap();
        let path = write_parquet(&dir, "partial.parquet", &batch);

        let err = ParquetColumnarReader::default().read(&path).unwrap_err();
        assert_eq!(
            err.format_error(),
            Some(&FormatError::Unsupported("column 'y' not found".into()))
        );
    }

    #[test]
    fn test_non_parquet_payload_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("flow.nc")).unwrap();
        std::fs::write(&path, b"CDF\x01 not a parquet payload").unwrap();

        let err = ParquetColumnarReader::default().read(&path).unwrap_err();
        assert!(matches!(
            err.format_error(),
            Some(FormatError::Unsupported(_))
        ));
        assert_eq!(err.path(), Some(&path));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ParquetColumnarReader::default()
            .read(Utf8Path::new("does/not/exist.parquet"))
            .unwrap_err();
        assert!(matches!(
            err,
            LineDataError::IoError { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound
        ));
    }
}
