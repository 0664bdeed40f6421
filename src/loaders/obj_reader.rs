//! # Text mesh line reader (`.obj`)
//!
//! Line-oriented subset of the Wavefront OBJ format used by flow line producers:
//!
//! | Directive       | Meaning                                                    |
//! |-----------------|------------------------------------------------------------|
//! | `v x y z`       | Append a position to the global vertex pool                |
//! | `vt a`          | Append a scalar to the attribute pool (N-th `vt` ↔ N-th `v`)|
//! | `vn ...`        | Ignored (normals are not supported)                        |
//! | `l i1 i2 ...`   | One polyline from 1-based vertex pool indices              |
//! | `g ...`, `#...` | Ignored                                                    |
//!
//! Points whose position has a component with magnitude above
//! [`SENTINEL_MAX_VALUE`] are dropped from their polyline, position and attribute
//! alike; the remaining points keep their order.
//!
//! Malformed lines never abort the decode: missing `v`/`vt` components read as 0.0,
//! unusable `l` indices are skipped and a vertex without a matching `vt` gets 0.0.
//! Each of these recoveries is reported with a `tracing` warning.
use camino::Utf8Path;
use nom::{character::complete::space0, number::complete::float, sequence::preceded, Parser};
use tracing::{info, warn};

use crate::{
    constants::{TrajectorySet, Vec3, SENTINEL_MAX_VALUE},
    line_errors::LineDataError,
    line_stats::LineStats,
    trajectory::Trajectory,
};

/// Fill `out` with the leading floats of `input`; components that fail to parse stay 0.0.
/// Return the number of parsed components.
fn parse_floats(input: &str, out: &mut [f32]) -> usize {
    let mut rest = input;
    let mut parsed = 0;
    for slot in out.iter_mut() {
        match preceded(space0::<&str, nom::error::Error<&str>>, float).parse(rest) {
            Ok((remaining, value)) => {
                *slot = value;
                rest = remaining;
                parsed += 1;
            }
            Err(_) => break,
        }
    }
    parsed
}

fn is_sentinel(pos: &Vec3) -> bool {
    pos.iter().any(|c| c.abs() > SENTINEL_MAX_VALUE)
}

/// Decode the content of a text mesh line file.
///
/// Return
/// ----------
/// * One [`Trajectory`] per `l` directive, in file order, each with exactly one
///   attribute channel.
pub fn decode_obj(content: &str) -> TrajectorySet {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut vertex_attributes: Vec<f32> = Vec::new();
    let mut trajectories = TrajectorySet::new();
    let mut warned_missing_attribute = false;

    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim_start();
        let (command, args) = line
            .split_once(|c: char| c.is_ascii_whitespace())
            .unwrap_or((line, ""));

        match command {
            "v" => {
                let mut xyz = [0.0f32; 3];
                if parse_floats(args, &mut xyz) < 3 {
                    warn!(line = line_idx + 1, "incomplete vertex position");
                }
                vertices.push(Vec3::from(xyz));
            }
            "vt" => {
                let mut attr = [0.0f32; 1];
                if parse_floats(args, &mut attr) < 1 {
                    warn!(line = line_idx + 1, "missing vertex attribute value");
                }
                vertex_attributes.push(attr[0]);
            }
            "l" => {
                let indices: Vec<&str> = args.split_whitespace().collect();
                let mut trajectory = Trajectory::with_capacity(indices.len(), 1);
                let mut skipped = 0usize;

                for token in indices {
                    let index = match token.parse::<usize>() {
                        Ok(i) if i >= 1 && i <= vertices.len() => i - 1,
                        _ => {
                            skipped += 1;
                            continue;
                        }
                    };

                    let pos = vertices[index];
                    if is_sentinel(&pos) {
                        continue;
                    }

                    let attr = match vertex_attributes.get(index) {
                        Some(&a) => a,
                        None => {
                            if !warned_missing_attribute {
                                warn!(
                                    line = line_idx + 1,
                                    vertex = index + 1,
                                    "vertex has no attribute value, using 0.0"
                                );
                                warned_missing_attribute = true;
                            }
                            0.0
                        }
                    };

                    trajectory.positions.push(pos);
                    trajectory.attributes[0].push(attr);
                }

                if skipped > 0 {
                    warn!(
                        line = line_idx + 1,
                        skipped, "skipped invalid vertex indices in line directive"
                    );
                }
                trajectories.push(trajectory);
            }
            // "vn" normals, "g" groups, comments and blank lines
            _ => {}
        }
    }

    trajectories
}

/// Read and decode a text mesh line file.
///
/// Return
/// ----------
/// * `Err(LineDataError::IoError)` if the file cannot be read; there is no other failure.
pub fn read_obj(path: &Utf8Path) -> Result<TrajectorySet, LineDataError> {
    // Comments and group names may carry bytes that are not UTF-8.
    let bytes = std::fs::read(path).map_err(|e| LineDataError::io(path, e))?;
    let trajectories = decode_obj(&String::from_utf8_lossy(&bytes));
    info!(
        %path,
        lines = trajectories.len(),
        "Size of line geometry data (MiB): {:.3}",
        trajectories.geometry_byte_size() as f64 / (1024.0 * 1024.0)
    );
    Ok(trajectories)
}
