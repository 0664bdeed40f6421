//! # Binary line reader and writer (`.binlines`)
//!
//! Fixed-layout little-endian container for line sets:
//!
//! ```text
//! u32 version              (only LINE_FILE_FORMAT_VERSION = 1)
//! u32 trajectory_count
//! u32 attribute_count
//! per trajectory:
//!     u32 point_count
//!     point_count × [f32; 3]          positions, packed
//!     attribute_count × point_count × f32
//!                                     one contiguous block per attribute
//! ```
//!
//! Decoding is a single sequential pass with `nom` parsers over the whole file
//! buffer. A buffer that ends before every declared record has been read fails with
//! [`FormatError::Truncated`]; trailing bytes after the last trajectory are ignored.
//!
//! [`encode_binlines`] writes the same layout and is the producer side of the format.
use camino::Utf8Path;
use nom::{
    multi::count,
    number::complete::{le_f32, le_u32},
    IResult, Parser,
};
use tracing::debug;

use crate::{
    constants::{TrajectorySet, Vec3, LINE_FILE_FORMAT_VERSION},
    line_errors::{FormatError, LineDataError},
    trajectory::Trajectory,
};

fn truncated(context: String) -> FormatError {
    FormatError::Truncated { context }
}

/// Parse one trajectory record: point count, packed positions, attribute blocks.
fn parse_trajectory(input: &[u8], num_attributes: usize) -> IResult<&[u8], Trajectory> {
    let (input, num_points) = le_u32(input)?;
    let num_points = num_points as usize;

    let (mut input, coords) = count(le_f32, num_points * 3).parse(input)?;
    let positions: Vec<Vec3> = coords
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();

    let mut attributes = Vec::with_capacity(num_attributes);
    for _ in 0..num_attributes {
        let (rest, values) = count(le_f32, num_points).parse(input)?;
        attributes.push(values);
        input = rest;
    }

    Ok((input, Trajectory::new(positions, attributes)))
}

/// Decode a `.binlines` buffer into a [`TrajectorySet`].
///
/// Arguments
/// -----------------
/// * `buffer` – Whole file content.
///
/// Return
/// ----------
/// * `Ok(TrajectorySet)` with `trajectory_count` trajectories of `attribute_count` channels.
/// * `Err(FormatError::UnsupportedVersion)` if the version tag is not 1.
/// * `Err(FormatError::Truncated)` if the buffer ends before a declared record.
pub fn decode_binlines(buffer: &[u8]) -> Result<TrajectorySet, FormatError> {
    let (input, version) = le_u32::<_, nom::error::Error<_>>(buffer)
        .map_err(|_| truncated("format version".into()))?;
    if version != LINE_FILE_FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let (mut input, (num_trajectories, num_attributes)) =
        (le_u32::<_, nom::error::Error<_>>, le_u32)
            .parse(input)
            .map_err(|_| truncated("header".into()))?;

    let mut trajectories = Vec::with_capacity((num_trajectories as usize).min(1 << 16));
    for trajectory_idx in 0..num_trajectories {
        let (rest, trajectory) = parse_trajectory(input, num_attributes as usize)
            .map_err(|_| truncated(format!("trajectory {trajectory_idx}")))?;
        trajectories.push(trajectory);
        input = rest;
    }

    if !input.is_empty() {
        debug!(
            trailing_bytes = input.len(),
            "ignoring trailing bytes after the last trajectory"
        );
    }

    Ok(trajectories)
}

/// Encode a [`TrajectorySet`] in the `.binlines` layout.
///
/// The attribute count of the header is taken from the first trajectory.
///
/// Return
/// ----------
/// * `Err(LineDataError::InconsistentAttributeCount)` if another trajectory carries a
///   different number of channels, since the format stores a single count.
pub fn encode_binlines(trajectories: &TrajectorySet) -> Result<Vec<u8>, LineDataError> {
    let num_attributes = trajectories.first().map_or(0, |t| t.num_attributes());

    let payload_size: usize = trajectories
        .iter()
        .map(|t| 4 + t.len() * 4 * (3 + num_attributes))
        .sum();
    let mut buffer = Vec::with_capacity(12 + payload_size);

    buffer.extend_from_slice(&LINE_FILE_FORMAT_VERSION.to_le_bytes());
    buffer.extend_from_slice(&(trajectories.len() as u32).to_le_bytes());
    buffer.extend_from_slice(&(num_attributes as u32).to_le_bytes());

    for (trajectory_idx, trajectory) in trajectories.iter().enumerate() {
        if trajectory.num_attributes() != num_attributes {
            return Err(LineDataError::InconsistentAttributeCount {
                trajectory: trajectory_idx,
                expected: num_attributes,
                found: trajectory.num_attributes(),
            });
        }
        buffer.extend_from_slice(&(trajectory.len() as u32).to_le_bytes());
        for pt in &trajectory.positions {
            for c in pt.iter() {
                buffer.extend_from_slice(&c.to_le_bytes());
            }
        }
        for channel in &trajectory.attributes {
            for v in channel {
                buffer.extend_from_slice(&v.to_le_bytes());
            }
        }
    }

    Ok(buffer)
}

/// Read and decode a `.binlines` file.
pub fn read_binlines(path: &Utf8Path) -> Result<TrajectorySet, LineDataError> {
    let buffer = std::fs::read(path).map_err(|e| LineDataError::io(path, e))?;
    let trajectories = decode_binlines(&buffer).map_err(|e| LineDataError::format(path, e))?;
    debug!(%path, lines = trajectories.len(), "decoded binary line file");
    Ok(trajectories)
}

/// Encode `trajectories` and write them to `path`.
pub fn write_binlines(path: &Utf8Path, trajectories: &TrajectorySet) -> Result<(), LineDataError> {
    let buffer = encode_binlines(trajectories)?;
    std::fs::write(path, buffer).map_err(|e| LineDataError::io(path, e))
}
