//! # Principal stress line reader (`.dat`)
//!
//! Text format written by the stress line tracer. A file is a sequence of blocks,
//! each block holding the lines of one principal stress direction:
//!
//! ```text
//! [ignored] <line count>          metadata: 1 or 2 tokens, the last one is the count
//! <line length n>                 then, per line:
//! x y z ...                       3·n position values
//! σ d_x d_y d_z ...               12·n stress values (major, medium, minor with directions)
//! v ...                           n von Mises values (the single attribute channel)
//! ```
//!
//! Blocks are read until the file is exhausted. Blocks of all files map, in file
//! order, to the entries of the returned [`PrincipalStressCollection`]; which block is
//! which direction is the caller's knowledge, nothing here infers it from content.
//!
//! ## Hierarchy files
//! -----------------
//! Companion hierarchy files mirror the block framing but store one level per line.
//! They are matched positionally with the already decoded blocks. The whole hierarchy
//! input is parsed and validated against every block before any level is written, so a
//! [`FormatError::HierarchyMismatch`] leaves the stress samples untouched.
use camino::Utf8Path;
use tracing::{debug, info};

use crate::{
    constants::{Vec3, STRESS_VALUES_PER_POINT},
    line_errors::{FormatError, LineDataError},
    line_stats::LineStats,
    loaders::line_reader::{parse_token, LineReader},
    trajectory::{
        PrincipalStressCollection, PrincipalStressLines, StressLine, StressSample, Trajectory,
    },
};

/// Parse a block metadata line: `<count>` or `<ignored> <count>`.
fn read_block_line_count(reader: &mut LineReader<'_>) -> Result<usize, FormatError> {
    let (line, tokens) = reader.read_tokens("block metadata")?;
    match tokens.as_slice() {
        [count] | [_, count] => parse_token(count, line),
        _ => Err(FormatError::InvalidMetadata {
            line,
            tokens: tokens.len(),
        }),
    }
}

fn read_stress_line(
    reader: &mut LineReader<'_>,
) -> Result<(Trajectory, StressLine), FormatError> {
    let line_length: usize = reader.read_scalar("line length")?;

    let position_data: Vec<f32> = reader.read_record(line_length * 3, "line positions")?;
    let ps_data: Vec<f32> =
        reader.read_record(line_length * STRESS_VALUES_PER_POINT, "principal stresses")?;
    let von_mises_data: Vec<f32> = reader.read_record(line_length, "von Mises stresses")?;

    let positions = position_data
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();
    let samples = ps_data
        .chunks_exact(STRESS_VALUES_PER_POINT)
        .map(StressSample::from_record)
        .collect();

    Ok((
        Trajectory::new(positions, vec![von_mises_data]),
        StressLine {
            samples,
            hierarchy_level: None,
        },
    ))
}

/// Decode every block of one stress line file.
///
/// Return
/// ----------
/// * One [`PrincipalStressLines`] per block, in file order.
/// * `Err(FormatError)` on invalid metadata, short/long records, unparsable numbers
///   or a file ending inside a block.
pub fn decode_stress_dat(content: &str) -> Result<Vec<PrincipalStressLines>, FormatError> {
    let mut reader = LineReader::new(content);
    let mut blocks = Vec::new();

    while reader.is_line_left() {
        let num_lines = read_block_line_count(&mut reader)?;
        let mut trajectories = Vec::with_capacity(num_lines.min(1 << 16));
        let mut stress = Vec::with_capacity(num_lines.min(1 << 16));

        for _ in 0..num_lines {
            let (trajectory, stress_line) = read_stress_line(&mut reader)?;
            trajectories.push(trajectory);
            stress.push(stress_line);
        }

        debug!(block = blocks.len(), lines = num_lines, "decoded stress line block");
        blocks.push(PrincipalStressLines::new(trajectories, stress));
    }

    Ok(blocks)
}

/// Decode a hierarchy file into one list of line levels per block.
///
/// Arguments
/// -----------------
/// * `line_counts` – Line count of every decoded trajectory block.
/// * `first_block` – Index in `line_counts` of this file's first block.
///
/// Return
/// ----------
/// * `Err(FormatError::HierarchyMismatch)` as soon as a block declares a line count that
///   differs from its trajectory block, before any of its levels is read. A block past
///   the last trajectory block reports `expected = 0`.
pub fn decode_hierarchy_dat(
    content: &str,
    line_counts: &[usize],
    first_block: usize,
) -> Result<Vec<Vec<f32>>, FormatError> {
    let mut reader = LineReader::new(content);
    let mut blocks = Vec::new();

    while reader.is_line_left() {
        let block = first_block + blocks.len();
        let num_lines = read_block_line_count(&mut reader)?;
        let expected = line_counts.get(block).copied().unwrap_or(0);
        if block >= line_counts.len() || num_lines != expected {
            return Err(FormatError::HierarchyMismatch {
                block,
                expected,
                found: num_lines,
            });
        }

        let levels = (0..num_lines)
            .map(|_| reader.read_scalar::<f32>("line hierarchy level"))
            .collect::<Result<Vec<_>, _>>()?;
        blocks.push(levels);
    }

    Ok(blocks)
}

/// Check that `levels` matches `directions` block by block and line by line.
///
/// Return
/// ----------
/// * `Err((block, FormatError::HierarchyMismatch))` for the first mismatching block.
///   A missing block reports `found = 0`, a surplus block `expected = 0`.
fn check_hierarchy(
    directions: &[PrincipalStressLines],
    levels: &[Vec<f32>],
) -> Result<(), (usize, FormatError)> {
    let num_blocks = directions.len().max(levels.len());
    for block in 0..num_blocks {
        let expected = directions.get(block).map_or(0, |d| d.stress.len());
        let found = levels.get(block).map_or(0, |l| l.len());
        let present = block < directions.len() && block < levels.len();
        if !present || expected != found {
            return Err((
                block,
                FormatError::HierarchyMismatch {
                    block,
                    expected,
                    found,
                },
            ));
        }
    }
    Ok(())
}

/// Write the hierarchy levels into the stress lines. `levels` must have passed
/// `check_hierarchy`.
fn apply_hierarchy(directions: &mut [PrincipalStressLines], levels: Vec<Vec<f32>>) {
    for (direction, block_levels) in directions.iter_mut().zip(levels) {
        for (stress_line, level) in direction.stress.iter_mut().zip(block_levels) {
            stress_line.hierarchy_level = Some(level);
        }
    }
}

fn read_text(path: &Utf8Path) -> Result<String, LineDataError> {
    std::fs::read_to_string(path).map_err(|e| LineDataError::io(path, e))
}

/// Load principal stress lines from one or more `.dat` files plus optional hierarchy files.
///
/// Arguments
/// -----------------
/// * `filenames` – Trajectory files, read in order; their blocks become the collection entries.
/// * `hierarchy_filenames` – Hierarchy files (may be empty), matched positionally per block.
///
/// Return
/// ----------
/// * `Ok(PrincipalStressCollection)` with hierarchy levels set when hierarchy files were given.
/// * `Err(LineDataError)` naming the failed file; nothing is returned on error, the batch
///   fails as a whole.
pub fn read_stress_dat<P: AsRef<Utf8Path>>(
    filenames: &[P],
    hierarchy_filenames: &[P],
) -> Result<PrincipalStressCollection, LineDataError> {
    let mut directions = Vec::with_capacity(filenames.len());
    for path in filenames.iter().map(AsRef::as_ref) {
        let content = read_text(path)?;
        let blocks = decode_stress_dat(&content).map_err(|e| LineDataError::format(path, e))?;
        debug!(%path, blocks = blocks.len(), "decoded stress line file");
        directions.extend(blocks);
    }

    if !hierarchy_filenames.is_empty() {
        let line_counts: Vec<usize> = directions.iter().map(|d| d.stress.len()).collect();
        let mut levels = Vec::with_capacity(directions.len());
        let mut block_sources = Vec::with_capacity(directions.len());
        for path in hierarchy_filenames.iter().map(AsRef::as_ref) {
            let content = read_text(path)?;
            let blocks = decode_hierarchy_dat(&content, &line_counts, levels.len())
                .map_err(|e| LineDataError::format(path, e))?;
            block_sources.extend(std::iter::repeat(path).take(blocks.len()));
            levels.extend(blocks);
        }

        check_hierarchy(&directions, &levels).map_err(|(block, err)| {
            let path = block_sources
                .get(block)
                .or(block_sources.last())
                .copied()
                .unwrap_or_else(|| hierarchy_filenames[0].as_ref());
            LineDataError::format(path, err)
        })?;
        apply_hierarchy(&mut directions, levels);
    }

    let collection = PrincipalStressCollection::new(directions);
    info!(
        directions = collection.len(),
        lines = collection.num_lines(),
        "Size of line geometry data (MiB): {:.3}",
        collection.geometry_byte_size() as f64 / (1024.0 * 1024.0)
    );
    Ok(collection)
}
