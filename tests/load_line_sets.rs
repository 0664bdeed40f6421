mod common;

use std::{fs::File, sync::Arc};

use approx::assert_relative_eq;
use arrow_array::{ArrayRef, Float64Array, RecordBatch, UInt32Array};
use common::{assert_points_close, line, sample_set, Fixture};
use parquet::arrow::ArrowWriter;
use stresslines::{
    load_lines,
    normalization::{bounding_box, normalize_collection, normalize_set},
    stress_tracing::{DataSetInformation, LoadedLines},
    transform_string::parse_transform_string,
    FormatError, LineDataError, LineFile, LoadParams, PrincipalStressCollection,
    PrincipalStressLines, StressLine, TrajectorySet, Vec3,
};

#[test]
fn test_binlines_file_round_trip() {
    let fixture = Fixture::new();
    let path = fixture.path("lines.binlines");
    sample_set().write_binlines(&path).unwrap();

    let raw = load_lines(&path, &LoadParams::raw()).unwrap();
    assert_eq!(*raw.lines(), sample_set());

    let decoded = TrajectorySet::new_from_binlines(&path).unwrap();
    assert_eq!(decoded, sample_set());
}

#[test]
fn test_positions_fit_centered_unit_cube() {
    let fixture = Fixture::new();
    let path = fixture.path("LINES.BINLINES");
    sample_set().write_binlines(&path).unwrap();

    let normalized = load_lines(&path, &LoadParams::new()).unwrap();
    let aabb = bounding_box(&normalized);
    assert_relative_eq!(aabb.center(), Vec3::zeros(), epsilon = 1e-6);

    let dims = aabb.dimensions();
    assert_relative_eq!(dims.max(), 1.0, epsilon = 1e-6);
    assert!(dims.iter().all(|d| *d <= 1.0 + 1e-6));

    let positions = normalized.report().positions.unwrap();
    assert_eq!(positions.translation, Vec3::new(-3.0, -3.0, -3.5));
    assert_relative_eq!(positions.scale, 0.25);
}

#[test]
fn test_attributes_rescaled_to_unit_range() {
    let fixture = Fixture::new();
    let path = fixture.path("lines.binlines");
    sample_set().write_binlines(&path).unwrap();

    let normalized = load_lines(&path, &LoadParams::new()).unwrap();
    assert_eq!(normalized[0].attributes[0], vec![0.0, 0.125, 0.25]);
    assert_eq!(normalized[1].attributes[0], vec![1.0]);
    assert_eq!(normalized[0].attributes[1], vec![0.0, 0.5, 1.0]);
    assert_eq!(normalized[1].attributes[1], vec![0.625]);

    for trajectory in normalized.iter() {
        assert!(trajectory
            .attributes
            .iter()
            .flatten()
            .all(|v| (0.0..=1.0).contains(v)));
    }
}

#[test]
fn test_single_point_set_is_only_translated() {
    let fixture = Fixture::new();
    let path = fixture.path("point.binlines");
    vec![line(&[[7.0, -1.0, 2.5]], &[])]
        .write_binlines(&path)
        .unwrap();

    let normalized = load_lines(&path, &LoadParams::new()).unwrap();
    let positions = normalized.report().positions.unwrap();
    assert_eq!(positions.scale, 1.0);
    assert_eq!(positions.translation, Vec3::new(-7.0, 1.0, -2.5));
    assert_eq!(normalized[0].positions, vec![Vec3::zeros()]);
}

#[test]
fn test_transform_after_normalization() {
    let fixture = Fixture::new();
    let path = fixture.path("lines.binlines");
    sample_set().write_binlines(&path).unwrap();

    let params = LoadParams::builder()
        .transform(parse_transform_string("scale(2)").unwrap())
        .num_threads(2)
        .build()
        .unwrap();
    let normalized = load_lines(&path, &params).unwrap();
    assert_points_close(
        &normalized[0].positions,
        &[
            Vec3::new(-1.0, -0.5, -0.25),
            Vec3::new(1.0, -0.5, -0.25),
            Vec3::new(1.0, 0.5, -0.25),
        ],
    );
}

#[test]
fn test_obj_sentinel_points_dropped() {
    let fixture = Fixture::new();
    let path = fixture.write(
        "flow.OBJ",
        "# producer output\nv 0 0 0\nv 2e10 1 1\nv 1 1 1\nvt 0.5\nvt 9\nvt 1.5\nl 1 2 3\n",
    );

    let lines = load_lines(&path, &LoadParams::raw()).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].len(), 2);
    assert_eq!(
        lines[0].positions,
        vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)]
    );
    assert_eq!(lines[0].attributes, vec![vec![0.5, 1.5]]);
}

#[test]
fn test_obj_with_latin1_comment() {
    let fixture = Fixture::new();
    let mut content = b"# caf\xe9 producer\n".to_vec();
    content.extend_from_slice(b"v 0 0 0\nv 1 2 3\nvt 4\nvt 5\nl 1 2\n");
    let path = fixture.write("latin1.obj", content);

    let lines = load_lines(&path, &LoadParams::raw()).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].positions[1], Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(lines[0].attributes, vec![vec![4.0, 5.0]]);
}

#[test]
fn test_missing_file_is_not_found() {
    let fixture = Fixture::new();
    let path = fixture.path("missing.obj");
    match load_lines(&path, &LoadParams::new()) {
        Err(LineDataError::IoError { path: p, source }) => {
            assert_eq!(p, path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected a NotFound I/O error, got {other:?}"),
    }
}

#[test]
fn test_unknown_extension() {
    let fixture = Fixture::new();
    let path = fixture.write("points.xyz", "0 0 0\n");
    let err = load_lines(&path, &LoadParams::new()).unwrap_err();
    assert_eq!(
        err.format_error(),
        Some(&FormatError::UnknownExtension("xyz".into()))
    );
    assert_eq!(err.path(), Some(&path));
}

#[test]
fn test_columnar_files() {
    let fixture = Fixture::new();
    let path = fixture.path("lines.parquet");
    let batch = RecordBatch::try_from_iter(vec![
        ("line_id", Arc::new(UInt32Array::from(vec![1, 1, 2])) as ArrayRef),
        ("x", Arc::new(Float64Array::from(vec![0.0, 1.0, 2.0])) as ArrayRef),
        ("y", Arc::new(Float64Array::from(vec![0.0, 0.0, 0.0])) as ArrayRef),
        ("z", Arc::new(Float64Array::from(vec![0.0, 0.0, 0.0])) as ArrayRef),
        ("vorticity", Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])) as ArrayRef),
    ])
    .unwrap();
    let mut writer =
        ArrowWriter::try_new(File::create(&path).unwrap(), batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let lines = load_lines(&path, &LoadParams::raw()).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].attributes, vec![vec![1.0, 2.0]]);
    assert_eq!(lines[1].positions, vec![Vec3::new(2.0, 0.0, 0.0)]);

    let nc = fixture.write("flow.nc", b"CDF\x01\x00\x00\x00\x00");
    assert!(matches!(
        load_lines(&nc, &LoadParams::new())
            .unwrap_err()
            .format_error(),
        Some(FormatError::Unsupported(_))
    ));
}

#[test]
fn test_joint_of_one_set_matches_single_set() {
    let set = sample_set();
    let stress: Vec<StressLine> = set
        .iter()
        .map(|t| StressLine {
            samples: vec![Default::default(); t.len()],
            hierarchy_level: None,
        })
        .collect();
    let collection =
        PrincipalStressCollection::new(vec![PrincipalStressLines::new(set.clone(), stress)]);

    let single = normalize_set(set, &LoadParams::new()).unwrap();
    let joint = normalize_collection(collection, &LoadParams::new()).unwrap();

    assert_eq!(single.report(), joint.report());
    assert_eq!(*single.lines(), *joint.trajectories(0).unwrap());
}

#[test]
fn test_flow_data_set_information_load() {
    let fixture = Fixture::new();
    let path = fixture.path("rings.binlines");
    sample_set().write_binlines(&path).unwrap();

    let mut info = DataSetInformation::flow("rings", path.clone());
    info.transform = Some(parse_transform_string("translate(0, 2, 0)").unwrap());

    let Ok(LoadedLines::Flow(lines)) = info.load(&LoadParams::new()) else {
        panic!("expected flow lines");
    };
    assert_eq!(lines.len(), 3);
    assert_relative_eq!(
        bounding_box(&lines).center(),
        Vec3::new(0.0, 2.0, 0.0),
        epsilon = 1e-6
    );
}
