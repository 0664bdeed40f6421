#![allow(dead_code)]

use approx::assert_relative_eq;
use camino::Utf8PathBuf;
use stresslines::{Trajectory, TrajectorySet, Vec3};
use tempfile::TempDir;

/// Temporary directory holding the files of one test.
pub struct Fixture {
    _dir: TempDir,
    pub root: Utf8PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        Fixture { _dir: dir, root }
    }

    pub fn write(&self, name: &str, content: impl AsRef<[u8]>) -> Utf8PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

/// Stress `.dat` text of one block holding `lines`; the metadata line is `"<tag> <count>"`.
///
/// Point `i` of a line gets principal stresses `(i, -i, 0.5)`, axis-aligned directions
/// and a von Mises value of `10 * i`.
pub fn stress_block(tag: u32, lines: &[Vec<Vec3>]) -> String {
    let mut out = format!("{tag} {}\n", lines.len());
    for points in lines {
        out.push_str(&format!("{}\n", points.len()));

        let positions: Vec<String> = points
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .map(|v| v.to_string())
            .collect();
        out.push_str(&positions.join(" "));
        out.push('\n');

        let stress: Vec<String> = (0..points.len())
            .flat_map(|i| {
                let i = i as f32;
                [i, 1.0, 0.0, 0.0, -i, 0.0, 1.0, 0.0, 0.5, 0.0, 0.0, 1.0]
            })
            .map(|v| v.to_string())
            .collect();
        out.push_str(&stress.join(" "));
        out.push('\n');

        let von_mises: Vec<String> = (0..points.len()).map(|i| (10 * i).to_string()).collect();
        out.push_str(&von_mises.join(" "));
        out.push('\n');
    }
    out
}

/// Hierarchy text of one block with one level per line.
pub fn hierarchy_block(levels: &[f32]) -> String {
    let mut out = format!("{}\n", levels.len());
    for level in levels {
        out.push_str(&format!("{level}\n"));
    }
    out
}

pub fn line(points: &[[f32; 3]], attributes: &[&[f32]]) -> Trajectory {
    Trajectory::new(
        points.iter().map(|p| Vec3::from(*p)).collect(),
        attributes.iter().map(|a| a.to_vec()).collect(),
    )
}

pub fn sample_set() -> TrajectorySet {
    vec![
        line(
            &[[1.0, 2.0, 3.0], [5.0, 2.0, 3.0], [5.0, 4.0, 3.0]],
            &[&[0.0, 1.0, 2.0], &[-4.0, 0.0, 4.0]],
        ),
        line(&[[2.0, 3.0, 4.0]], &[&[8.0], &[1.0]]),
        line(&[], &[&[], &[]]),
    ]
}

pub fn assert_points_close(actual: &[Vec3], expected: &[Vec3]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(*a, *e, epsilon = 1e-6);
    }
}
