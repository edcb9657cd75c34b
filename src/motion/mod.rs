// Motion text module
// Parses exported SMPL pose and root-translation text files

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },

    #[error("Line {line}: expected {expected} values, found {found}")]
    Width {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Per-frame joint rotations and root translations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseTransSequence {
    pub poses: Vec<Vec<f32>>,
    pub transes: Vec<[f32; 3]>,
}

impl PoseTransSequence {
    /// Read the pose and translation files of one sequence
    pub fn from_files(pose_path: &Path, trans_path: &Path) -> Result<Self, MotionError> {
        let sequence = PoseTransSequence {
            poses: parse_pose_text(&read(pose_path)?)?,
            transes: parse_trans_text(&read(trans_path)?)?,
        };

        if !sequence.is_consistent() {
            log::warn!(
                "Pose/translation length mismatch: {} poses, {} translations",
                sequence.poses.len(),
                sequence.transes.len()
            );
        }

        Ok(sequence)
    }

    pub fn is_consistent(&self) -> bool {
        self.poses.len() == self.transes.len()
    }
}

fn read(path: &Path) -> Result<String, MotionError> {
    fs::read_to_string(path).map_err(|source| MotionError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// One pose per line; every line must carry the same number of values
pub fn parse_pose_text(text: &str) -> Result<Vec<Vec<f32>>, MotionError> {
    let mut width = None;
    let mut poses = Vec::new();

    for (line, values) in frame_lines(text) {
        let values = values?;
        let expected = *width.get_or_insert(values.len());
        if values.len() != expected {
            return Err(MotionError::Width {
                line,
                expected,
                found: values.len(),
            });
        }
        poses.push(values);
    }

    Ok(poses)
}

/// One `x y z` translation per line
pub fn parse_trans_text(text: &str) -> Result<Vec<[f32; 3]>, MotionError> {
    frame_lines(text)
        .map(|(line, values)| {
            let values = values?;
            match values.as_slice() {
                [x, y, z] => Ok([*x, *y, *z]),
                _ => Err(MotionError::Width {
                    line,
                    expected: 3,
                    found: values.len(),
                }),
            }
        })
        .collect()
}

/// Non-empty, non-comment lines with their 1-based line numbers
fn frame_lines(text: &str) -> impl Iterator<Item = (usize, Result<Vec<f32>, MotionError>)> + '_ {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| (line_no, parse_line(line_no, line)))
}

fn parse_line(line: usize, text: &str) -> Result<Vec<f32>, MotionError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<f32>().map_err(|_| MotionError::InvalidNumber {
                line,
                value: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_pose_whitespace_and_commas() {
        let text = "0.1 0.2 0.3 0.4\n0.5,0.6, 0.7,0.8\n";
        let poses = parse_pose_text(text).unwrap();

        assert_eq!(poses.len(), 2);
        assert_eq!(poses[1], vec![0.5, 0.6, 0.7, 0.8]);
    }

    #[test]
    fn test_parse_pose_skips_blank_and_comments() {
        let text = "# exported poses\n\n1 2\n   \n3 4\n";
        let poses = parse_pose_text(text).unwrap();
        assert_eq!(poses, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_parse_pose_width_mismatch_reports_line() {
        let text = "1 2 3\n# comment\n4 5\n";
        match parse_pose_text(text) {
            Err(MotionError::Width { line, expected, found }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected Width error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_trans() {
        let transes = parse_trans_text("0 1 2\n-1.5 0.25 3e-2\n").unwrap();
        assert_eq!(transes, vec![[0.0, 1.0, 2.0], [-1.5, 0.25, 0.03]]);
    }

    #[test]
    fn test_parse_trans_wrong_width() {
        assert!(matches!(
            parse_trans_text("0 1 2 3\n"),
            Err(MotionError::Width { line: 1, expected: 3, found: 4 })
        ));
    }

    #[test]
    fn test_invalid_number() {
        assert!(matches!(
            parse_trans_text("0 1 2\n0 nan? 2\n"),
            Err(MotionError::InvalidNumber { line: 2, .. })
        ));
    }

    #[test]
    fn test_from_files_allows_length_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let pose = temp_dir.path().join("seq_pose.txt");
        let trans = temp_dir.path().join("seq_trans.txt");
        fs::write(&pose, "0 0 0 0\n1 1 1 1\n2 2 2 2\n").unwrap();
        fs::write(&trans, "0 0 0\n1 1 1\n").unwrap();

        let sequence = PoseTransSequence::from_files(&pose, &trans).unwrap();

        assert_eq!(sequence.poses.len(), 3);
        assert_eq!(sequence.transes.len(), 2);
        assert!(!sequence.is_consistent());
    }

    #[test]
    fn test_from_files_missing() {
        let result =
            PoseTransSequence::from_files(Path::new("/no/pose.txt"), Path::new("/no/trans.txt"));
        assert!(matches!(result, Err(MotionError::Read { .. })));
    }
}
