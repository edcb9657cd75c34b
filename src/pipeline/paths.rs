// Sequence path resolution
// Maps a sequence identifier onto every input and output file of a run

use std::fs;
use std::path::{Path, PathBuf};

use super::PipelineError;
use crate::config::PathRoots;

/// Every file touched by one run
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePaths {
    // Inputs
    pub video: PathBuf,
    pub in_cam: PathBuf,
    pub mvnx: PathBuf,
    pub pose_txt: PathBuf,
    pub trans_txt: PathBuf,

    /// Decoded audio, created on first use
    pub audio_cache: PathBuf,

    // Outputs
    pub sync_record: PathBuf,
    pub contacts: PathBuf,
    pub imu_dir: PathBuf,
    pub pose_trans: PathBuf,
    pub cam_dir: PathBuf,
    pub cam_filtered: PathBuf,
    pub cam_unfiltered: PathBuf,
    pub trace: PathBuf,
}

impl SequencePaths {
    /// Resolve all paths for `sequence`
    ///
    /// The video and the localization file are searched for recursively, so
    /// this fails with `FileNotFound` when either cannot be located.
    pub fn resolve(roots: &PathRoots, sequence: &str) -> Result<Self, PipelineError> {
        let video_name = format!("{}.mp4", sequence);
        let video = find_by_name(&roots.video, &video_name).ok_or_else(|| {
            PipelineError::FileNotFound {
                what: "video",
                path: roots.video.join(&video_name),
            }
        })?;

        let cam_name = format!("{}.json", sequence);
        let in_cam = find_by_name(&roots.in_cam, &cam_name).ok_or_else(|| {
            PipelineError::FileNotFound {
                what: "camera localization",
                path: roots.in_cam.join(&cam_name),
            }
        })?;

        let imu_dir = roots.imu.join(sequence);
        let cam_dir = roots.cam.join(sequence);

        Ok(SequencePaths {
            video,
            in_cam,
            mvnx: roots.mvnx.join(format!("{}.mvnx", sequence)),
            pose_txt: roots.txt.join(format!("{}_pose.txt", sequence)),
            trans_txt: roots.txt.join(format!("{}_trans.txt", sequence)),
            audio_cache: roots.audio.join(format!("{}.wav", sequence)),
            sync_record: roots.init_save.join(format!("{}.json", sequence)),
            contacts: roots.contact.join(format!("{}.json", sequence)),
            pose_trans: imu_dir.join("basic.json"),
            trace: imu_dir.join("trace.jsonl"),
            imu_dir,
            cam_filtered: cam_dir.join("filtered.json"),
            cam_unfiltered: cam_dir.join("unfiltered.json"),
            cam_dir,
        })
    }

    /// Fail on the first required input that does not exist
    pub fn check_inputs(&self) -> Result<(), PipelineError> {
        let inputs = [
            ("video", &self.video),
            ("camera localization", &self.in_cam),
            ("MVNX capture", &self.mvnx),
            ("pose text", &self.pose_txt),
            ("translation text", &self.trans_txt),
        ];

        for (what, path) in inputs {
            if !path.is_file() {
                return Err(PipelineError::FileNotFound {
                    what,
                    path: path.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Find a file named `name` anywhere under `root`
///
/// Names that merely end with `name` (e.g. `take2_<name>`) are accepted when
/// no exact match exists. Among equal candidates the first in path order wins.
pub fn find_by_name(root: &Path, name: &str) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = walk_files(root)
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.ends_with(name))
        })
        .collect();
    candidates.sort();

    let exact = candidates
        .iter()
        .position(|path| path.file_name().and_then(|f| f.to_str()) == Some(name));

    match exact {
        Some(idx) => Some(candidates.swap_remove(idx)),
        None => candidates.into_iter().next(),
    }
}

/// Regular files under `dir`; symlinked directories are not descended into
fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                files.extend(walk_files(&path));
            } else if file_type.is_symlink() {
                if path.is_file() {
                    files.push(path);
                }
            } else {
                files.push(path);
            }
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_find_nested_exact_match() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a").join("take2_seq.mp4"));
        touch(&root.join("b").join("c").join("seq.mp4"));
        touch(&root.join("seq.mp4.bak"));

        let found = find_by_name(root, "seq.mp4").unwrap();
        assert_eq!(found, root.join("b").join("c").join("seq.mp4"));
    }

    #[test]
    fn test_find_suffix_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("x").join("take2_seq.mp4"));

        assert_eq!(
            find_by_name(root, "seq.mp4").unwrap(),
            root.join("x").join("take2_seq.mp4")
        );
    }

    #[test]
    fn test_find_in_missing_root() {
        assert!(find_by_name(Path::new("/no/such/root"), "seq.mp4").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_cycle_is_not_followed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("day1").join("seq.mp4"));
        std::os::unix::fs::symlink(root, root.join("day1").join("loop")).unwrap();

        assert_eq!(walk_files(root), vec![root.join("day1").join("seq.mp4")]);
        assert_eq!(
            find_by_name(root, "seq.mp4").unwrap(),
            root.join("day1").join("seq.mp4")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_found() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let target = temp_dir.path().join("store").join("raw.mp4");
        touch(&target);
        fs::create_dir_all(root.join("videos")).unwrap();
        std::os::unix::fs::symlink(&target, root.join("videos").join("seq.mp4")).unwrap();

        assert_eq!(
            find_by_name(&root.join("videos"), "seq.mp4").unwrap(),
            root.join("videos").join("seq.mp4")
        );
    }

    #[test]
    fn test_resolve_layout() {
        let temp_dir = TempDir::new().unwrap();
        let roots = PathRoots::under(temp_dir.path());
        touch(&roots.video.join("day1").join("seq.mp4"));
        touch(&roots.in_cam.join("seq.json"));

        let paths = SequencePaths::resolve(&roots, "seq").unwrap();

        assert_eq!(paths.video, roots.video.join("day1").join("seq.mp4"));
        assert_eq!(paths.mvnx, roots.mvnx.join("seq.mvnx"));
        assert_eq!(paths.pose_txt, roots.txt.join("seq_pose.txt"));
        assert_eq!(paths.trans_txt, roots.txt.join("seq_trans.txt"));
        assert_eq!(paths.audio_cache, roots.audio.join("seq.wav"));
        assert_eq!(paths.sync_record, roots.init_save.join("seq.json"));
        assert_eq!(paths.contacts, roots.contact.join("seq.json"));
        assert_eq!(paths.pose_trans, roots.imu.join("seq").join("basic.json"));
        assert_eq!(paths.cam_filtered, roots.cam.join("seq").join("filtered.json"));
        assert_eq!(paths.cam_unfiltered, roots.cam.join("seq").join("unfiltered.json"));
    }

    #[test]
    fn test_resolve_without_video() {
        let temp_dir = TempDir::new().unwrap();
        let roots = PathRoots::under(temp_dir.path());
        touch(&roots.in_cam.join("seq.json"));

        match SequencePaths::resolve(&roots, "seq") {
            Err(PipelineError::FileNotFound { what, .. }) => assert_eq!(what, "video"),
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_check_inputs_reports_missing_mvnx() {
        let temp_dir = TempDir::new().unwrap();
        let roots = PathRoots::under(temp_dir.path());
        touch(&roots.video.join("seq.mp4"));
        touch(&roots.in_cam.join("seq.json"));

        let paths = SequencePaths::resolve(&roots, "seq").unwrap();
        match paths.check_inputs() {
            Err(PipelineError::FileNotFound { what, path }) => {
                assert_eq!(what, "MVNX capture");
                assert_eq!(path, paths.mvnx);
            }
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }
}
