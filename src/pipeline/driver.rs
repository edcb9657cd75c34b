// Batch driver
// Runs every stage for one sequence in a fixed order and persists the results

use serde::Serialize;
use serde_json::json;
use std::path::Path;

use super::paths::SequencePaths;
use super::trace::{Stage, TraceEntry, TraceWriter};
use super::PipelineError;
use crate::audio::{AudioDecoder, FsAudioCache};
use crate::capture::{reformat_contacts, CaptureSource, MvnxReader};
use crate::config::Config;
use crate::motion::PoseTransSequence;
use crate::state::{
    describe_file, ensure_dir, store_record, ArtifactKind, RunSummary, StoredArtifact,
};
use crate::sync::{locate_cam_start, locate_imu_start, SyncOffset};
use crate::trajectory::{load_localization, ConfidenceFilter, TrajectoryFilter};

/// Processes capture sessions named by sequence identifier
///
/// Runs share no state; each one reads and writes only the files its
/// identifier resolves to.
pub struct BatchDriver<D: AudioDecoder> {
    config: Config,
    decoder: D,
}

impl<D: AudioDecoder> BatchDriver<D> {
    pub fn new(config: Config, decoder: D) -> Self {
        BatchDriver { config, decoder }
    }

    /// Run all stages for `sequence`
    ///
    /// Outputs written before a failing stage are left in place.
    pub fn run(&self, sequence: &str) -> Result<RunSummary, PipelineError> {
        log::info!("Processing {}", sequence);

        let paths = SequencePaths::resolve(&self.config.paths, sequence)?;
        paths.check_inputs()?;
        log::info!("Video: {}", paths.video.display());

        for (name, root) in self.config.paths.output_roots() {
            log::debug!("{}: {}", name, root.display());
            ensure_dir(root)?;
        }
        ensure_dir(&paths.imu_dir)?;
        ensure_dir(&paths.cam_dir)?;
        let trace = TraceWriter::create(paths.trace.clone())?;
        let mut artifacts = Vec::new();

        // Clap in the camera audio
        let mut cache = FsAudioCache::new();
        let cam_start = locate_cam_start(
            &paths.video,
            &paths.audio_cache,
            &mut cache,
            &self.decoder,
            &self.config.sync,
        )?;
        if paths.audio_cache.is_file() {
            artifacts.push(describe_file(ArtifactKind::AudioCache, &paths.audio_cache)?);
        }
        let message = format!("Camera starts at {}", cam_start);
        trace.write(
            &TraceEntry::completed(sequence, Stage::CamStart, message)
                .with_data(json!({ "cam_start": cam_start })),
        )?;

        // Clap in the suit capture
        let capture = MvnxReader::open(&paths.mvnx)?;
        let imu_clap = locate_imu_start(&capture.acceleration()?, &self.config.sync)?;
        let message = format!("IMU starts at {}", imu_clap.anchor());
        trace.write(
            &TraceEntry::completed(sequence, Stage::ImuStart, message)
                .with_data(json!({ "left": imu_clap.left, "right": imu_clap.right })),
        )?;

        let offset = SyncOffset::new(imu_clap.anchor(), cam_start);
        log::info!("IMU starts at : {}", offset.imu_start);
        log::info!("Camera starts at : {}", offset.cam_start);
        artifacts.push(self.persist(
            &trace,
            sequence,
            Stage::SyncRecord,
            ArtifactKind::SyncOffset,
            &paths.sync_record,
            &offset,
        )?);

        let contacts = reformat_contacts(&capture.foot_contacts()?)?;
        artifacts.push(self.persist(
            &trace,
            sequence,
            Stage::Contacts,
            ArtifactKind::Contacts,
            &paths.contacts,
            &contacts,
        )?);

        let motion = PoseTransSequence::from_files(&paths.pose_txt, &paths.trans_txt)?;
        log::info!(
            "Number of poses and transes in txt file : {} {}",
            motion.poses.len(),
            motion.transes.len()
        );
        artifacts.push(self.persist(
            &trace,
            sequence,
            Stage::PoseTrans,
            ArtifactKind::PoseTrans,
            &paths.pose_trans,
            &motion,
        )?);

        let localization = load_localization(&paths.in_cam)?;

        log::info!("Processing camera filtered file");
        let filter = ConfidenceFilter::new(self.config.trajectory.filtered_threshold)?;
        let filtered = filter.apply(&localization);
        artifacts.push(self.persist(
            &trace,
            sequence,
            Stage::FilteredTrajectory,
            ArtifactKind::FilteredTrajectory,
            &paths.cam_filtered,
            &filtered,
        )?);

        log::info!("Processing camera unfiltered file");
        let unfiltered = ConfidenceFilter::unfiltered().apply(&localization);
        artifacts.push(self.persist(
            &trace,
            sequence,
            Stage::UnfilteredTrajectory,
            ArtifactKind::UnfilteredTrajectory,
            &paths.cam_unfiltered,
            &unfiltered,
        )?);

        Ok(RunSummary {
            sequence: sequence.to_string(),
            offset,
            imu_clap,
            artifacts,
        })
    }

    /// Write one record and log it to the trace
    fn persist<T: Serialize>(
        &self,
        trace: &TraceWriter,
        sequence: &str,
        stage: Stage,
        kind: ArtifactKind,
        path: &Path,
        record: &T,
    ) -> Result<StoredArtifact, PipelineError> {
        let artifact = store_record(kind, path, record)?;
        log::debug!("Wrote {} ({} bytes)", path.display(), artifact.bytes);

        let entry = TraceEntry::completed(sequence, stage, format!("Wrote {}", kind.as_str()));
        trace.write(&entry.with_data(json!({
            "path": artifact.path.display().to_string(),
            "bytes": artifact.bytes,
            "sha256": artifact.sha256,
        })))?;

        Ok(artifact)
    }
}
