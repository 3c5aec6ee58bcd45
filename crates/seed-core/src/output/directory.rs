//! Directory Sink
//!
//! Writes one timestamped directory per invocation:
//! - `behaviours.json` - behaviour catalog
//! - `beliefs_<run>.json` - belief catalog of each run
//! - `agents_<run>.json.gz` - gzip-compressed agent population of each run
//! - `manifest.json` - summary of the invocation

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use seed_records::{artifact_names, AgentRecord, BehaviourRecord, BeliefRecord, RunManifest};

use super::{RunSink, SinkError};

/// Format of the output directory timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Sink writing files into a single output directory
#[derive(Debug)]
pub struct DirectorySink {
    output_dir: PathBuf,
    files_written: usize,
}

impl DirectorySink {
    /// Create `<root>/out-<timestamp>`. Fails if that directory exists.
    pub fn create(root: &Path) -> Result<Self, SinkError> {
        fs::create_dir_all(root)?;
        let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        Self::at(&root.join(format!("out-{}", stamp)))
    }

    /// Use exactly `output_dir`, which must not exist yet
    pub fn at(output_dir: &Path) -> Result<Self, SinkError> {
        match fs::create_dir(output_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(SinkError::OutputPathExists(output_dir.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!("Writing output to {}", output_dir.display());

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            files_written: 0,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn files_written(&self) -> usize {
        self.files_written
    }

    fn write_plain<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), SinkError> {
        let file = File::create(self.output_dir.join(name))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
        self.files_written += 1;
        Ok(())
    }

    fn write_compressed<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<(), SinkError> {
        let file = File::create(self.output_dir.join(name))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, value)?;
        encoder.finish()?.flush()?;
        self.files_written += 1;
        Ok(())
    }
}

impl RunSink for DirectorySink {
    fn write_behaviours(&mut self, behaviours: &[BehaviourRecord]) -> Result<(), SinkError> {
        self.write_plain(artifact_names::BEHAVIOURS, behaviours)
    }

    fn write_run(
        &mut self,
        run: u32,
        beliefs: &[BeliefRecord],
        agents: &[AgentRecord],
    ) -> Result<(), SinkError> {
        self.write_plain(&artifact_names::beliefs(run), beliefs)?;
        self.write_compressed(&artifact_names::agents(run), agents)
    }

    fn finish(&mut self, manifest: &RunManifest) -> Result<(), SinkError> {
        let file = File::create(self.output_dir.join(artifact_names::MANIFEST))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, manifest)?;
        writer.flush()?;
        self.files_written += 1;
        Ok(())
    }
}

/// Read a plain JSON record file
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SinkError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Read a gzip-compressed JSON record file
pub fn read_compressed_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SinkError> {
    let decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    Ok(serde_json::from_reader(BufReader::new(decoder))?)
}

/// Read the manifest of an output directory
pub fn read_manifest(output_dir: &Path) -> Result<RunManifest, SinkError> {
    let reader = BufReader::new(File::open(output_dir.join(artifact_names::MANIFEST))?);
    Ok(serde_json::from_reader(reader)?)
}
