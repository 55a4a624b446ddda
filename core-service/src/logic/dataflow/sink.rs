use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::DerivedFeatures;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// Where derived feature rows go
pub trait FeatureSink: Send {
    fn emit(&self, features: &DerivedFeatures) -> io::Result<()>;
}

// ============================================================================
// JSONL FILES
// ============================================================================

/// JSON Lines side output with size-based rotation
pub struct JsonlFeatureSink {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
    max_file_size: u64,
}

impl JsonlFeatureSink {
    pub fn new(base_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&base_dir)?;

        Ok(Self {
            file: Mutex::new(None),
            base_dir,
            max_file_size: MAX_FILE_SIZE,
        })
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Output files, oldest first
    pub fn files(&self) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
            .collect::<Vec<_>>();

        // Sort by filename (timestamp ensures order)
        entries.sort();
        Ok(entries)
    }

    fn create_new_file(&self) -> io::Result<File> {
        let now = Utc::now();
        let filename = format!("features-{}.jsonl", now.format("%Y-%m-%d-%H%M%S%.6f"));
        let path = self.base_dir.join(filename);
        log::info!("Feature output: {}", path.display());

        OpenOptions::new().create(true).append(true).open(path)
    }

    fn open_latest_or_new(&self) -> io::Result<File> {
        if let Some(path) = self.files()?.pop() {
            let f = OpenOptions::new().create(true).append(true).open(&path)?;
            if f.metadata()?.len() < self.max_file_size {
                return Ok(f);
            }
        }
        self.create_new_file()
    }
}

impl FeatureSink for JsonlFeatureSink {
    fn emit(&self, features: &DerivedFeatures) -> io::Result<()> {
        let mut file_guard = self.file.lock();

        if file_guard.is_none() {
            *file_guard = Some(self.open_latest_or_new()?);
        }

        let should_rotate = match file_guard.as_ref() {
            Some(f) => f.metadata()?.len() >= self.max_file_size,
            None => false,
        };
        if should_rotate {
            *file_guard = Some(self.create_new_file()?);
        }

        if let Some(file) = file_guard.as_mut() {
            let json = serde_json::to_string(features)?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }
}

// ============================================================================
// IN-PROCESS CHANNEL
// ============================================================================

/// Hands rows to an in-process consumer. Unbounded: the dataflow never
/// waits on its consumer.
pub struct ChannelFeatureSink {
    sender: mpsc::UnboundedSender<DerivedFeatures>,
}

impl ChannelFeatureSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DerivedFeatures>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl FeatureSink for ChannelFeatureSink {
    fn emit(&self, features: &DerivedFeatures) -> io::Result<()> {
        self.sender
            .send(features.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "feature consumer dropped"))
    }
}
