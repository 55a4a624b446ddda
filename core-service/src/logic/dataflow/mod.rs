//! Feature Dataflow - continuous feature derivation from the event log
//!
//! Tails the log as an append-only source (existing rows once, then new
//! bytes only) and emits one `DerivedFeatures` row per log row:
//! - `balance_diff = oldbalanceOrg - newbalanceOrig`
//! - `is_large_tx = amount > 200000`
//!
//! Runs on its own thread, woken by file events with a polling fallback.
//! Independent of the request path: it only ever reads the log.

pub mod sink;
pub mod tail;


use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};

pub use sink::{ChannelFeatureSink, FeatureSink, JsonlFeatureSink};
pub use tail::LogTailer;

use crate::constants::LARGE_TX_AMOUNT;
use crate::logic::event_log::LogRow;

/// Per-row output of the dataflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub step: u64,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    #[serde(rename = "nameOrig")]
    pub name_orig: String,
    #[serde(rename = "nameDest")]
    pub name_dest: String,
    pub balance_diff: f64,
    pub is_large_tx: bool,
}

impl DerivedFeatures {
    /// `None` when a numeric column is missing or malformed
    pub fn derive(row: &LogRow) -> Option<Self> {
        let amount = row.number("amount")?;
        let old_balance = row.number("oldbalanceOrg")?;
        let new_balance = row.number("newbalanceOrig")?;

        Some(Self {
            step: row.number("step")? as u64,
            tx_type: row.get("type").unwrap_or_default().to_string(),
            amount,
            name_orig: row.get("nameOrig").unwrap_or_default().to_string(),
            name_dest: row.get("nameDest").unwrap_or_default().to_string(),
            balance_diff: old_balance - new_balance,
            is_large_tx: amount > LARGE_TX_AMOUNT,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataflowStats {
    pub emitted: u64,
    pub skipped: u64,
}

pub struct FeatureDataflow {
    tailer: LogTailer,
    sink: Box<dyn FeatureSink>,
    poll_interval: Duration,
    stats: DataflowStats,
}

impl FeatureDataflow {
    pub fn new(log_path: impl Into<PathBuf>, sink: Box<dyn FeatureSink>, poll_interval: Duration) -> Self {
        Self {
            tailer: LogTailer::new(log_path),
            sink,
            poll_interval,
            stats: DataflowStats::default(),
        }
    }

    pub fn stats(&self) -> DataflowStats {
        self.stats
    }

    /// Consume whatever is available now; returns rows emitted
    pub fn poll_once(&mut self) -> io::Result<usize> {
        let rows = self.tailer.poll()?;
        let mut emitted = 0;

        for row in &rows {
            match DerivedFeatures::derive(row) {
                Some(features) => {
                    self.sink.emit(&features)?;
                    emitted += 1;
                }
                None => {
                    log::warn!("Skipping unparseable event log row: {:?}", row.to_line());
                    self.stats.skipped += 1;
                }
            }
        }

        self.stats.emitted += emitted as u64;
        if emitted > 0 {
            log::debug!("Dataflow emitted {} rows (offset {})", emitted, self.tailer.offset());
        }
        Ok(emitted)
    }

    /// Block until `stop` is set or the sink fails
    pub fn run(&mut self, stop: &AtomicBool) -> io::Result<DataflowStats> {
        let (event_tx, event_rx) = mpsc::channel();
        // Keep the watcher alive for the whole loop
        let _watcher = match watch_parent(self.tailer.path(), event_tx) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("File watcher unavailable ({}); polling every {:?}", e, self.poll_interval);
                None
            }
        };

        log::info!("Feature dataflow started on {}", self.tailer.path().display());

        while !stop.load(Ordering::Relaxed) {
            self.poll_once()?;

            // Wake on the next file event or after one poll interval
            match event_rx.recv_timeout(self.poll_interval) {
                Ok(()) => {
                    while event_rx.try_recv().is_ok() {}
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                // No watcher: plain polling
                Err(mpsc::RecvTimeoutError::Disconnected) => thread::sleep(self.poll_interval),
            }
        }

        log::info!(
            "Feature dataflow stopped: {} emitted, {} skipped",
            self.stats.emitted,
            self.stats.skipped
        );
        Ok(self.stats)
    }

    /// Run on a dedicated thread
    pub fn spawn(self) -> DataflowHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        let thread = thread::Builder::new()
            .name("feature-dataflow".to_string())
            .spawn(move || {
                let mut dataflow = self;
                dataflow.run(&thread_stop)
            });

        DataflowHandle { stop, thread }
    }
}

/// Watch the log's directory; the log itself may not exist yet
fn watch_parent(path: &Path, events: mpsc::Sender<()>) -> notify::Result<notify::RecommendedWatcher> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path.file_name().map(|n| n.to_os_string());

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let ours = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            if ours {
                let _ = events.send(());
            }
        }
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

pub struct DataflowHandle {
    stop: Arc<AtomicBool>,
    thread: io::Result<JoinHandle<io::Result<DataflowStats>>>,
}

impl DataflowHandle {
    pub fn is_running(&self) -> bool {
        matches!(&self.thread, Ok(t) if !t.is_finished())
    }

    /// Signal the thread and wait for it (at most one poll interval)
    pub fn stop(self) -> io::Result<DataflowStats> {
        self.stop.store(true, Ordering::Relaxed);
        match self.thread {
            Ok(thread) => thread
                .join()
                .map_err(|_| io::Error::other("feature dataflow thread panicked"))?,
            Err(e) => Err(e),
        }
    }
}
