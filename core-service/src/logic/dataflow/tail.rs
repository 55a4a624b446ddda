use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::logic::event_log::{parse_header, LogRow};

/// Incremental reader over the append-only event log.
///
/// Tracks a byte offset; only complete (`\n`-terminated) lines are
/// returned, a trailing partial line waits for the next poll.
pub struct LogTailer {
    path: PathBuf,
    offset: u64,
    pending: Vec<u8>,
    header: Option<Vec<String>>,
}

impl LogTailer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            pending: Vec::new(),
            header: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes consumed so far (including any buffered partial line)
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Rows appended since the last poll. An absent log is not an error.
    pub fn poll(&mut self) -> io::Result<Vec<LogRow>> {
        let len = match std::fs::metadata(&self.path) {
            Ok(m) => m.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.offset > 0 {
                    log::warn!("Event log {} disappeared; waiting for it to return", self.path.display());
                    self.reset();
                }
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        if len < self.offset {
            log::warn!(
                "Event log {} shrank from {} to {} bytes; re-reading from the start",
                self.path.display(),
                self.offset,
                len
            );
            self.reset();
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;
        let read = file.take(len - self.offset).read_to_end(&mut self.pending)?;
        self.offset += read as u64;

        Ok(self.drain_lines())
    }

    fn drain_lines(&mut self) -> Vec<LogRow> {
        let complete = match self.pending.iter().rposition(|b| *b == b'\n') {
            Some(i) => i + 1,
            None => return Vec::new(),
        };
        let chunk: Vec<u8> = self.pending.drain(..complete).collect();
        let text = String::from_utf8_lossy(&chunk);

        let mut rows = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match &self.header {
                Some(header) => rows.push(LogRow::parse(header, line)),
                None => self.header = Some(parse_header(line)),
            }
        }
        rows
    }

    fn reset(&mut self) {
        self.offset = 0;
        self.pending.clear();
        self.header = None;
    }
}
