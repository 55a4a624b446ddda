use std::io::{self, SeekFrom};
use std::path::Path;

use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use super::row::{header_line, LogRow};
use crate::error::DurabilityError;

/// Serializes every append in the process, whichever `EventLog` handle
/// issues it. Held only for the duration of one write.
static APPEND_LOCK: Mutex<()> = Mutex::const_new(());

/// Append one row to the CSV log at `path`.
///
/// The file is opened in append mode only. The header is written first
/// when the file does not exist yet (or is still empty), in the same
/// write as the row so no reader ever sees a header-less data line.
/// A value containing `,` or a line break is refused before anything
/// is written.
pub async fn append_row(path: &Path, row: &LogRow) -> Result<(), DurabilityError> {
    if let Some(column) = row.separator_column() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("column `{}` contains a separator", column),
        )
        .into());
    }
    let line = row.to_line();

    let _guard = APPEND_LOCK.lock().await;

    let len = match fs::metadata(path).await {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
        Err(e) => return Err(e.into()),
    };
    let needs_header = len == 0;
    let needs_newline = !needs_header && !ends_with_newline(path, len).await?;

    if needs_header {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut buf = String::with_capacity(line.len() + 160);
    if needs_newline {
        log::warn!("Event log {} ends with a partial line; terminating it", path.display());
        buf.push('\n');
    }
    if needs_header {
        buf.push_str(&header_line());
        buf.push('\n');
    }
    buf.push_str(&line);
    buf.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(buf.as_bytes()).await?;
    file.flush().await?;

    if needs_header {
        log::info!("Event log created at {}", path.display());
    }

    Ok(())
}

async fn ends_with_newline(path: &Path, len: u64) -> io::Result<bool> {
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(len - 1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}
