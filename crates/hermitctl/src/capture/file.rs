//! Capture by polling a file
//!
//! For decoders that write their last result to a file. The file as it stands at
//! activation (modification time and length) is a leftover from an earlier scan and
//! never fires; any rewrite after activation does, even with the same text.

use hermit_common::{CaptureAdapter, CaptureError, CaptureSink};
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::debug;

pub struct FileAdapter {
    path: PathBuf,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl FileAdapter {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
            task: None,
        }
    }
}

/// Identity of one write of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl Stamp {
    fn of(metadata: &fs::Metadata) -> Self {
        Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        }
    }
}

fn stamp(path: &Path) -> Option<Stamp> {
    fs::metadata(path).ok().map(|metadata| Stamp::of(&metadata))
}

fn read_frame(path: &Path) -> std::io::Result<Option<(Stamp, String)>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let stamp = Stamp::of(&file.metadata()?);
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(Some((stamp, contents.trim().to_string())))
}

impl CaptureAdapter for FileAdapter {
    fn activate(&mut self, sink: CaptureSink) -> Result<(), CaptureError> {
        self.deactivate();

        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| CaptureError::Unavailable("no async runtime for file polling".to_string()))?;

        // Whatever is there now is a leftover; an unreadable file is reported by the first poll
        let mut last = stamp(&self.path);

        let path = self.path.clone();
        let interval = self.interval;

        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            while sink.is_open() {
                ticker.tick().await;

                let read_path = path.clone();
                let frame = tokio::task::spawn_blocking(move || read_frame(&read_path)).await;

                match frame {
                    Ok(Ok(Some((written, text)))) => {
                        if last == Some(written) {
                            continue;
                        }
                        last = Some(written);
                        // The sink drops identical text within this activation
                        sink.decoded(&text);
                    }
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => {
                        sink.report(CaptureError::Device(format!(
                            "cannot read {}: {}",
                            path.display(),
                            e
                        )));
                        break;
                    }
                    Err(e) => {
                        sink.report(CaptureError::Device(format!("file poller failed: {}", e)));
                        break;
                    }
                }
            }
            debug!("File poller for {} finished", path.display());
        });

        self.task = Some(task);
        Ok(())
    }

    fn deactivate(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for FileAdapter {
    fn drop(&mut self) {
        self.deactivate();
    }
}
