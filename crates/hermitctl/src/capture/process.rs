//! Capture from an external decoder process
//!
//! Runs a decoder such as `zbarcam --raw` and treats every stdout line as one
//! decoded QR payload. The decoder exiting (or failing to read) while active is a
//! capture failure.

use hermit_common::{CaptureAdapter, CaptureError, CaptureSink};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct ProcessAdapter {
    program: String,
    args: Vec<String>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ProcessAdapter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stop: None,
            task: None,
        }
    }

    /// Split a decoder command line on whitespace
    pub fn from_command_line(command_line: &str) -> Result<Self, CaptureError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| CaptureError::Unavailable("empty decoder command".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl CaptureAdapter for ProcessAdapter {
    fn activate(&mut self, sink: CaptureSink) -> Result<(), CaptureError> {
        self.deactivate();

        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| CaptureError::Unavailable("no async runtime for decoder".to_string()))?;
        let _guard = handle.enter();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::Unavailable(format!("{}: {}", self.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Unavailable("decoder stdout not captured".to_string()))?;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let program = self.program.clone();

        let task = handle.spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        let _ = child.kill().await;
                        break;
                    }
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            sink.decoded(line.trim());
                        }
                        Ok(None) => {
                            let status = child.wait().await;
                            let detail = match status {
                                Ok(status) => status.to_string(),
                                Err(e) => e.to_string(),
                            };
                            warn!("Decoder {} exited: {}", program, detail);
                            sink.report(CaptureError::Device(format!(
                                "decoder exited ({})",
                                detail
                            )));
                            break;
                        }
                        Err(e) => {
                            let _ = child.kill().await;
                            sink.report(CaptureError::Device(format!(
                                "decoder read failed: {}",
                                e
                            )));
                            break;
                        }
                    }
                }
            }
            debug!("Decoder task for {} finished", program);
        });

        self.stop = Some(stop_tx);
        self.task = Some(task);
        Ok(())
    }

    fn deactivate(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        // The task kills the child on stop; dropping the handle detaches it.
        self.task.take();
    }
}

impl Drop for ProcessAdapter {
    fn drop(&mut self) {
        self.deactivate();
    }
}
